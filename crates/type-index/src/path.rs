//! Conversion between host paths and canonical dot-separated namespace keys.

/// Canonical separator used by every index key.
pub const CANONICAL_SEPARATOR: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathResolver {
    separator: char,
}

impl PathResolver {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Host path to canonical key. Empty and root-only paths map to `""`.
    pub fn canonicalize(&self, path: &str) -> String {
        let replaced = if self.separator == CANONICAL_SEPARATOR {
            path.to_string()
        } else {
            path.replace(self.separator, ".")
        };
        replaced.trim_end_matches(CANONICAL_SEPARATOR).to_string()
    }

    pub fn to_host(&self, canonical: &str) -> String {
        if self.separator == CANONICAL_SEPARATOR {
            canonical.to_string()
        } else {
            canonical.replace(CANONICAL_SEPARATOR, &self.separator.to_string())
        }
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new('\\')
    }
}

/// Drops the last segment of a canonical path; single-segment paths have parent `""`.
pub fn parent_of(path: &str) -> &str {
    match path.rfind(CANONICAL_SEPARATOR) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Last segment of a canonical path.
pub fn child_name(path: &str) -> &str {
    match path.rfind(CANONICAL_SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// First segment of a canonical path.
pub fn first_segment(path: &str) -> &str {
    match path.find(CANONICAL_SEPARATOR) {
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// Every dot-boundary prefix of a namespace plus the namespace itself.
///
/// `"A.B.C"` yields `["A", "A.B", "A.B.C"]`; `""` yields `[""]`.
pub fn prefixes(namespace: &str) -> Vec<&str> {
    let mut result: Vec<&str> = namespace
        .match_indices(CANONICAL_SEPARATOR)
        .map(|(idx, _)| &namespace[..idx])
        .filter(|prefix| !prefix.is_empty())
        .collect();
    result.push(namespace);
    result
}

/// True when `candidate` is exactly one segment below `parent`.
pub fn is_immediate_child(parent: &str, candidate: &str) -> bool {
    if parent.is_empty() {
        return !candidate.is_empty() && !candidate.contains(CANONICAL_SEPARATOR);
    }
    candidate
        .strip_prefix(parent)
        .and_then(|rest| rest.strip_prefix(CANONICAL_SEPARATOR))
        .is_some_and(|rest| !rest.is_empty() && !rest.contains(CANONICAL_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_replaces_host_separator() {
        let resolver = PathResolver::new('\\');
        assert_eq!(resolver.canonicalize("Sys\\Net\\Http"), "Sys.Net.Http");
        assert_eq!(resolver.canonicalize("Sys\\Net\\"), "Sys.Net");
    }

    #[test]
    fn test_canonicalize_root_forms() {
        let resolver = PathResolver::new('/');
        assert_eq!(resolver.canonicalize(""), "");
        assert_eq!(resolver.canonicalize("/"), "");
        assert_eq!(resolver.canonicalize("."), "");
    }

    #[test]
    fn test_to_host_round_trips_separator() {
        let resolver = PathResolver::new('/');
        assert_eq!(resolver.to_host("Sys.Net.Http"), "Sys/Net/Http");
    }

    #[test]
    fn test_parent_and_child_name() {
        assert_eq!(parent_of("A.B.C"), "A.B");
        assert_eq!(parent_of("A"), "");
        assert_eq!(parent_of(""), "");
        assert_eq!(child_name("A.B.C"), "C");
        assert_eq!(child_name("A"), "A");
        assert_eq!(child_name(""), "");
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(prefixes("A.B.C"), vec!["A", "A.B", "A.B.C"]);
        assert_eq!(prefixes("A"), vec!["A"]);
        assert_eq!(prefixes(""), vec![""]);
    }

    #[test]
    fn test_first_segment() {
        assert_eq!(first_segment("A.B.C"), "A");
        assert_eq!(first_segment("A"), "A");
    }

    #[test]
    fn test_is_immediate_child() {
        assert!(is_immediate_child("", "A"));
        assert!(!is_immediate_child("", "A.B"));
        assert!(is_immediate_child("A", "A.B"));
        assert!(!is_immediate_child("A", "A.B.C"));
        assert!(!is_immediate_child("A", "AB.C"));
        assert!(!is_immediate_child("A", "A"));
    }
}
