//! Short display names for well-known types (`System.Int32` -> `int`).

use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Host-supplied mapping from a type's display string to its short alias.
pub trait AliasSource: Send + Sync {
    fn get_aliases(&self) -> HashMap<String, String>;
}

impl AliasSource for HashMap<String, String> {
    fn get_aliases(&self) -> HashMap<String, String> {
        self.clone()
    }
}

/// Aliases declared the way users write them: short name -> full type name.
///
/// When several short names point at the same type, the lexicographically
/// smallest one is used for display (`int` over `int32`).
#[derive(Debug, Clone, Default)]
pub struct ShortNameAliases {
    short_to_type: BTreeMap<String, String>,
}

impl ShortNameAliases {
    pub fn new(short_to_type: BTreeMap<String, String>) -> Self {
        Self { short_to_type }
    }

    pub fn builtin() -> Self {
        let short_to_type = BUILTIN_SHORT_NAMES
            .iter()
            .map(|(short, full)| (short.to_string(), full.to_string()))
            .collect();
        Self { short_to_type }
    }

    /// Entries in `overrides` replace builtin entries with the same short name.
    pub fn extend(&mut self, overrides: impl IntoIterator<Item = (String, String)>) {
        self.short_to_type.extend(overrides);
    }
}

impl AliasSource for ShortNameAliases {
    fn get_aliases(&self) -> HashMap<String, String> {
        let mut aliases = HashMap::with_capacity(self.short_to_type.len());
        for (short, full) in &self.short_to_type {
            aliases
                .entry(full.clone())
                .or_insert_with(|| short.clone());
        }
        aliases
    }
}

const BUILTIN_SHORT_NAMES: &[(&str, &str)] = &[
    ("bool", "System.Boolean"),
    ("byte", "System.Byte"),
    ("char", "System.Char"),
    ("datetime", "System.DateTime"),
    ("decimal", "System.Decimal"),
    ("double", "System.Double"),
    ("float", "System.Single"),
    ("guid", "System.Guid"),
    ("hashtable", "System.Collections.Hashtable"),
    ("int", "System.Int32"),
    ("int16", "System.Int16"),
    ("int32", "System.Int32"),
    ("int64", "System.Int64"),
    ("long", "System.Int64"),
    ("object", "System.Object"),
    ("regex", "System.Text.RegularExpressions.Regex"),
    ("sbyte", "System.SByte"),
    ("short", "System.Int16"),
    ("single", "System.Single"),
    ("string", "System.String"),
    ("timespan", "System.TimeSpan"),
    ("type", "System.Type"),
    ("uint", "System.UInt32"),
    ("uint16", "System.UInt16"),
    ("uint32", "System.UInt32"),
    ("uint64", "System.UInt64"),
    ("ulong", "System.UInt64"),
    ("uri", "System.Uri"),
    ("ushort", "System.UInt16"),
    ("version", "System.Version"),
    ("void", "System.Void"),
];

/// Alias lookup built from its source on first use and immutable afterwards.
pub struct AliasTable {
    source: Arc<dyn AliasSource>,
    table: OnceCell<HashMap<String, String>>,
}

impl AliasTable {
    pub fn new(source: Arc<dyn AliasSource>) -> Self {
        Self {
            source,
            table: OnceCell::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Arc::new(HashMap::new()))
    }

    pub fn lookup(&self, type_display: &str) -> Option<&str> {
        self.table
            .get_or_init(|| {
                let aliases = self.source.get_aliases();
                debug!("Built alias table with {} entries", aliases.len());
                aliases
            })
            .get(type_display)
            .map(String::as_str)
    }

    /// Alias when one exists, otherwise the full display string.
    pub fn display<'a>(&'a self, type_display: &'a str) -> &'a str {
        self.lookup(type_display).unwrap_or(type_display)
    }
}

impl std::fmt::Debug for AliasTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasTable")
            .field("built", &self.table.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl AliasSource for CountingSource {
        fn get_aliases(&self) -> HashMap<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            HashMap::from([("Int32".to_string(), "int".to_string())])
        }
    }

    #[test]
    fn test_alias_table_is_built_once() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let table = AliasTable::new(source.clone());

        assert_eq!(table.display("Int32"), "int");
        assert_eq!(table.display("String"), "String");
        assert_eq!(table.lookup("Int32"), Some("int"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_builtin_prefers_smallest_short_name() {
        let aliases = ShortNameAliases::builtin().get_aliases();
        assert_eq!(aliases.get("System.Int32").map(String::as_str), Some("int"));
        assert_eq!(aliases.get("System.Int64").map(String::as_str), Some("int64"));
        assert_eq!(aliases.get("System.String").map(String::as_str), Some("string"));
    }

    #[test]
    fn test_overrides_extend_builtin() {
        let mut aliases = ShortNameAliases::builtin();
        aliases.extend([("sock".to_string(), "Sys.Net.Socket".to_string())]);

        let table = AliasTable::new(Arc::new(aliases));
        assert_eq!(table.display("Sys.Net.Socket"), "sock");
    }
}
