use crate::model::SourceId;

pub const DEFAULT_SEPARATOR: char = '\\';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationConfig {
    /// Separator used by host paths; the index itself always uses `.`.
    pub separator: char,
    /// Render `{get;set;}` markers after property signatures.
    pub show_accessors: bool,
    /// Source whose types can be resolved by full name without namespace scoping.
    pub core_source: Option<SourceId>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfigBuilder::build(None, false, None)
    }
}

pub struct NavigationConfigBuilder;

impl NavigationConfigBuilder {
    pub fn build(
        separator: Option<char>,
        show_accessors: bool,
        core_source: Option<String>,
    ) -> NavigationConfig {
        NavigationConfig {
            separator: NavigationConfigBuilder::get_effective_separator(separator),
            show_accessors,
            core_source: core_source
                .filter(|name| !name.trim().is_empty())
                .map(SourceId::new),
        }
    }

    pub fn get_effective_separator(separator: Option<char>) -> char {
        separator.unwrap_or(DEFAULT_SEPARATOR)
    }
}
