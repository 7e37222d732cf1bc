use crate::index::NamespaceIndex;
use crate::model::{SourceId, TypeRecord};
use crate::path::{PathResolver, parent_of};
use std::sync::Arc;
use tracing::debug;

/// Lookup of a type by fully-qualified name without namespace scoping.
pub trait GlobalTypeLookup: Send + Sync {
    fn find_type(&self, full_name: &str) -> Option<Arc<TypeRecord>>;
}

/// Treats the types of one designated source as globally loadable by name.
///
/// Names are matched ignoring ASCII case, the way a runtime's own type loader
/// resolves core library types.
pub struct CoreSourceLookup {
    index: Arc<NamespaceIndex>,
    source_id: SourceId,
}

impl CoreSourceLookup {
    pub fn new(index: Arc<NamespaceIndex>, source_id: SourceId) -> Self {
        Self { index, source_id }
    }
}

impl GlobalTypeLookup for CoreSourceLookup {
    fn find_type(&self, full_name: &str) -> Option<Arc<TypeRecord>> {
        self.index.with_view(|view| {
            view.types_of(&self.source_id)
                .iter()
                .find(|record| record.full_name.eq_ignore_ascii_case(full_name))
                .cloned()
        })
    }
}

pub struct TypeResolver {
    index: Arc<NamespaceIndex>,
    paths: PathResolver,
    global: Option<Arc<dyn GlobalTypeLookup>>,
}

impl TypeResolver {
    pub fn new(index: Arc<NamespaceIndex>, paths: PathResolver) -> Self {
        Self {
            index,
            paths,
            global: None,
        }
    }

    pub fn with_global_lookup(mut self, global: Arc<dyn GlobalTypeLookup>) -> Self {
        self.global = Some(global);
        self
    }

    pub fn resolve(&self, path: &str) -> Option<Arc<TypeRecord>> {
        self.resolve_canonical(&self.paths.canonicalize(path))
    }

    /// Fast global lookup first, then a scan of the sources registered under the parent namespace.
    ///
    /// When several sources export the same full name, the first source in
    /// ingestion order wins.
    pub fn resolve_canonical(&self, canonical: &str) -> Option<Arc<TypeRecord>> {
        if canonical.is_empty() {
            return None;
        }

        if let Some(global) = &self.global {
            if let Some(record) = global.find_type(canonical) {
                debug!("Resolved {} through global lookup", canonical);
                return Some(record);
            }
        }

        let parent = parent_of(canonical);
        self.index.with_view(|view| {
            view.sources_under(parent)
                .iter()
                .flat_map(|source| view.types_of(source.id()))
                .find(|record| record.full_name == canonical)
                .cloned()
        })
    }
}
