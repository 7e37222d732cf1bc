use crate::aliases::{AliasSource, AliasTable};
use crate::config::NavigationConfig;
use crate::errors::{NavigationError, Result};
use crate::formatter::{MemberFormatter, PickList, PropertyMap, PropertyOptions};
use crate::index::{IndexView, NamespaceIndex};
use crate::model::{SourceId, TypeRecord};
use crate::path::{self, PathResolver};
use crate::resolver::{CoreSourceLookup, GlobalTypeLookup, TypeResolver};
use crate::source::SourceHandle;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceView {
    pub full_name: String,
    pub name: String,
    pub namespace: String,
    pub sources: Vec<SourceId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "item_type", rename_all = "lowercase")]
pub enum Item {
    Namespace(NamespaceView),
    Type(Arc<TypeRecord>),
}

impl Item {
    pub fn is_container(&self) -> bool {
        matches!(self, Item::Namespace(_))
    }
}

/// One entry of a listing, addressed by its host path.
#[derive(Debug, Clone, Serialize)]
pub struct ChildItem {
    pub path: String,
    pub name: String,
    pub is_container: bool,
    pub item: Item,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub recurse: bool,
    /// List leaves from each source's unfiltered view, including non-exported types.
    pub force: bool,
}

impl ListOptions {
    pub fn recursive() -> Self {
        Self {
            recurse: true,
            force: false,
        }
    }
}

// Listing of one namespace: its child containers and its leaves.
struct ListingBlock {
    namespace: String,
    containers: Vec<ChildItem>,
    sources: Vec<SourceHandle>,
    leaves: Vec<Arc<TypeRecord>>,
}

/// Filesystem-shaped queries over the namespace index.
pub struct NavigationEngine {
    index: Arc<NamespaceIndex>,
    paths: PathResolver,
    resolver: TypeResolver,
    formatter: MemberFormatter,
}

impl NavigationEngine {
    pub fn new(
        index: Arc<NamespaceIndex>,
        config: &NavigationConfig,
        aliases: Arc<dyn AliasSource>,
    ) -> Self {
        let paths = PathResolver::new(config.separator);
        let mut resolver = TypeResolver::new(index.clone(), paths);
        if let Some(core_source) = &config.core_source {
            let lookup: Arc<dyn GlobalTypeLookup> =
                Arc::new(CoreSourceLookup::new(index.clone(), core_source.clone()));
            resolver = resolver.with_global_lookup(lookup);
        }
        let formatter =
            MemberFormatter::new(AliasTable::new(aliases)).with_accessors(config.show_accessors);
        Self {
            index,
            paths,
            resolver,
            formatter,
        }
    }

    pub fn path_resolver(&self) -> &PathResolver {
        &self.paths
    }

    pub fn formatter(&self) -> &MemberFormatter {
        &self.formatter
    }

    pub fn resolve(&self, path: &str) -> Option<Arc<TypeRecord>> {
        self.resolver.resolve(path)
    }

    pub fn is_container(&self, path: &str) -> bool {
        let canonical = self.paths.canonicalize(path);
        canonical.is_empty() || self.index.with_view(|view| view.contains_namespace(&canonical))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.is_container(path) || self.resolver.resolve(path).is_some()
    }

    pub fn has_children(&self, path: &str) -> bool {
        let canonical = self.paths.canonicalize(path);
        self.index.with_view(|view| {
            if !canonical.is_empty() && !view.contains_namespace(&canonical) {
                return false;
            }
            view.has_child_namespace(&canonical) || view.has_types_in_namespace(&canonical)
        })
    }

    /// Child containers (ascending by key) followed by leaves (ascending by name).
    ///
    /// With `recurse`, each child namespace is listed after the parent's full
    /// listing, depth first, and every namespace is visited exactly once.
    pub fn list_children(&self, path: &str, options: &ListOptions) -> Result<Vec<ChildItem>> {
        let canonical = self.paths.canonicalize(path);
        if !self.is_container(path) {
            return if self.resolver.resolve_canonical(&canonical).is_some() {
                Ok(Vec::new())
            } else {
                Err(NavigationError::not_found(path))
            };
        }

        let mut blocks = Vec::new();
        self.index.with_view(|view| {
            self.plan_listing(view, &canonical, options, &mut blocks);
        });

        if options.force {
            self.load_forced_leaves(&mut blocks)?;
        }

        let mut items = Vec::new();
        for block in blocks {
            items.extend(block.containers);
            items.extend(block.leaves.into_iter().map(|record| self.type_item(record)));
        }
        Ok(items)
    }

    pub fn list_child_names(&self, path: &str) -> Result<Vec<String>> {
        Ok(self
            .list_children(path, &ListOptions::default())?
            .into_iter()
            .map(|child| child.name)
            .collect())
    }

    fn plan_listing(
        &self,
        view: &IndexView<'_>,
        namespace: &str,
        options: &ListOptions,
        blocks: &mut Vec<ListingBlock>,
    ) {
        let children = view.child_namespaces(namespace);
        let containers = children
            .iter()
            .map(|child| self.namespace_item(view, child))
            .collect();
        let (sources, leaves) = if options.force {
            (view.sources_under(namespace).to_vec(), Vec::new())
        } else {
            (Vec::new(), view.types_in_namespace(namespace))
        };
        blocks.push(ListingBlock {
            namespace: namespace.to_string(),
            containers,
            sources,
            leaves,
        });

        if options.recurse {
            for child in children {
                self.plan_listing(view, child, options, blocks);
            }
        }
    }

    // Runs outside the index lock: unfiltered enumeration may be slow.
    fn load_forced_leaves(&self, blocks: &mut [ListingBlock]) -> Result<()> {
        let mut all_types: FxHashMap<SourceId, Vec<Arc<TypeRecord>>> = FxHashMap::default();
        for block in blocks.iter_mut() {
            let mut leaves = Vec::new();
            for source in &block.sources {
                if !all_types.contains_key(source.id()) {
                    debug!("Listing all types of source {}", source.id());
                    let records = source
                        .list_all_types()
                        .map_err(|e| NavigationError::metadata_access(source.id(), &e))?;
                    all_types.insert(
                        source.id().clone(),
                        records.into_iter().map(Arc::new).collect(),
                    );
                }
                if let Some(records) = all_types.get(source.id()) {
                    leaves.extend(
                        records
                            .iter()
                            .filter(|record| record.namespace == block.namespace)
                            .cloned(),
                    );
                }
            }
            leaves.sort_by(|a, b| a.name.cmp(&b.name));
            block.leaves = leaves;
        }
        Ok(())
    }

    fn namespace_view(&self, view: &IndexView<'_>, key: &str) -> NamespaceView {
        NamespaceView {
            full_name: key.to_string(),
            name: path::child_name(key).to_string(),
            namespace: path::parent_of(key).to_string(),
            sources: view.source_ids_under(key),
        }
    }

    fn namespace_item(&self, view: &IndexView<'_>, key: &str) -> ChildItem {
        ChildItem {
            path: self.paths.to_host(key),
            name: path::child_name(key).to_string(),
            is_container: true,
            item: Item::Namespace(self.namespace_view(view, key)),
        }
    }

    fn type_item(&self, record: Arc<TypeRecord>) -> ChildItem {
        ChildItem {
            path: self.paths.to_host(&record.full_name),
            name: record.name.clone(),
            is_container: false,
            item: Item::Type(record),
        }
    }

    /// Host path of the parent; root-level paths have parent `""`.
    pub fn parent_path(&self, path: &str) -> String {
        let canonical = self.paths.canonicalize(path);
        self.paths.to_host(path::parent_of(&canonical))
    }

    pub fn child_name(&self, path: &str) -> String {
        let canonical = self.paths.canonicalize(path);
        path::child_name(&canonical).to_string()
    }

    pub fn get_item(&self, path: &str) -> Result<Item> {
        let canonical = self.paths.canonicalize(path);
        if self.is_container(path) {
            return Ok(Item::Namespace(
                self.index
                    .with_view(|view| self.namespace_view(view, &canonical)),
            ));
        }
        self.resolver
            .resolve_canonical(&canonical)
            .map(Item::Type)
            .ok_or_else(|| NavigationError::not_found(path))
    }

    /// Formatted members of the type at `path`. Namespaces have no properties.
    pub fn get_properties<S: AsRef<str>>(
        &self,
        path: &str,
        pick_list: &[S],
        options: &PropertyOptions,
    ) -> Result<PropertyMap> {
        if self.is_container(path) {
            return Ok(PropertyMap::new());
        }
        let record = self
            .resolver
            .resolve(path)
            .ok_or_else(|| NavigationError::not_found(path))?;
        Ok(self
            .formatter
            .format_all(&record, &PickList::new(pick_list), options))
    }

    pub fn set_property(&self, _path: &str, _name: &str, _value: &str) -> Result<()> {
        Err(NavigationError::UnsupportedOperation {
            operation: "set property",
        })
    }

    pub fn clear_property<S: AsRef<str>>(&self, _path: &str, _names: &[S]) -> Result<()> {
        Err(NavigationError::UnsupportedOperation {
            operation: "clear property",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigationConfigBuilder;
    use crate::errors::SourceError;
    use crate::model::{MemberSignature, Parameter};
    use crate::source::{MetadataSource, StaticSource};
    use std::collections::HashMap;

    #[derive(Debug)]
    struct HiddenFailure {
        id: SourceId,
    }

    impl MetadataSource for HiddenFailure {
        fn id(&self) -> &SourceId {
            &self.id
        }

        fn list_exported_types(&self) -> std::result::Result<Vec<TypeRecord>, SourceError> {
            Ok(vec![TypeRecord::new("Locked.Visible", self.id.clone())])
        }

        fn list_all_types(&self) -> std::result::Result<Vec<TypeRecord>, SourceError> {
            Err(SourceError::Unavailable("restricted".to_string()))
        }
    }

    fn engine(sources: Vec<SourceHandle>) -> NavigationEngine {
        let index = Arc::new(NamespaceIndex::new());
        index.ingest(&sources, None);
        let config = NavigationConfigBuilder::build(Some('\\'), false, None);
        NavigationEngine::new(index, &config, Arc::new(HashMap::new()))
    }

    fn names(items: &[ChildItem]) -> Vec<&str> {
        items.iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn test_list_children_of_type_is_empty() {
        let engine = engine(vec![
            StaticSource::from_names("io", &["Sys.IO.File"]).into_handle(),
        ]);

        assert!(
            engine
                .list_children("Sys\\IO\\File", &ListOptions::default())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_list_children_of_missing_path_is_not_found() {
        let engine = engine(vec![]);

        let err = engine
            .list_children("Nope", &ListOptions::default())
            .unwrap_err();
        assert!(matches!(err, NavigationError::NotFound { .. }));
    }

    #[test]
    fn test_child_items_carry_host_paths() {
        let engine = engine(vec![
            StaticSource::from_names("net", &["Sys.Net.Http.Client"]).into_handle(),
        ]);

        let items = engine
            .list_children("Sys\\Net", &ListOptions::default())
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, "Sys\\Net\\Http");
        assert!(items[0].is_container);
    }

    #[test]
    fn test_forced_listing_includes_hidden_types() {
        let source = StaticSource::from_names("io", &["Sys.IO.File"])
            .with_hidden(vec![TypeRecord::new("Sys.IO.Buffer", SourceId::new("io"))]);
        let engine = engine(vec![source.into_handle()]);

        let default = engine
            .list_children("Sys\\IO", &ListOptions::default())
            .unwrap();
        assert_eq!(names(&default), vec!["File"]);

        let forced = engine
            .list_children(
                "Sys\\IO",
                &ListOptions {
                    recurse: false,
                    force: true,
                },
            )
            .unwrap();
        assert_eq!(names(&forced), vec!["Buffer", "File"]);
    }

    #[test]
    fn test_forced_listing_surfaces_source_failure() {
        let engine = engine(vec![Arc::new(HiddenFailure {
            id: SourceId::new("locked"),
        })]);

        let err = engine
            .list_children(
                "Locked",
                &ListOptions {
                    recurse: false,
                    force: true,
                },
            )
            .unwrap_err();
        assert!(matches!(err, NavigationError::MetadataAccess { .. }));
    }

    #[test]
    fn test_get_item_for_namespace_and_type() {
        let engine = engine(vec![
            StaticSource::from_names("net", &["Sys.Net.Socket"]).into_handle(),
        ]);

        match engine.get_item("Sys\\Net").unwrap() {
            Item::Namespace(view) => {
                assert_eq!(view.full_name, "Sys.Net");
                assert_eq!(view.name, "Net");
                assert_eq!(view.namespace, "Sys");
                assert_eq!(view.sources, vec![SourceId::new("net")]);
            }
            other => panic!("expected namespace, got {other:?}"),
        }
        assert!(!engine.get_item("Sys\\Net\\Socket").unwrap().is_container());
        assert!(matches!(
            engine.get_item("Sys\\Missing"),
            Err(NavigationError::NotFound { .. })
        ));
    }

    #[test]
    fn test_get_properties() {
        let socket = TypeRecord::new("Sys.Net.Socket", SourceId::new("net")).with_members(vec![
            MemberSignature::method("Connect", "Void", vec![Parameter::new("String", "host")]),
        ]);
        let engine = engine(vec![StaticSource::new("net", vec![socket]).into_handle()]);
        let no_pick: [&str; 0] = [];

        let properties = engine
            .get_properties("Sys\\Net\\Socket", &no_pick, &PropertyOptions::default())
            .unwrap();
        assert_eq!(properties["Connect"], vec!["Void Connect(String host)".to_string()]);

        assert!(
            engine
                .get_properties("Sys\\Net", &no_pick, &PropertyOptions::default())
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            engine.get_properties("Sys\\Gone", &no_pick, &PropertyOptions::default()),
            Err(NavigationError::NotFound { .. })
        ));
    }

    #[test]
    fn test_mutations_are_rejected() {
        let engine = engine(vec![
            StaticSource::from_names("net", &["Sys.Net.Socket"]).into_handle(),
        ]);

        assert!(matches!(
            engine.set_property("Sys\\Net\\Socket", "Connected", "true"),
            Err(NavigationError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            engine.clear_property("Sys\\Net\\Socket", &["Connected"]),
            Err(NavigationError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_parent_path_and_child_name() {
        let engine = engine(vec![]);

        assert_eq!(engine.parent_path("Sys\\Net\\Http"), "Sys\\Net");
        assert_eq!(engine.parent_path("Sys"), "");
        assert_eq!(engine.child_name("Sys\\Net\\Http"), "Http");
        assert_eq!(engine.child_name(""), "");
    }
}
