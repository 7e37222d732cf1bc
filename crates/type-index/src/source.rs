use crate::errors::SourceError;
use crate::model::{EnumValue, MemberSignature, SourceId, TypeRecord};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info};

// Metadata source implementations for the different ways type records reach the index:
//
// 1. StaticSource: records already materialized in memory (tests, embedding hosts that
//    generate their registry at build time and link it in).
// 2. RegistryFileSource: a pre-generated JSON registry on disk, read and parsed on every
//    enumeration. Enumeration is treated as an expensive call, so the index caches the result.
//
// The MetadataSource trait keeps the index agnostic to where records come from; it only
// ever holds handles and compares them by id.

pub trait MetadataSource: Send + Sync + fmt::Debug {
    fn id(&self) -> &SourceId;

    /// Publicly visible types.
    fn list_exported_types(&self) -> Result<Vec<TypeRecord>, SourceError>;

    /// Unfiltered view including non-exported types.
    fn list_all_types(&self) -> Result<Vec<TypeRecord>, SourceError> {
        self.list_exported_types()
    }
}

pub type SourceHandle = Arc<dyn MetadataSource>;

#[derive(Debug, Clone)]
pub struct StaticSource {
    id: SourceId,
    exported: Vec<TypeRecord>,
    hidden: Vec<TypeRecord>,
}

impl StaticSource {
    pub fn new(id: impl Into<SourceId>, exported: Vec<TypeRecord>) -> Self {
        Self {
            id: id.into(),
            exported,
            hidden: Vec::new(),
        }
    }

    /// Builds a source whose exported types carry only a name.
    pub fn from_names(id: &str, full_names: &[&str]) -> Self {
        let source_id = SourceId::new(id);
        let exported = full_names
            .iter()
            .map(|name| TypeRecord::new(*name, source_id.clone()))
            .collect();
        Self::new(source_id, exported)
    }

    pub fn with_hidden(mut self, hidden: Vec<TypeRecord>) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn into_handle(self) -> SourceHandle {
        Arc::new(self)
    }
}

impl MetadataSource for StaticSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn list_exported_types(&self) -> Result<Vec<TypeRecord>, SourceError> {
        Ok(self.exported.clone())
    }

    fn list_all_types(&self) -> Result<Vec<TypeRecord>, SourceError> {
        Ok(self
            .exported
            .iter()
            .chain(self.hidden.iter())
            .cloned()
            .collect())
    }
}

/// On-disk shape of a pre-generated type registry.
#[derive(Debug, Deserialize)]
pub struct Registry {
    /// Source id the registry declares for itself.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub types: Vec<RegistryType>,
}

#[derive(Deserialize)]
struct RegistryHeader {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegistryType {
    pub full_name: String,
    #[serde(default = "default_exported")]
    pub exported: bool,
    #[serde(default)]
    pub members: Vec<MemberSignature>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub enum_values: Vec<EnumValue>,
}

fn default_exported() -> bool {
    true
}

impl Registry {
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|error| SourceError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        serde_json::from_str(&content).map_err(|error| SourceError::Malformed {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Reads only the declared `name`; unreadable or unnamed registries yield `None`.
    pub fn declared_name(path: &Path) -> Option<String> {
        let content = std::fs::read_to_string(path).ok()?;
        let header: RegistryHeader = serde_json::from_str(&content).ok()?;
        header.name.filter(|name| !name.trim().is_empty())
    }

    pub fn into_records(self, source: &SourceId, include_hidden: bool) -> Vec<TypeRecord> {
        self.types
            .into_iter()
            .filter(|ty| include_hidden || ty.exported)
            .map(|ty| {
                TypeRecord::new(ty.full_name, source.clone())
                    .with_members(ty.members)
                    .with_interfaces(ty.interfaces)
                    .with_attributes(ty.attributes)
                    .with_enum_values(ty.enum_values)
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RegistryFileSource {
    id: SourceId,
    path: PathBuf,
}

impl RegistryFileSource {
    pub fn new(id: impl Into<SourceId>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Uses the registry's declared `name` as the source id, or the file stem
    /// (`System.Runtime.json` -> `System.Runtime`) when it has none or cannot be read yet.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = Registry::declared_name(&path).unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string())
        });
        Self::new(id, path)
    }

    fn load(&self, include_hidden: bool) -> Result<Vec<TypeRecord>, SourceError> {
        debug!("Reading registry {} from {}", self.id, self.path.display());
        let registry = Registry::from_path(&self.path)?;
        Ok(registry.into_records(&self.id, include_hidden))
    }
}

impl MetadataSource for RegistryFileSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn list_exported_types(&self) -> Result<Vec<TypeRecord>, SourceError> {
        self.load(false)
    }

    fn list_all_types(&self) -> Result<Vec<TypeRecord>, SourceError> {
        self.load(true)
    }
}

/// Discovers metadata sources and announces new ones as they become available.
pub trait SourceCatalog: Send + Sync {
    fn list_available_sources(&self) -> Vec<SourceHandle>;

    fn subscribe(&self) -> broadcast::Receiver<SourceHandle>;
}

#[derive(Debug)]
pub struct InMemoryCatalog {
    sources: RwLock<Vec<SourceHandle>>,
    sender: broadcast::Sender<SourceHandle>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::with_sources(Vec::new())
    }

    pub fn with_sources(sources: Vec<SourceHandle>) -> Self {
        let (sender, _) = broadcast::channel(256);
        Self {
            sources: RwLock::new(sources),
            sender,
        }
    }

    /// Makes a source available and notifies subscribers.
    pub fn publish(&self, source: SourceHandle) {
        info!("Source available: {}", source.id());
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(source.clone());
        if self.sender.send(source).is_err() {
            debug!("No subscribers for new source notification");
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceCatalog for InMemoryCatalog {
    fn list_available_sources(&self) -> Vec<SourceHandle> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<SourceHandle> {
        self.sender.subscribe()
    }
}
