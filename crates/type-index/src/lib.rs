//! # Type Index
//!
//! Presents the types exposed by a set of metadata sources as a navigable
//! namespace hierarchy.
//!
//! This crate provides:
//! - A namespace prefix index fed incrementally from metadata sources
//! - Filesystem-shaped navigation (list, exists, item, properties) over it
//! - Deterministic member signature formatting with short type aliases
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use type_index::{ListOptions, NamespaceIndex, NavigationConfig, NavigationEngine, StaticSource};
//!
//! let index = Arc::new(NamespaceIndex::new());
//! index.ingest(
//!     &[StaticSource::from_names("net", &["Sys.Net.Socket"]).into_handle()],
//!     None,
//! );
//!
//! let engine = NavigationEngine::new(index, &NavigationConfig::default(), Arc::new(HashMap::new()));
//! let children = engine.list_children("Sys\\Net", &ListOptions::default()).unwrap();
//! assert_eq!(children[0].name, "Socket");
//! ```

pub mod aliases;
pub mod config;
pub mod errors;
pub mod formatter;
pub mod index;
pub mod ingestion;
pub mod model;
pub mod navigation;
pub mod path;
pub mod resolver;
pub mod source;

pub use aliases::{AliasSource, AliasTable, ShortNameAliases};
pub use config::{NavigationConfig, NavigationConfigBuilder};
pub use errors::{NavigationError, Result, SourceError};
pub use formatter::{PickList, PropertyMap, PropertyOptions};
pub use index::{IngestReport, NamespaceIndex};
pub use ingestion::IngestionWorker;
pub use model::{MemberKind, MemberSignature, Parameter, SourceId, TypeRecord};
pub use navigation::{ChildItem, Item, ListOptions, NamespaceView, NavigationEngine};
pub use source::{
    InMemoryCatalog, MetadataSource, RegistryFileSource, SourceCatalog, SourceHandle,
    StaticSource,
};
