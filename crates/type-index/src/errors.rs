//! Error types for the type-index crate

use crate::model::SourceId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for navigation queries
pub type Result<T> = std::result::Result<T, NavigationError>;

/// Errors surfaced to the host by navigation queries
#[derive(Error, Debug)]
pub enum NavigationError {
    /// The path is neither a namespace nor a resolvable type
    #[error("Path not found: {path}")]
    NotFound { path: String },

    /// The represented metadata is read-only
    #[error("Operation not supported: {operation}")]
    UnsupportedOperation { operation: &'static str },

    /// A metadata source could not be enumerated
    #[error("Failed to read metadata source {source_id}: {message}")]
    MetadataAccess { source_id: SourceId, message: String },
}

impl NavigationError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn metadata_access(source_id: &SourceId, error: &SourceError) -> Self {
        Self::MetadataAccess {
            source_id: source_id.clone(),
            message: error.to_string(),
        }
    }
}

/// Errors raised by a metadata source while enumerating its types
#[derive(Error, Debug)]
pub enum SourceError {
    /// Registry file could not be read
    #[error("IO error reading {path:?}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Registry file is not valid JSON or does not match the registry shape
    #[error("Malformed registry {path:?}: {error}")]
    Malformed {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },

    /// Source is known but cannot currently be enumerated
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
