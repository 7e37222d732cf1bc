//! # Type Index Event Bus
//!
//! Broadcasts structured information about metadata sources as they move
//! through ingestion into the namespace index.
//!
//! ## Purpose
//!
//! Hosts such as the interactive shell ingest newly published sources in the
//! background. The event bus lets them react when a source has been
//! committed, has failed to enumerate, or was abandoned on cancellation:
//!
//! - **Source-level lifecycle events** with timestamps
//! - **Serializable payloads** for JSON output
//!
//! ## Event Flow
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────┐    ┌─────────────────┐
//! │ NamespaceIndex  │    │  Event Bus   │    │   Consumers     │
//! │   ingestion     │───▶│  (Broadcast) │───▶│   • CLI shell   │
//! │                 │    │              │    │   • Tests       │
//! └─────────────────┘    └──────────────┘    └─────────────────┘
//! ```
//!
//! ## Event-Bus vs Logging
//!
//! Logging describes what the index is doing. Events describe what it has
//! accomplished, so that clients can act on them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::{self, Sender};

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum TypeIndexEvent {
    SourceIngestion(SourceIngestionEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status")]
pub enum SourceIngestionEvent {
    Started(SourceIngestionStarted),
    Completed(SourceIngestionCompleted),
    Failed(SourceIngestionFailed),
    Cancelled(SourceIngestionCancelled),
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceIngestionStarted {
    pub source_id: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceIngestionCompleted {
    pub source_id: String,
    pub type_count: usize,
    /// Namespace keys the source contributes to, including every prefix.
    pub namespace_count: usize,
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceIngestionFailed {
    pub source_id: String,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceIngestionCancelled {
    pub source_id: String,
    pub cancelled_at: DateTime<Utc>,
}

impl TypeIndexEvent {
    pub fn source_id(&self) -> &str {
        match self {
            TypeIndexEvent::SourceIngestion(event) => match event {
                SourceIngestionEvent::Started(e) => &e.source_id,
                SourceIngestionEvent::Completed(e) => &e.source_id,
                SourceIngestionEvent::Failed(e) => &e.source_id,
                SourceIngestionEvent::Cancelled(e) => &e.source_id,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct EventBus {
    sender: Sender<TypeIndexEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }

    pub fn send(&self, event: &TypeIndexEvent) {
        if self.sender.send(event.clone()).is_err() {
            // No receivers; events are best-effort.
            tracing::debug!("No receivers for event bus, ignoring event: {:?}", &event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TypeIndexEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
