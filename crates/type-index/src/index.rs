use crate::model::{SourceId, TypeRecord};
use crate::path::{first_segment, is_immediate_child, prefixes};
use crate::source::SourceHandle;
use chrono::Utc;
use event_bus::{
    EventBus, SourceIngestionCancelled, SourceIngestionCompleted, SourceIngestionEvent,
    SourceIngestionFailed, SourceIngestionStarted, TypeIndexEvent,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Namespace prefix index shared by every navigation query.
///
/// The index only grows: keys and source references are never removed.
/// One lock guards the prefix map, the root-source list and the per-source
/// type cache. Sources are enumerated outside the lock and committed in a
/// single write, so readers never see a source half-registered.
#[derive(Default)]
pub struct NamespaceIndex {
    state: RwLock<IndexState>,
    event_bus: Option<Arc<EventBus>>,
}

#[derive(Default)]
struct IndexState {
    namespaces: BTreeMap<String, Vec<SourceHandle>>,
    // Sources exporting types in the root namespace. Root is never a key.
    root_sources: Vec<SourceHandle>,
    types: FxHashMap<SourceId, Vec<Arc<TypeRecord>>>,
    ingestion_order: Vec<SourceId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source_id: SourceId,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub ingested: Vec<SourceId>,
    /// Sources that were already part of the index.
    pub skipped: Vec<SourceId>,
    pub failed: Vec<SourceFailure>,
    pub cancelled: bool,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }

    pub fn merge(&mut self, other: IngestReport) {
        self.ingested.extend(other.ingested);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
        self.cancelled |= other.cancelled;
    }
}

enum SourceOutcome {
    Committed,
    AlreadyIngested,
    Failed(String),
    Cancelled,
}

impl NamespaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_bus(event_bus: Arc<EventBus>) -> Self {
        Self {
            state: RwLock::new(IndexState::default()),
            event_bus: Some(event_bus),
        }
    }

    /// Registers every source under each namespace prefix of its exported types.
    ///
    /// A failing source is reported and skipped. On cancellation the source
    /// being processed is dropped entirely and the remaining ones are not visited.
    pub fn ingest(
        &self,
        sources: &[SourceHandle],
        cancellation_token: Option<&CancellationToken>,
    ) -> IngestReport {
        let mut report = IngestReport::default();

        for source in sources {
            if is_cancelled(cancellation_token) {
                debug!("Ingestion cancelled before source {}", source.id());
                report.cancelled = true;
                break;
            }

            let source_id = source.id().clone();
            match self.ingest_source(source, cancellation_token) {
                SourceOutcome::Committed => report.ingested.push(source_id),
                SourceOutcome::AlreadyIngested => report.skipped.push(source_id),
                SourceOutcome::Failed(error) => {
                    report.failed.push(SourceFailure { source_id, error });
                }
                SourceOutcome::Cancelled => {
                    report.cancelled = true;
                    break;
                }
            }
        }

        report
    }

    fn ingest_source(
        &self,
        source: &SourceHandle,
        cancellation_token: Option<&CancellationToken>,
    ) -> SourceOutcome {
        let source_id = source.id().clone();
        if self.is_ingested(&source_id) {
            debug!("Source {} already ingested, skipping", source_id);
            return SourceOutcome::AlreadyIngested;
        }

        self.send_event(SourceIngestionEvent::Started(SourceIngestionStarted {
            source_id: source_id.to_string(),
            started_at: Utc::now(),
        }));

        let records = match source.list_exported_types() {
            Ok(records) => records,
            Err(e) => {
                let error = e.to_string();
                warn!("Failed to enumerate source {}: {}", source_id, error);
                self.send_event(SourceIngestionEvent::Failed(SourceIngestionFailed {
                    source_id: source_id.to_string(),
                    error: error.clone(),
                    failed_at: Utc::now(),
                }));
                return SourceOutcome::Failed(error);
            }
        };

        let mut seen_namespaces: FxHashSet<&str> = FxHashSet::default();
        let mut namespace_keys: BTreeSet<&str> = BTreeSet::new();
        for record in &records {
            if is_cancelled(cancellation_token) {
                info!(
                    "Ingestion of source {} cancelled, discarding partial namespaces",
                    source_id
                );
                self.send_event(SourceIngestionEvent::Cancelled(SourceIngestionCancelled {
                    source_id: source_id.to_string(),
                    cancelled_at: Utc::now(),
                }));
                return SourceOutcome::Cancelled;
            }
            if seen_namespaces.insert(record.namespace.as_str()) {
                namespace_keys.extend(prefixes(&record.namespace));
            }
        }

        let namespace_keys: Vec<String> = namespace_keys.into_iter().map(str::to_string).collect();
        let type_count = records.len();
        let namespace_count = namespace_keys.len();
        let committed_elsewhere = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            // Another ingestion may have committed this source while we enumerated.
            if state.types.contains_key(&source_id) {
                true
            } else {
                Self::commit(&mut state, source, namespace_keys, records);
                false
            }
        };

        // Every Started is followed by a terminal event, even when the commit was lost.
        self.send_event(SourceIngestionEvent::Completed(SourceIngestionCompleted {
            source_id: source_id.to_string(),
            type_count,
            namespace_count,
            completed_at: Utc::now(),
        }));
        if committed_elsewhere {
            debug!("Source {} committed concurrently, skipping", source_id);
            return SourceOutcome::AlreadyIngested;
        }

        info!(
            "Ingested source {}: {} types across {} namespaces",
            source_id, type_count, namespace_count
        );
        SourceOutcome::Committed
    }

    fn commit(
        state: &mut IndexState,
        source: &SourceHandle,
        namespace_keys: Vec<String>,
        records: Vec<TypeRecord>,
    ) {
        let source_id = source.id().clone();
        for key in namespace_keys {
            let contributors = if key.is_empty() {
                &mut state.root_sources
            } else {
                state.namespaces.entry(key).or_default()
            };
            if !contributors.iter().any(|s| s.id() == &source_id) {
                contributors.push(source.clone());
            }
        }
        state
            .types
            .insert(source_id.clone(), records.into_iter().map(Arc::new).collect());
        state.ingestion_order.push(source_id);
    }

    pub fn is_ingested(&self, source_id: &SourceId) -> bool {
        self.with_view(|view| view.is_ingested(source_id))
    }

    /// Runs `f` against the index while holding the shared read guard.
    pub fn with_view<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&IndexView<'_>) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&IndexView { state: &state })
    }

    pub fn root_namespaces(&self) -> Vec<String> {
        self.with_view(|view| view.root_namespaces())
    }

    /// Cloned source handles registered under `key`, for work done outside the lock.
    pub fn sources_under(&self, key: &str) -> Vec<SourceHandle> {
        self.with_view(|view| view.sources_under(key).to_vec())
    }

    fn send_event(&self, event: SourceIngestionEvent) {
        if let Some(event_bus) = &self.event_bus {
            event_bus.send(&TypeIndexEvent::SourceIngestion(event));
        }
    }
}

fn is_cancelled(cancellation_token: Option<&CancellationToken>) -> bool {
    cancellation_token.is_some_and(|token| token.is_cancelled())
}

/// Read-only view of the index, valid for the duration of [`NamespaceIndex::with_view`].
pub struct IndexView<'a> {
    state: &'a IndexState,
}

impl IndexView<'_> {
    pub fn contains_namespace(&self, key: &str) -> bool {
        self.state.namespaces.contains_key(key)
    }

    /// Sources registered under `key`; the root key yields root-namespace contributors.
    pub fn sources_under(&self, key: &str) -> &[SourceHandle] {
        if key.is_empty() {
            return &self.state.root_sources;
        }
        self.state
            .namespaces
            .get(key)
            .map(|sources| sources.as_slice())
            .unwrap_or(&[])
    }

    pub fn source_ids_under(&self, key: &str) -> Vec<SourceId> {
        self.sources_under(key)
            .iter()
            .map(|source| source.id().clone())
            .collect()
    }

    pub fn types_of(&self, source_id: &SourceId) -> &[Arc<TypeRecord>] {
        self.state
            .types
            .get(source_id)
            .map(|types| types.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_ingested(&self, source_id: &SourceId) -> bool {
        self.state.types.contains_key(source_id)
    }

    pub fn root_namespaces(&self) -> Vec<String> {
        let roots: BTreeSet<&str> = self
            .state
            .namespaces
            .keys()
            .map(|key| first_segment(key))
            .collect();
        roots.into_iter().map(str::to_string).collect()
    }

    /// Keys exactly one segment below `parent`, ascending.
    pub fn child_namespaces(&self, parent: &str) -> Vec<&str> {
        if parent.is_empty() {
            return self
                .state
                .namespaces
                .keys()
                .map(String::as_str)
                .filter(|key| is_immediate_child("", key))
                .collect();
        }
        let prefix = format!("{parent}.");
        self.state
            .namespaces
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .map(|(key, _)| key.as_str())
            .take_while(|key| key.starts_with(&prefix))
            .filter(|key| is_immediate_child(parent, key))
            .collect()
    }

    pub fn has_child_namespace(&self, parent: &str) -> bool {
        if parent.is_empty() {
            return !self.state.namespaces.is_empty();
        }
        let prefix = format!("{parent}.");
        self.state
            .namespaces
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }

    /// Cached exported types whose namespace is exactly `namespace`, ascending by simple name.
    ///
    /// Types with the same name from different sources keep source-enumeration order.
    pub fn types_in_namespace(&self, namespace: &str) -> Vec<Arc<TypeRecord>> {
        let mut types: Vec<Arc<TypeRecord>> = self
            .sources_under(namespace)
            .iter()
            .flat_map(|source| self.types_of(source.id()))
            .filter(|record| record.namespace == namespace)
            .cloned()
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }

    pub fn has_types_in_namespace(&self, namespace: &str) -> bool {
        self.sources_under(namespace).iter().any(|source| {
            self.types_of(source.id())
                .iter()
                .any(|record| record.namespace == namespace)
        })
    }

    pub fn namespace_count(&self) -> usize {
        self.state.namespaces.len()
    }

    pub fn source_count(&self) -> usize {
        self.state.ingestion_order.len()
    }

    pub fn ingested_sources(&self) -> &[SourceId] {
        &self.state.ingestion_order
    }
}
