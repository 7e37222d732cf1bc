use crate::index::{IngestReport, NamespaceIndex};
use crate::source::{SourceCatalog, SourceHandle};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Background task feeding the index from a catalog.
///
/// Ingests every source available at spawn time, then each source the catalog
/// announces afterwards, until cancelled or until the catalog's channel closes.
pub struct IngestionWorker {
    cancellation_token: CancellationToken,
    handle: JoinHandle<IngestReport>,
}

impl IngestionWorker {
    pub fn spawn(
        index: Arc<NamespaceIndex>,
        catalog: Arc<dyn SourceCatalog>,
        cancellation_token: CancellationToken,
    ) -> Self {
        let token = cancellation_token.clone();
        let handle = tokio::spawn(async move { run(index, catalog, token).await });
        Self {
            cancellation_token,
            handle,
        }
    }

    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Waits for the worker to stop on its own and returns everything it ingested.
    pub async fn join(self) -> IngestReport {
        match self.handle.await {
            Ok(report) => report,
            Err(e) => {
                error!("Ingestion worker panicked: {}", e);
                IngestReport {
                    cancelled: true,
                    ..IngestReport::default()
                }
            }
        }
    }

    pub async fn shutdown(self) -> IngestReport {
        self.cancel();
        self.join().await
    }
}

async fn run(
    index: Arc<NamespaceIndex>,
    catalog: Arc<dyn SourceCatalog>,
    cancellation_token: CancellationToken,
) -> IngestReport {
    // Subscribe before listing so nothing published in between is missed.
    let mut receiver = catalog.subscribe();
    let mut report = ingest_blocking(
        &index,
        catalog.list_available_sources(),
        &cancellation_token,
    )
    .await;
    info!(
        "Initial ingestion finished: {} ingested, {} failed",
        report.ingested.len(),
        report.failed.len()
    );

    while !report.cancelled {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Ingestion worker cancelled");
                report.cancelled = true;
            }
            received = receiver.recv() => match received {
                Ok(source) => {
                    let batch = ingest_blocking(&index, vec![source], &cancellation_token).await;
                    report.merge(batch);
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Missed {} source notifications, re-listing catalog", missed);
                    let batch = ingest_blocking(
                        &index,
                        catalog.list_available_sources(),
                        &cancellation_token,
                    )
                    .await;
                    report.merge(batch);
                }
                Err(RecvError::Closed) => {
                    info!("Source catalog closed, ingestion worker stopping");
                    break;
                }
            }
        }
    }

    report
}

// Source enumeration is synchronous and may touch the filesystem.
async fn ingest_blocking(
    index: &Arc<NamespaceIndex>,
    sources: Vec<SourceHandle>,
    cancellation_token: &CancellationToken,
) -> IngestReport {
    let index = Arc::clone(index);
    let token = cancellation_token.clone();
    let result =
        tokio::task::spawn_blocking(move || index.ingest(&sources, Some(&token))).await;

    match result {
        Ok(report) => report,
        Err(e) => {
            error!("Ingestion task panicked: {}", e);
            IngestReport::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceId;
    use crate::source::{InMemoryCatalog, StaticSource};
    use event_bus::{EventBus, SourceIngestionEvent, TypeIndexEvent};
    use tokio::time::{Duration, timeout};

    async fn wait_until_ingested(index: &NamespaceIndex, id: &str) {
        let source_id = SourceId::from(id);
        timeout(Duration::from_secs(5), async {
            while !index.is_ingested(&source_id) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("source was not ingested in time");
    }

    #[tokio::test]
    async fn test_worker_ingests_initial_and_published_sources() {
        let index = Arc::new(NamespaceIndex::new());
        let catalog = Arc::new(InMemoryCatalog::with_sources(vec![
            StaticSource::from_names("io", &["Sys.IO.File"]).into_handle(),
        ]));

        let worker = IngestionWorker::spawn(
            index.clone(),
            catalog.clone(),
            CancellationToken::new(),
        );
        wait_until_ingested(&index, "io").await;

        catalog.publish(StaticSource::from_names("net", &["Sys.Net.Socket"]).into_handle());
        wait_until_ingested(&index, "net").await;

        let report = worker.shutdown().await;
        assert!(report.cancelled);
        assert_eq!(report.ingested.len(), 2);
        assert_eq!(index.root_namespaces(), vec!["Sys".to_string()]);
        assert_eq!(index.sources_under("Sys").len(), 2);
    }

    #[tokio::test]
    async fn test_worker_skips_republished_source() {
        let index = Arc::new(NamespaceIndex::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let worker = IngestionWorker::spawn(
            index.clone(),
            catalog.clone(),
            CancellationToken::new(),
        );

        let source = StaticSource::from_names("io", &["Sys.IO.File"]).into_handle();
        catalog.publish(source.clone());
        wait_until_ingested(&index, "io").await;
        catalog.publish(source);

        // Publish a marker so the duplicate is known to have been processed.
        catalog.publish(StaticSource::from_names("marker", &["Marker.Type"]).into_handle());
        wait_until_ingested(&index, "marker").await;

        let report = worker.shutdown().await;
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(index.sources_under("Sys.IO").len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_worker() {
        let index = Arc::new(NamespaceIndex::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let token = CancellationToken::new();
        let worker = IngestionWorker::spawn(index, catalog, token.clone());

        token.cancel();
        let report = timeout(Duration::from_secs(5), worker.join())
            .await
            .expect("worker did not stop");
        assert!(report.cancelled);
    }

    #[tokio::test]
    async fn test_worker_emits_lifecycle_events() {
        let bus = Arc::new(EventBus::new());
        let mut events = bus.subscribe();
        let index = Arc::new(NamespaceIndex::with_event_bus(bus.clone()));
        let catalog = Arc::new(InMemoryCatalog::with_sources(vec![
            StaticSource::from_names("io", &["Sys.IO.File"]).into_handle(),
        ]));

        let worker = IngestionWorker::spawn(index.clone(), catalog, CancellationToken::new());
        wait_until_ingested(&index, "io").await;
        worker.shutdown().await;

        let mut completed = None;
        while let Ok(event) = events.try_recv() {
            if let TypeIndexEvent::SourceIngestion(SourceIngestionEvent::Completed(done)) = event {
                completed = Some(done);
            }
        }
        let completed = completed.expect("no completed event");
        assert_eq!(completed.source_id, "io");
        assert_eq!(completed.type_count, 1);
        assert_eq!(completed.namespace_count, 2);
    }
}
