use event_bus::EventBus;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use type_index::{
    InMemoryCatalog, NamespaceIndex, NavigationEngine, RegistryFileSource, ShortNameAliases,
    SourceCatalog, SourceHandle,
};

use crate::config::Settings;

/// Everything a command needs: the shared index, its catalog and the query engine.
pub struct TypeHost {
    pub index: Arc<NamespaceIndex>,
    pub catalog: Arc<InMemoryCatalog>,
    pub event_bus: Arc<EventBus>,
    pub engine: NavigationEngine,
}

impl TypeHost {
    /// Builds the index and ingests every configured registry before returning.
    pub fn build(settings: &Settings, cancellation_token: &CancellationToken) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let index = Arc::new(NamespaceIndex::with_event_bus(Arc::clone(&event_bus)));

        let sources: Vec<SourceHandle> = settings
            .registries
            .iter()
            .map(|path| Arc::new(RegistryFileSource::from_path(path.clone())) as SourceHandle)
            .collect();
        let catalog = Arc::new(InMemoryCatalog::with_sources(sources));

        let report = index.ingest(&catalog.list_available_sources(), Some(cancellation_token));
        let namespace_count = index.with_view(|view| view.namespace_count());
        info!(
            "Loaded {} registries ({} failed), {} namespaces indexed",
            report.ingested.len(),
            report.failed.len(),
            namespace_count
        );
        for failure in &report.failed {
            warn!("Registry {} unavailable: {}", failure.source_id, failure.error);
        }

        let mut aliases = ShortNameAliases::builtin();
        aliases.extend(settings.aliases.clone());

        let engine = NavigationEngine::new(
            Arc::clone(&index),
            &settings.navigation_config(),
            Arc::new(aliases),
        );

        Self {
            index,
            catalog,
            event_bus,
            engine,
        }
    }
}
