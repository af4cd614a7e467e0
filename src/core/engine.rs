//! View engine
//!
//! Owns the view registry behind one coarse lock and drives the
//! normalize → reconcile → signal pipeline. Every reconciliation pass and
//! every (un)registration runs under the same lock, so a deregistration is
//! applied strictly before or after a pass, never in the middle of one.
//!
//! The engine is a cheap handle; clones share the same registry.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;
use tracing::warn;

use super::reconcile;
use super::split_event_name;
use super::EventNormalizer;
use super::ReconcileOutcome;
use super::VersionSignal;
use super::ViewRegistry;
use crate::metrics;
use crate::CanonicalEvent;
use crate::EngineConfig;
use crate::QueryParams;
use crate::RawEvent;
use crate::ResourceAdapter;
use crate::ResourceCatalog;
use crate::Result;
use crate::SyncConfig;
use crate::ViewError;
use crate::ViewKey;
use crate::ViewSeed;
use crate::ViewSnapshot;

#[derive(Debug, Clone)]
pub struct ViewEngine {
    inner: Arc<EngineInner>,
}

#[derive(Debug)]
struct EngineInner {
    registry: Mutex<ViewRegistry>,
    catalog: Arc<ResourceCatalog>,
    normalizer: EventNormalizer,
    signal: VersionSignal,
    config: EngineConfig,
}

impl ViewEngine {
    pub fn new(
        catalog: ResourceCatalog,
        config: EngineConfig,
    ) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            inner: Arc::new(EngineInner {
                registry: Mutex::new(ViewRegistry::new()),
                normalizer: EventNormalizer::new(catalog.clone()),
                catalog,
                signal: VersionSignal::new(),
                config,
            }),
        }
    }

    /// Engine over the built-in resources plus those declared in `config`.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let catalog = ResourceCatalog::from_config(&config.resources)?;
        Ok(Self::new(catalog, config.engine.clone()))
    }

    pub fn catalog(&self) -> &Arc<ResourceCatalog> {
        &self.inner.catalog
    }

    pub fn normalizer(&self) -> &EventNormalizer {
        &self.inner.normalizer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Registers a consumer of `params` seeded from the initial fetch.
    ///
    /// Fails for programmer errors only: unknown resource, malformed
    /// paging, undeclared filter columns or an inconsistent seed.
    pub fn register_view(
        &self,
        params: QueryParams,
        seed: ViewSeed,
    ) -> Result<ViewKey> {
        let adapter = self.adapter(params.resource_name())?;
        let mut registry = self.inner.registry.lock();
        let reseeded = registry.contains(&params.key());
        let key = registry.register(adapter.as_ref(), params, seed, self.inner.config.max_page_size)?;
        if reseeded {
            self.inner.signal.bump();
        }
        Ok(key)
    }

    /// Drops one consumer of `key`. Unknown keys are a no-op.
    pub fn unregister_view(
        &self,
        key: &ViewKey,
    ) -> bool {
        self.inner.registry.lock().unregister(key)
    }

    /// Replaces a view's snapshot after an explicit full refetch.
    pub fn refresh_view(
        &self,
        key: &ViewKey,
        seed: ViewSeed,
    ) -> Result<Arc<ViewSnapshot>> {
        let adapter = self.adapter(key.resource())?;
        let mut registry = self.inner.registry.lock();
        let snapshot = registry.refresh(adapter.as_ref(), key, seed)?;
        self.inner.signal.bump();
        Ok(snapshot)
    }

    /// Current snapshot of `key`. The returned snapshot is immutable; later
    /// passes publish new snapshots instead of touching this one.
    pub fn snapshot(
        &self,
        key: &ViewKey,
    ) -> Option<Arc<ViewSnapshot>> {
        self.inner.registry.lock().get(key)
    }

    pub fn view_count(&self) -> usize {
        self.inner.registry.lock().len()
    }

    pub fn subscribers(
        &self,
        key: &ViewKey,
    ) -> usize {
        self.inner.registry.lock().subscribers(key)
    }

    /// Applies an already normalized event to every registered view.
    pub fn apply(
        &self,
        event: &CanonicalEvent,
    ) -> ReconcileOutcome {
        let Some(adapter) = self.inner.catalog.get(event.resource()) else {
            warn!(resource = event.resource(), "Ignoring event for unknown resource");
            return ReconcileOutcome::default();
        };

        let mut registry = self.inner.registry.lock();
        let outcome = reconcile(event, adapter.as_ref(), &mut registry);
        if outcome.is_changed() {
            let version = self.inner.signal.bump();
            debug!(version, updated = outcome.len(), "Views changed");
        }
        outcome
    }

    /// Normalizes and applies a raw push event. Malformed events are
    /// dropped and yield an empty outcome.
    pub fn apply_raw(
        &self,
        raw: &RawEvent,
    ) -> ReconcileOutcome {
        metrics::EVENTS_RECEIVED
            .with_label_values(&[self.resource_label(&raw.name)])
            .inc();
        match self.inner.normalizer.normalize(raw) {
            Some(event) => self.apply(&event),
            None => ReconcileOutcome::default(),
        }
    }

    pub fn version(&self) -> u64 {
        self.inner.signal.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.signal.subscribe()
    }

    pub fn signal(&self) -> &VersionSignal {
        &self.inner.signal
    }

    /// Resource half of an event name when known, so metric labels stay
    /// bounded by the catalog.
    fn resource_label<'a>(
        &self,
        name: &'a str,
    ) -> &'a str {
        match split_event_name(name) {
            Ok((resource, _)) if self.inner.catalog.contains(resource) => resource,
            _ => "unknown",
        }
    }

    fn adapter(
        &self,
        resource: &str,
    ) -> Result<Arc<dyn ResourceAdapter>> {
        self.inner
            .catalog
            .get(resource)
            .cloned()
            .ok_or_else(|| ViewError::UnknownResource(resource.to_string()).into())
    }
}
