//! View Registry
//!
//! Maps a normalized [`ViewKey`] to the last known [`ViewSnapshot`].
//! Snapshots are handed out as `Arc`s and never mutated once shared; the
//! reconciler writes through copy-on-write. Views are reference counted so
//! that two consumers watching the same query share one cache entry.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::EntityRow;
use crate::QueryParams;
use crate::ResourceAdapter;
use crate::Result;
use crate::ViewError;
use crate::ViewKey;
use crate::ViewSeed;
use crate::ViewSnapshot;

#[derive(Debug)]
struct ViewEntry {
    snapshot: Arc<ViewSnapshot>,
    subscribers: usize,
}

#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: HashMap<ViewKey, ViewEntry>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a consumer of `params`, seeding the snapshot from `seed`.
    ///
    /// Registering an already-known key adds a subscriber and replaces the
    /// snapshot with the fresher seed.
    pub fn register(
        &mut self,
        adapter: &dyn ResourceAdapter,
        params: QueryParams,
        seed: ViewSeed,
        max_page_size: u32,
    ) -> Result<ViewKey> {
        validate_params(adapter, &params, max_page_size)?;
        let snapshot = Arc::new(build_snapshot(adapter, &params, seed)?);
        let key = params.key();

        match self.views.get_mut(&key) {
            Some(entry) => {
                entry.subscribers += 1;
                entry.snapshot = snapshot;
                debug!(view = %key, subscribers = entry.subscribers, "View re-registered");
            }
            None => {
                debug!(view = %key, "View registered");
                self.views.insert(key.clone(), ViewEntry {
                    snapshot,
                    subscribers: 1,
                });
            }
        }
        Ok(key)
    }

    /// Drops one consumer of `key`. The view is discarded with its last
    /// consumer. Returns true when the view was discarded. Unknown keys are
    /// ignored.
    pub fn unregister(
        &mut self,
        key: &ViewKey,
    ) -> bool {
        let Some(entry) = self.views.get_mut(key) else {
            debug!(view = %key, "Ignoring unregister of unknown view");
            return false;
        };

        entry.subscribers = entry.subscribers.saturating_sub(1);
        if entry.subscribers == 0 {
            self.views.remove(key);
            debug!(view = %key, "View discarded");
            true
        } else {
            false
        }
    }

    /// Re-seeds an existing view after an explicit refetch without changing
    /// its subscriber count.
    pub fn refresh(
        &mut self,
        adapter: &dyn ResourceAdapter,
        key: &ViewKey,
        seed: ViewSeed,
    ) -> Result<Arc<ViewSnapshot>> {
        let entry = self
            .views
            .get_mut(key)
            .ok_or_else(|| ViewError::UnknownView(key.to_string()))?;
        let snapshot = Arc::new(build_snapshot(adapter, key.params(), seed)?);
        entry.snapshot = snapshot.clone();
        Ok(snapshot)
    }

    pub fn get(
        &self,
        key: &ViewKey,
    ) -> Option<Arc<ViewSnapshot>> {
        self.views.get(key).map(|entry| entry.snapshot.clone())
    }

    pub fn subscribers(
        &self,
        key: &ViewKey,
    ) -> usize {
        self.views.get(key).map(|entry| entry.subscribers).unwrap_or(0)
    }

    pub fn contains(
        &self,
        key: &ViewKey,
    ) -> bool {
        self.views.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ViewKey> {
        self.views.keys()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Mutable access for the reconciler, restricted to one resource.
    pub(crate) fn views_of_mut<'a>(
        &'a mut self,
        resource: &'a str,
    ) -> impl Iterator<Item = (&'a ViewKey, &'a mut Arc<ViewSnapshot>)> + 'a {
        self.views
            .iter_mut()
            .filter(move |(key, _)| key.resource() == resource)
            .map(|(key, entry)| (key, &mut entry.snapshot))
    }
}

fn validate_params(
    adapter: &dyn ResourceAdapter,
    params: &QueryParams,
    max_page_size: u32,
) -> Result<()> {
    let invalid = |reason: String| ViewError::InvalidQuery {
        resource: params.resource_name().to_string(),
        reason,
    };

    if params.resource_name() != adapter.name() {
        return Err(invalid(format!("adapter {} cannot serve this query", adapter.name())).into());
    }
    if params.page_number() == 0 {
        return Err(invalid("page is 1-based".to_string()).into());
    }
    if params.page_size() == 0 || params.page_size() > max_page_size {
        return Err(invalid(format!(
            "limit {} outside 1..={}",
            params.page_size(),
            max_page_size
        ))
        .into());
    }
    if let Some(column) = params.filters().keys().find(|c| adapter.filter_kind(c).is_none()) {
        return Err(ViewError::UnknownFilterColumn {
            resource: params.resource_name().to_string(),
            column: column.clone(),
        }
        .into());
    }
    Ok(())
}

fn build_snapshot(
    adapter: &dyn ResourceAdapter,
    params: &QueryParams,
    seed: ViewSeed,
) -> Result<ViewSnapshot> {
    let invalid = |reason: String| ViewError::InvalidSeed { reason };

    if seed.rows.len() > params.page_size() as usize {
        return Err(invalid(format!(
            "{} rows exceed limit {}",
            seed.rows.len(),
            params.page_size()
        ))
        .into());
    }
    if seed.total < seed.rows.len() as u64 {
        return Err(invalid(format!("total {} is below row count {}", seed.total, seed.rows.len())).into());
    }

    let mut seen = HashSet::with_capacity(seed.rows.len());
    let mut rows = Vec::with_capacity(seed.rows.len());
    for (index, value) in seed.rows.into_iter().enumerate() {
        let row = EntityRow::from_value(value, adapter.id_field())
            .ok_or_else(|| invalid(format!("row {index} has no {} field", adapter.id_field())))?;
        if !seen.insert(row.id().clone()) {
            return Err(invalid(format!("duplicate id {}", row.id())).into());
        }
        rows.push(row);
    }

    Ok(ViewSnapshot::new(rows, params.page_number(), params.page_size(), seed.total))
}
