//! Reconciler
//!
//! Applies one [`CanonicalEvent`] to every registered view of its resource.
//! Views are processed independently; the outcome for one never depends on
//! another. Each view goes through exactly one of: untouched, replace in
//! place, insert at head (page 1 only), remove.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::matches;
use crate::metrics;
use crate::CanonicalEvent;
use crate::EntityRow;
use crate::ResourceAdapter;
use crate::ViewKey;
use crate::ViewRegistry;
use crate::ViewSnapshot;

/// Keys of the views a reconciliation pass actually changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub updated_view_keys: BTreeSet<ViewKey>,
}

impl ReconcileOutcome {
    pub fn is_changed(&self) -> bool {
        !self.updated_view_keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updated_view_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updated_view_keys.is_empty()
    }

    pub fn contains(
        &self,
        key: &ViewKey,
    ) -> bool {
        self.updated_view_keys.contains(key)
    }
}

/// What a single view needs to converge on the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Untouched,
    Replace(usize),
    Insert,
    Remove(usize),
}

pub(crate) fn plan(
    adapter: &dyn ResourceAdapter,
    key: &ViewKey,
    snapshot: &ViewSnapshot,
    event: &CanonicalEvent,
) -> Step {
    let should_include = event
        .entity()
        .is_some_and(|entity| matches(adapter, key.params(), entity));

    match (snapshot.position(event.entity_id()), should_include) {
        (None, false) => Step::Untouched,
        (Some(index), true) => Step::Replace(index),
        (None, true) => Step::Insert,
        (Some(index), false) => Step::Remove(index),
    }
}

/// Applies `event` to every view of its resource held in `registry`.
pub fn reconcile(
    event: &CanonicalEvent,
    adapter: &dyn ResourceAdapter,
    registry: &mut ViewRegistry,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    for (key, snapshot) in registry.views_of_mut(event.resource()) {
        let step = plan(adapter, key, snapshot, event);
        if apply_step(key, snapshot, event, step) {
            trace!(view = %key, ?step, id = %event.entity_id(), "View reconciled");
            metrics::VIEWS_UPDATED.with_label_values(&[event.resource()]).inc();
            outcome.updated_view_keys.insert(key.clone());
        }
    }

    debug!(
        resource = event.resource(),
        id = %event.entity_id(),
        updated = outcome.len(),
        "Reconciliation pass finished"
    );
    outcome
}

/// Returns true when the snapshot changed.
fn apply_step(
    key: &ViewKey,
    snapshot: &mut Arc<ViewSnapshot>,
    event: &CanonicalEvent,
    step: Step,
) -> bool {
    match step {
        Step::Untouched => false,
        Step::Replace(index) => {
            let Some(entity) = event.entity() else {
                return false;
            };
            // Replaying an identical snapshot is not a change
            if snapshot.rows()[index] == *entity {
                return false;
            }
            Arc::make_mut(snapshot).replace_at(index, entity.clone());
            true
        }
        Step::Insert => match event.entity() {
            Some(entity) if snapshot.page() == 1 => {
                insert_at_head(key, snapshot, entity);
                true
            }
            Some(_) => {
                // Placement on later pages needs ordering of the preceding
                // pages; leave the view stale until it is refetched.
                trace!(view = %key, id = %event.entity_id(), "Skipping insert past page 1");
                false
            }
            None => false,
        },
        Step::Remove(index) => {
            if !Arc::make_mut(snapshot).remove_at(index) {
                warn!(
                    view = %key,
                    id = %event.entity_id(),
                    "View total underflow while removing a row; registry has drifted from server"
                );
                metrics::TOTAL_UNDERFLOW.with_label_values(&[event.resource()]).inc();
            }
            true
        }
    }
}

fn insert_at_head(
    key: &ViewKey,
    snapshot: &mut Arc<ViewSnapshot>,
    entity: &EntityRow,
) {
    if let Some(evicted) = Arc::make_mut(snapshot).push_front(entity.clone()) {
        trace!(view = %key, evicted = %evicted.id(), "Evicted tail row to next page");
    }
}
