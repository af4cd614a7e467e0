//! Event normalization
//!
//! Turns a named, resource-specific push payload into a [`CanonicalEvent`].
//! The partition an upserted entity lands in is always computed from its own
//! status field; flags in the payload are not trusted for that. Malformed
//! payloads are dropped and logged, never surfaced as errors.

use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;
use tracing::trace;
use tracing::warn;

use crate::constants::ACTION_CREATED;
use crate::constants::ACTION_DELETED;
use crate::constants::ACTION_PURGED;
use crate::constants::ACTION_REMOVE;
use crate::constants::ACTION_RESTORED;
use crate::constants::ACTION_UPDATED;
use crate::constants::ACTION_UPSERT;
use crate::constants::EVENT_NAME_SEPARATOR;
use crate::constants::PREVIOUS_ENTITY_FIELD;
use crate::constants::PREVIOUS_PARTITION_FIELD;
use crate::metrics;
use crate::CanonicalEvent;
use crate::EntityId;
use crate::EntityRow;
use crate::EntityStatus;
use crate::EventError;
use crate::RawEvent;
use crate::ResourceAdapter;
use crate::ResourceCatalog;

/// Action half of a push event name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Upsert,
    Remove,
    Created,
    Updated,
    Deleted,
    Restored,
    Purged,
}

impl Action {
    pub(crate) fn parse(action: &str) -> Option<Self> {
        match action {
            ACTION_UPSERT => Some(Action::Upsert),
            ACTION_REMOVE => Some(Action::Remove),
            ACTION_CREATED => Some(Action::Created),
            ACTION_UPDATED => Some(Action::Updated),
            ACTION_DELETED => Some(Action::Deleted),
            ACTION_RESTORED => Some(Action::Restored),
            ACTION_PURGED => Some(Action::Purged),
            _ => None,
        }
    }

    fn is_remove(&self) -> bool {
        matches!(self, Action::Remove | Action::Purged)
    }

    /// Partition the entity left, as implied by the lifecycle step alone
    fn implied_previous(&self) -> Option<EntityStatus> {
        match self {
            Action::Deleted => Some(EntityStatus::Active),
            Action::Restored => Some(EntityStatus::Deleted),
            _ => None,
        }
    }
}

/// Splits `<resource>:<action>`. The resource may not be empty.
pub(crate) fn split_event_name(name: &str) -> Result<(&str, &str), EventError> {
    match name.rsplit_once(EVENT_NAME_SEPARATOR) {
        Some((resource, action)) if !resource.is_empty() && !action.is_empty() => Ok((resource, action)),
        _ => Err(EventError::MalformedName(name.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct EventNormalizer {
    catalog: Arc<ResourceCatalog>,
}

impl EventNormalizer {
    pub fn new(catalog: Arc<ResourceCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<ResourceCatalog> {
        &self.catalog
    }

    /// Canonical form of `raw`, or `None` when the payload is malformed.
    /// Dropped payloads are logged and counted.
    pub fn normalize(
        &self,
        raw: &RawEvent,
    ) -> Option<CanonicalEvent> {
        match self.try_normalize(raw) {
            Ok(event) => {
                trace!(
                    event = %raw.name,
                    id = %event.entity_id(),
                    op = ?event.operation(),
                    "Normalized push event"
                );
                Some(event)
            }
            Err(e) => {
                warn!(event = %raw.name, reason = e.reason(), "Dropping malformed push event: {}", e);
                metrics::EVENTS_DROPPED.with_label_values(&[e.reason()]).inc();
                None
            }
        }
    }

    /// Same as [`normalize`](Self::normalize) but reports why a payload was
    /// rejected instead of logging it.
    pub fn try_normalize(
        &self,
        raw: &RawEvent,
    ) -> Result<CanonicalEvent, EventError> {
        let (resource, action) = split_event_name(&raw.name)?;
        let adapter = self
            .catalog
            .get(resource)
            .ok_or_else(|| EventError::UnknownResource(resource.to_string()))?;
        let action = Action::parse(action).ok_or_else(|| EventError::UnknownAction {
            resource: resource.to_string(),
            action: action.to_string(),
        })?;

        let payload = match &raw.payload {
            Value::Object(payload) => payload,
            _ => return Err(EventError::NotAnObject(raw.name.clone())),
        };
        let entity = adapter
            .extract_entity(payload)
            .ok_or_else(|| EventError::NotAnObject(raw.name.clone()))?;

        if action.is_remove() {
            let id = entity
                .get(adapter.id_field())
                .or_else(|| payload.get(adapter.id_field()))
                .and_then(EntityId::from_value)
                .ok_or_else(|| EventError::MissingId(raw.name.clone()))?;
            let previous = previous_partition(adapter.as_ref(), payload, action).or_else(|| {
                // A remove that still carries the status field says where it was
                entity
                    .contains_key(adapter.status_rule().field())
                    .then(|| adapter.status_rule().status_of_fields(entity))
            });
            return Ok(CanonicalEvent::remove(resource, id, previous));
        }

        let row = EntityRow::from_object(entity.clone(), adapter.id_field())
            .ok_or_else(|| EventError::MissingId(raw.name.clone()))?;
        let next = adapter.status_of(&row);
        let previous = previous_partition(adapter.as_ref(), payload, action);
        Ok(CanonicalEvent::upsert(resource, row, next, previous))
    }
}

/// Partition the entity occupied before this event, in order of trust:
/// explicit `previousPartition`, a `previous` entity object, the lifecycle
/// action, otherwise unknown.
fn previous_partition(
    adapter: &dyn ResourceAdapter,
    payload: &Map<String, Value>,
    action: Action,
) -> Option<EntityStatus> {
    if let Some(status) = payload
        .get(PREVIOUS_PARTITION_FIELD)
        .and_then(Value::as_str)
        .and_then(EntityStatus::parse)
    {
        return Some(status);
    }
    if let Some(Value::Object(previous)) = payload.get(PREVIOUS_ENTITY_FIELD) {
        return Some(adapter.status_rule().status_of_fields(previous));
    }
    action.implied_previous()
}
