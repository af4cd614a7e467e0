use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::EntityId;
use super::EntityRow;
use super::EntityStatus;

/// A named push event as delivered by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// `<resource>:<action>`
    pub name: String,
    /// Resource-specific payload
    #[serde(default)]
    pub payload: Value,
}

impl RawEvent {
    pub fn new(
        name: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upsert,
    Remove,
}

/// Transport-agnostic form of one mutation notification
///
/// Upserts always carry the entity snapshot and the partition it now lives
/// in; removes carry only the id. `previous_partition == None` means the
/// entity was not previously known (a true creation) or the payload did not
/// say.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEvent {
    resource: String,
    operation: Operation,
    entity_id: EntityId,
    entity: Option<EntityRow>,
    previous_partition: Option<EntityStatus>,
    next_partition: Option<EntityStatus>,
}

impl CanonicalEvent {
    pub fn upsert(
        resource: impl Into<String>,
        entity: EntityRow,
        next_partition: EntityStatus,
        previous_partition: Option<EntityStatus>,
    ) -> Self {
        Self {
            resource: resource.into(),
            operation: Operation::Upsert,
            entity_id: entity.id().clone(),
            entity: Some(entity),
            previous_partition,
            next_partition: Some(next_partition),
        }
    }

    pub fn remove(
        resource: impl Into<String>,
        entity_id: EntityId,
        previous_partition: Option<EntityStatus>,
    ) -> Self {
        Self {
            resource: resource.into(),
            operation: Operation::Remove,
            entity_id,
            entity: None,
            previous_partition,
            next_partition: None,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn entity(&self) -> Option<&EntityRow> {
        self.entity.as_ref()
    }

    pub fn previous_partition(&self) -> Option<EntityStatus> {
        self.previous_partition
    }

    pub fn next_partition(&self) -> Option<EntityStatus> {
        self.next_partition
    }

    /// True when the entity crossed between active and deleted.
    pub fn is_partition_migration(&self) -> bool {
        matches!(
            (self.previous_partition, self.next_partition),
            (Some(prev), Some(next)) if prev != next
        )
    }
}
