// -
// Event names

/// Separates resource from action in a push event name: `<resource>:<action>`
pub const EVENT_NAME_SEPARATOR: char = ':';

/// Canonical actions
pub const ACTION_UPSERT: &str = "upsert";
pub const ACTION_REMOVE: &str = "remove";

/// Lifecycle actions, folded into upsert/remove by the normalizer
pub const ACTION_CREATED: &str = "created";
pub const ACTION_UPDATED: &str = "updated";
pub const ACTION_DELETED: &str = "deleted";
pub const ACTION_RESTORED: &str = "restored";
pub const ACTION_PURGED: &str = "purged";

/// Every action a resource may be subscribed on
pub const ALL_ACTIONS: [&str; 7] = [
    ACTION_UPSERT,
    ACTION_REMOVE,
    ACTION_CREATED,
    ACTION_UPDATED,
    ACTION_DELETED,
    ACTION_RESTORED,
    ACTION_PURGED,
];

// -
// Payload fields

pub(crate) const DEFAULT_ID_FIELD: &str = "id";
pub(crate) const DEFAULT_DELETED_AT_FIELD: &str = "deletedAt";

/// Optional explicit hint for the partition an entity left
pub(crate) const PREVIOUS_PARTITION_FIELD: &str = "previousPartition";
/// Optional prior entity state, used to derive the partition it left
pub(crate) const PREVIOUS_ENTITY_FIELD: &str = "previous";

// -
// Built-in resources

pub const RESOURCE_COMMENTS: &str = "comments";
pub const RESOURCE_CONTACT_REQUESTS: &str = "contact_requests";
pub const RESOURCE_NOTIFICATIONS: &str = "notifications";
pub const RESOURCE_CHAT_GROUPS: &str = "chat_groups";
