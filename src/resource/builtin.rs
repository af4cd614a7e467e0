//! Adapters for the resources the admin console pushes live updates for.

use super::FieldKind;
use super::ResourceSpec;
use super::StatusRule;
use crate::constants::RESOURCE_CHAT_GROUPS;
use crate::constants::RESOURCE_COMMENTS;
use crate::constants::RESOURCE_CONTACT_REQUESTS;
use crate::constants::RESOURCE_NOTIFICATIONS;

pub fn comments() -> ResourceSpec {
    ResourceSpec::new(RESOURCE_COMMENTS)
        .with_envelope("comment")
        .with_searchable(["content", "authorName", "authorEmail"])
        .with_filter("postId", FieldKind::Text)
        .with_filter("authorId", FieldKind::Text)
        .with_filter("isApproved", FieldKind::Boolean)
        .with_status(StatusRule::timestamp("deletedAt"))
}

pub fn contact_requests() -> ResourceSpec {
    ResourceSpec::new(RESOURCE_CONTACT_REQUESTS)
        .with_envelope("contactRequest")
        .with_searchable(["name", "email", "subject", "message"])
        .with_filter("status", FieldKind::Text)
        .with_filter("isRead", FieldKind::Boolean)
        .with_status(StatusRule::timestamp("deletedAt"))
}

pub fn notifications() -> ResourceSpec {
    ResourceSpec::new(RESOURCE_NOTIFICATIONS)
        .with_envelope("notification")
        .with_searchable(["title", "message"])
        .with_filter("type", FieldKind::Text)
        .with_filter("userId", FieldKind::Text)
        .with_filter("isRead", FieldKind::Boolean)
        .with_filter("priority", FieldKind::Number)
        .with_status(StatusRule::timestamp("deletedAt"))
}

pub fn chat_groups() -> ResourceSpec {
    ResourceSpec::new(RESOURCE_CHAT_GROUPS)
        .with_envelope("group")
        .with_searchable(["name", "description"])
        .with_filter("ownerId", FieldKind::Text)
        .with_filter("isPrivate", FieldKind::Boolean)
        .with_status(StatusRule::timestamp("deletedAt"))
}

/// Every built-in adapter
pub fn all() -> Vec<ResourceSpec> {
    vec![comments(), contact_requests(), notifications(), chat_groups()]
}
