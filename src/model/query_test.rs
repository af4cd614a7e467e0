use std::collections::HashSet;

use super::*;

#[test]
fn test_filter_order_does_not_change_cache_key() {
    let a = QueryParams::new("comments")
        .filter("postId", "p1")
        .filter("isApproved", "true");
    let b = QueryParams::new("comments")
        .filter("isApproved", "true")
        .filter("postId", "p1");

    assert_eq!(a, b);
    assert_eq!(a.key(), b.key());

    let keys: HashSet<ViewKey> = [a.key(), b.key()].into_iter().collect();
    assert_eq!(keys.len(), 1);
}

#[test]
fn test_blank_filter_values_are_dropped() {
    let q = QueryParams::new("comments")
        .filter("postId", "  ")
        .filter("authorId", "u1");

    assert_eq!(q.filters().len(), 1);
    assert_eq!(q, QueryParams::new("comments").filter("authorId", "u1"));
}

#[test]
fn test_blank_filter_value_clears_previous_constraint() {
    let q = QueryParams::new("comments").filter("postId", "p1").filter("postId", "");
    assert!(q.filters().is_empty());
}

#[test]
fn test_search_is_trimmed_and_blank_search_is_none() {
    let q = QueryParams::new("comments").search("  hello ");
    assert_eq!(q.search_term(), Some("hello"));
    assert_eq!(q, QueryParams::new("comments").search("hello"));

    let blank = QueryParams::new("comments").search("   ");
    assert_eq!(blank.search_term(), None);
    assert_eq!(blank, QueryParams::new("comments"));
}

#[test]
fn test_different_pages_are_different_views() {
    let first = QueryParams::new("comments").page(1).limit(10);
    let second = QueryParams::new("comments").page(2).limit(10);
    assert_ne!(first.key(), second.key());
}

#[test]
fn test_view_key_display_is_stable() {
    let key = QueryParams::new("notifications")
        .partition(Partition::Deleted)
        .page(2)
        .limit(5)
        .search("alert")
        .filter("type", "system")
        .filter("isRead", "false")
        .key();

    assert_eq!(
        key.to_string(),
        "notifications?partition=deleted&page=2&limit=5&search=alert&isRead=false&type=system"
    );
}

#[test]
fn test_partition_inclusion() {
    assert!(Partition::Active.includes(EntityStatus::Active));
    assert!(!Partition::Active.includes(EntityStatus::Deleted));
    assert!(Partition::Deleted.includes(EntityStatus::Deleted));
    assert!(!Partition::Deleted.includes(EntityStatus::Active));
    assert!(Partition::All.includes(EntityStatus::Active));
    assert!(Partition::All.includes(EntityStatus::Deleted));
}

#[test]
fn test_entity_id_from_value() {
    use serde_json::json;

    assert_eq!(EntityId::from_value(&json!("abc")), Some(EntityId::new("abc")));
    assert_eq!(EntityId::from_value(&json!(42)), Some(EntityId::new("42")));
    assert_eq!(EntityId::from_value(&json!("   ")), None);
    assert_eq!(EntityId::from_value(&json!(1.5)), None);
    assert_eq!(EntityId::from_value(&json!(null)), None);
    assert_eq!(EntityId::from_value(&json!({"id": 1})), None);
}
