//! Soft delete moves a row from the active view into the deleted view.
//!
//! Scenario:
//!
//! 1. Register an active and a deleted view of comments, both on page 1.
//! 2. `X` is present in the active view.
//! 3. Push `comments:deleted` for `X`, now carrying a `deletedAt` timestamp.
//! 4. Push `comments:restored` for `X`.
//!
//! Expected Result:
//!
//! - After 3: `X` leaves the active view (total - 1) and is prepended to the
//!   deleted view (total + 1). One version bump for the whole pass.
//! - After 4: the move is reversed.

use serde_json::json;
use view_sync::Partition;
use view_sync::QueryParams;
use view_sync::RawEvent;

use crate::common::comment;
use crate::common::deleted_comment;
use crate::common::engine;
use crate::common::ids;
use crate::common::register;

#[test]
fn test_soft_delete_and_restore_move_rows() {
    let engine = engine();
    let active = register(
        &engine,
        QueryParams::new("comments").limit(5),
        vec![comment("X", "x"), comment("Y", "y")],
        2,
    );
    let deleted = register(
        &engine,
        QueryParams::new("comments").partition(Partition::Deleted).limit(5),
        vec![deleted_comment("W", "w")],
        1,
    );
    let all = register(
        &engine,
        QueryParams::new("comments").partition(Partition::All).limit(5),
        vec![comment("X", "x"), comment("Y", "y"), deleted_comment("W", "w")],
        3,
    );

    let outcome = engine.apply_raw(&RawEvent::new(
        "comments:deleted",
        json!({"comment": deleted_comment("X", "x")}),
    ));

    assert_eq!(outcome.len(), 3);
    assert_eq!(engine.version(), 1);
    assert_eq!(ids(&engine, &active), vec!["Y"]);
    assert_eq!(engine.snapshot(&active).unwrap().total(), 1);
    assert_eq!(ids(&engine, &deleted), vec!["X", "W"]);
    assert_eq!(engine.snapshot(&deleted).unwrap().total(), 2);
    // Still present in the unpartitioned view, replaced in place
    assert_eq!(ids(&engine, &all), vec!["X", "Y", "W"]);
    assert_eq!(engine.snapshot(&all).unwrap().total(), 3);

    engine.apply_raw(&RawEvent::new(
        "comments:restored",
        json!({"comment": comment("X", "x")}),
    ));

    assert_eq!(ids(&engine, &active), vec!["X", "Y"]);
    assert_eq!(engine.snapshot(&active).unwrap().total(), 2);
    assert_eq!(ids(&engine, &deleted), vec!["W"]);
    assert_eq!(engine.snapshot(&deleted).unwrap().total(), 1);
    assert_eq!(engine.version(), 2);
}

#[test]
fn test_migration_respects_filters_of_target_view() {
    let engine = engine();
    let active = register(&engine, QueryParams::new("comments"), vec![comment("X", "x")], 1);
    let other_post = register(
        &engine,
        QueryParams::new("comments")
            .partition(Partition::Deleted)
            .filter("postId", "p2"),
        vec![],
        0,
    );

    engine.apply_raw(&RawEvent::new(
        "comments:upsert",
        json!({"comment": deleted_comment("X", "x"), "previousPartition": "active"}),
    ));

    assert!(ids(&engine, &active).is_empty());
    assert!(ids(&engine, &other_post).is_empty());
    assert_eq!(engine.snapshot(&other_post).unwrap().total(), 0);
}
