//! Page-one insert with tail eviction, remove, and replay.
//!
//! Scenario:
//!
//! 1. Register an active view, page 1, limit 2, holding `[B, A]` with total 5.
//! 2. Push an upsert for a new comment `C` that matches the view.
//! 3. Push the same upsert again.
//! 4. Push a remove for `B`.
//!
//! Expected Result:
//!
//! - After 2: rows `[C, B]`, `A` evicted, total 6, 3 pages.
//! - After 3: nothing changes and the version is not bumped.
//! - After 4: rows `[C]`, total 5, 3 pages.

use serde_json::json;
use view_sync::QueryParams;
use view_sync::RawEvent;

use crate::common::comment;
use crate::common::engine;
use crate::common::ids;
use crate::common::register;
use crate::common::upsert_comment;

#[test]
fn test_insert_evicts_tail_then_replay_is_noop() {
    let engine = engine();
    let key = register(
        &engine,
        QueryParams::new("comments").limit(2),
        vec![comment("B", "second"), comment("A", "first")],
        5,
    );

    let outcome = engine.apply_raw(&upsert_comment(comment("C", "third")));
    assert!(outcome.contains(&key));
    assert_eq!(ids(&engine, &key), vec!["C", "B"]);
    let snapshot = engine.snapshot(&key).unwrap();
    assert_eq!(snapshot.total(), 6);
    assert_eq!(snapshot.total_pages(), 3);
    assert_eq!(engine.version(), 1);

    let replay = engine.apply_raw(&upsert_comment(comment("C", "third")));
    assert!(replay.is_empty());
    assert_eq!(*engine.snapshot(&key).unwrap(), *snapshot);
    assert_eq!(engine.version(), 1);
}

#[test]
fn test_remove_decrements_total() {
    let engine = engine();
    let key = register(
        &engine,
        QueryParams::new("comments").limit(2),
        vec![comment("B", "second"), comment("A", "first")],
        5,
    );

    let outcome = engine.apply_raw(&RawEvent::new("comments:remove", json!({"id": "B"})));

    assert!(outcome.contains(&key));
    assert_eq!(ids(&engine, &key), vec!["A"]);
    let snapshot = engine.snapshot(&key).unwrap();
    assert_eq!(snapshot.total(), 4);
    assert_eq!(snapshot.total_pages(), 2);

    let replay = engine.apply_raw(&RawEvent::new("comments:remove", json!({"id": "B"})));
    assert!(replay.is_empty());
    assert_eq!(engine.snapshot(&key).unwrap().total(), 4);
}

#[test]
fn test_insert_on_later_page_leaves_view_stale() {
    let engine = engine();
    let key = register(
        &engine,
        QueryParams::new("comments").page(2).limit(2),
        vec![comment("B", "second"), comment("A", "first")],
        5,
    );

    let outcome = engine.apply_raw(&upsert_comment(comment("C", "third")));

    assert!(outcome.is_empty());
    assert_eq!(ids(&engine, &key), vec!["B", "A"]);
    assert_eq!(engine.snapshot(&key).unwrap().total(), 5);

    // An explicit refetch is what brings the page back in line
    engine
        .refresh_view(
            &key,
            view_sync::ViewSeed::new(vec![comment("A", "first"), comment("Z", "older")], 6),
        )
        .unwrap();
    assert_eq!(ids(&engine, &key), vec!["A", "Z"]);
    assert_eq!(engine.snapshot(&key).unwrap().total(), 6);
}
