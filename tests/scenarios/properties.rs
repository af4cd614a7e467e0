//! Invariants that hold after any sequence of events.
//!
//! A seeded generator drives a few hundred mixed upserts, removes
//! and lifecycle events over a handful of comment ids against views with
//! different partitions, filters, search terms and pages.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde_json::json;
use view_sync::Partition;
use view_sync::QueryParams;
use view_sync::RawEvent;
use view_sync::ViewEngine;
use view_sync::ViewKey;

use crate::common::comment;
use crate::common::deleted_comment;
use crate::common::engine;
use crate::common::register;

fn random_event(rng: &mut StdRng) -> RawEvent {
    let id = format!("c{}", rng.gen_range(0..8));
    let content = if rng.gen_range(0..2) == 0 { "hello world" } else { "goodbye" };
    let mut entity = if rng.gen_range(0..3) == 0 {
        deleted_comment(&id, content)
    } else {
        comment(&id, content)
    };
    entity["postId"] = json!(format!("p{}", rng.gen_range(0..2)));

    match rng.gen_range(0..5) {
        0 => RawEvent::new("comments:remove", json!({ "id": id })),
        1 => RawEvent::new("comments:deleted", json!({ "comment": deleted_comment(&id, content) })),
        2 => RawEvent::new("comments:restored", json!({ "comment": comment(&id, content) })),
        _ => RawEvent::new("comments:upsert", json!({ "comment": entity })),
    }
}

fn views(engine: &ViewEngine) -> Vec<ViewKey> {
    vec![
        register(engine, QueryParams::new("comments").limit(3), vec![], 0),
        register(
            engine,
            QueryParams::new("comments").partition(Partition::Deleted).limit(3),
            vec![],
            0,
        ),
        register(
            engine,
            QueryParams::new("comments").partition(Partition::All).limit(4),
            vec![],
            0,
        ),
        register(engine, QueryParams::new("comments").filter("postId", "p1"), vec![], 0),
        register(engine, QueryParams::new("comments").search("HELLO"), vec![], 0),
        register(
            engine,
            QueryParams::new("comments").page(2).limit(2),
            vec![comment("c0", "hello world"), comment("c1", "goodbye")],
            4,
        ),
    ]
}

#[test]
fn test_invariants_hold_under_random_events() {
    let engine = engine();
    let keys = views(&engine);
    let mut rng = StdRng::seed_from_u64(0x9E37_79B9_7F4A_7C15);
    let mut last_version = engine.version();

    for _ in 0..500 {
        let event = random_event(&mut rng);
        let outcome = engine.apply_raw(&event);

        // One bump per changed pass, none otherwise
        let expected = if outcome.is_changed() { last_version + 1 } else { last_version };
        assert_eq!(engine.version(), expected);
        last_version = engine.version();

        for key in &keys {
            let snapshot = engine.snapshot(key).unwrap();
            let params = key.params();
            assert!(snapshot.rows().len() <= params.page_size() as usize);
            assert!(snapshot.total() >= snapshot.rows().len() as u64);

            let mut ids = snapshot.row_ids();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), snapshot.rows().len(), "duplicate rows in {key}");

            if params.page_number() == 1 {
                let adapter = engine.catalog().get(params.resource_name()).unwrap();
                for row in snapshot.rows() {
                    assert!(view_sync::matches(adapter.as_ref(), params, row), "{key} holds a non-matching row");
                }
            }
        }
    }
}

#[test]
fn test_applying_same_event_twice_equals_once() {
    let engine = engine();
    let keys = views(&engine);
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let event = random_event(&mut rng);
        engine.apply_raw(&event);
        let once: Vec<_> = keys.iter().map(|key| engine.snapshot(key).unwrap()).collect();

        let replay = engine.apply_raw(&event);
        assert!(replay.is_empty(), "replaying {} changed views", event.name);
        for (key, snapshot) in keys.iter().zip(&once) {
            assert_eq!(*engine.snapshot(key).unwrap(), **snapshot);
        }
    }
}

#[test]
fn test_unregistered_view_is_never_touched() {
    let engine = engine();
    let keys = views(&engine);
    let dropped = keys[0].clone();
    assert!(engine.unregister_view(&dropped));

    let outcome = engine.apply_raw(&RawEvent::new(
        "comments:upsert",
        json!({ "comment": comment("c9", "hello world") }),
    ));

    assert!(!outcome.contains(&dropped));
    assert!(engine.snapshot(&dropped).is_none());
    assert_eq!(engine.view_count(), keys.len() - 1);
}
