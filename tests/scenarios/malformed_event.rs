//! Malformed push events never reach the registry.

use serde_json::json;
use view_sync::QueryParams;
use view_sync::RawEvent;

use crate::common::comment;
use crate::common::engine;
use crate::common::register;

#[test]
fn test_malformed_events_are_dropped() {
    let engine = engine();
    let key = register(&engine, QueryParams::new("comments"), vec![comment("A", "a")], 1);
    let before = engine.snapshot(&key).unwrap();

    let events = [
        RawEvent::new("comments:upsert", json!({})),
        RawEvent::new("comments:remove", json!({})),
        RawEvent::new("comments:upsert", json!(null)),
        RawEvent::new("comments:upsert", json!({"comment": {"content": "missing id"}})),
        RawEvent::new("comments", json!({"id": "A"})),
        RawEvent::new("invoices:upsert", json!({"id": "A"})),
        RawEvent::new("comments:explode", json!({"id": "A"})),
    ];
    for event in &events {
        let outcome = engine.apply_raw(event);
        assert!(outcome.is_empty(), "{} changed a view", event.name);
    }

    assert_eq!(*engine.snapshot(&key).unwrap(), *before);
    assert_eq!(engine.version(), 0);
}

#[test]
fn test_unknown_fields_are_tolerated() {
    let engine = engine();
    let key = register(&engine, QueryParams::new("comments"), vec![], 0);

    let mut entity = comment("A", "a");
    entity["reactions"] = json!({"like": 3});
    let outcome = engine.apply_raw(&RawEvent::new(
        "comments:upsert",
        json!({"comment": entity, "traceId": "abc", "emittedAt": 1714550400}),
    ));

    assert!(outcome.contains(&key));
    let snapshot = engine.snapshot(&key).unwrap();
    assert_eq!(snapshot.rows()[0].field("reactions"), Some(&json!({"like": 3})));
}
