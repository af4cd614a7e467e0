//! An edit that stops matching the search term removes the row.

use serde_json::json;
use view_sync::QueryParams;
use view_sync::RawEvent;

use crate::common::engine;
use crate::common::ids;
use crate::common::register;

fn contact_request(
    id: &str,
    subject: &str,
    is_read: bool,
) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Linus",
        "email": "linus@example.com",
        "subject": subject,
        "message": "hello",
        "status": "open",
        "isRead": is_read,
        "deletedAt": null,
    })
}

#[test]
fn test_row_leaves_view_when_search_no_longer_matches() {
    let engine = engine();
    let key = register(
        &engine,
        QueryParams::new("contact_requests").search("  Invoice "),
        vec![
            contact_request("r2", "Invoice overdue", false),
            contact_request("r1", "Second INVOICE", false),
        ],
        2,
    );

    let outcome = engine.apply_raw(&RawEvent::new(
        "contact_requests:updated",
        json!({"contactRequest": contact_request("r2", "Partnership", false)}),
    ));

    assert!(outcome.contains(&key));
    assert_eq!(ids(&engine, &key), vec!["r1"]);
    assert_eq!(engine.snapshot(&key).unwrap().total(), 1);
}

#[test]
fn test_boolean_filter_tracks_read_flag() {
    let engine = engine();
    let unread = register(
        &engine,
        QueryParams::new("contact_requests").filter("isRead", "false"),
        vec![contact_request("r1", "Hi", false)],
        1,
    );
    let read = register(
        &engine,
        QueryParams::new("contact_requests").filter("isRead", "true"),
        vec![],
        0,
    );

    engine.apply_raw(&RawEvent::new(
        "contact_requests:upsert",
        json!({"contactRequest": contact_request("r1", "Hi", true)}),
    ));

    assert!(ids(&engine, &unread).is_empty());
    assert_eq!(ids(&engine, &read), vec!["r1"]);
}
