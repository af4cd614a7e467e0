use std::time::Duration;

use serde_json::json;
use serde_json::Value;
use view_sync::EngineConfig;
use view_sync::QueryParams;
use view_sync::RawEvent;
use view_sync::ResourceCatalog;
use view_sync::ViewEngine;
use view_sync::ViewKey;
use view_sync::ViewSeed;

use crate::enable_logger;

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn engine() -> ViewEngine {
    enable_logger();
    ViewEngine::new(ResourceCatalog::builtin(), EngineConfig::default())
}

pub fn comment(
    id: &str,
    content: &str,
) -> Value {
    json!({
        "id": id,
        "content": content,
        "authorName": "Grace",
        "authorEmail": "grace@example.com",
        "postId": "p1",
        "isApproved": true,
        "deletedAt": null,
    })
}

pub fn deleted_comment(
    id: &str,
    content: &str,
) -> Value {
    let mut value = comment(id, content);
    value["deletedAt"] = json!("2024-05-01T10:00:00Z");
    value
}

pub fn upsert_comment(entity: Value) -> RawEvent {
    RawEvent::new("comments:upsert", json!({ "comment": entity }))
}

pub fn register(
    engine: &ViewEngine,
    params: QueryParams,
    rows: Vec<Value>,
    total: u64,
) -> ViewKey {
    engine
        .register_view(params, ViewSeed::new(rows, total))
        .expect("view registration")
}

pub fn ids(
    engine: &ViewEngine,
    key: &ViewKey,
) -> Vec<String> {
    engine
        .snapshot(key)
        .expect("view registered")
        .row_ids()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Polls `condition` until it holds or [`WAIT_TIMEOUT`] elapses.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
