//! Live views over the in-process transport.
//!
//! Scenario:
//!
//! 1. Register views, authenticate and start live views.
//! 2. Publish push events through the transport.
//! 3. Drop the transport link and publish again once reattached.
//! 4. Shut down.
//!
//! Expected Result:
//!
//! - Events reach the views in publish order and bump the version.
//! - After the drop every event name is reattached without caller
//!   involvement and updates keep flowing.
//! - Shutdown leaves the connection disconnected with no subscribers.

use std::sync::Arc;

use serde_json::json;
use view_sync::BackoffPolicy;
use view_sync::ConnectionManager;
use view_sync::ConnectionState;
use view_sync::Identity;
use view_sync::LiveViews;
use view_sync::LocalTransport;
use view_sync::QueryParams;
use view_sync::RawEvent;
use view_sync::ResourceCatalog;
use view_sync::SyncConfig;

use crate::common::comment;
use crate::common::engine;
use crate::common::ids;
use crate::common::register;
use crate::common::wait_until;
use crate::enable_logger;

fn fast_policy() -> BackoffPolicy {
    BackoffPolicy {
        max_retries: 0,
        timeout_ms: 500,
        base_delay_ms: 5,
        max_delay_ms: 20,
    }
}

fn connection(transport: &LocalTransport) -> ConnectionManager {
    let connection = ConnectionManager::new(Arc::new(transport.clone()), fast_policy());
    connection.set_identity(Identity::new("admin-1").with_role("admin")).unwrap();
    connection
}

/// Waits until every built-in event name is attached.
async fn wait_attached(transport: &LocalTransport) {
    let expected = ResourceCatalog::builtin().event_names().len();
    wait_until(|| transport.attached().len() == expected).await;
}

#[tokio::test]
async fn test_pushed_events_update_views_in_order() {
    let transport = LocalTransport::new();
    let engine = engine();
    let key = register(
        &engine,
        QueryParams::new("comments").limit(3),
        vec![comment("A", "a")],
        1,
    );
    let mut versions = engine.subscribe();

    let live = LiveViews::start(engine.clone(), connection(&transport)).unwrap();
    wait_attached(&transport).await;

    assert!(transport.publish("comments:upsert", json!({ "comment": comment("B", "b") })));
    assert!(transport.publish("comments:upsert", json!({ "comment": comment("C", "c") })));
    assert!(transport.publish("comments:remove", json!({ "id": "B" })));

    wait_until(|| engine.version() == 3).await;
    assert_eq!(ids(&engine, &key), vec!["C", "A"]);
    assert_eq!(engine.snapshot(&key).unwrap().total(), 2);
    assert!(versions.has_changed().unwrap());
    assert_eq!(*versions.borrow_and_update(), 3);

    live.shutdown().await;
}

#[tokio::test]
async fn test_reattaches_after_link_drop() {
    let transport = LocalTransport::new();
    let engine = engine();
    let key = register(&engine, QueryParams::new("comments"), vec![], 0);

    let live = LiveViews::start(engine.clone(), connection(&transport)).unwrap();
    let attached = engine.catalog().event_names().len();
    wait_until(|| transport.attached().len() == attached).await;

    transport.disconnect();
    assert!(!transport.publish("comments:upsert", json!({ "comment": comment("lost", "x") })));

    wait_until(|| transport.handshakes() == 2 && transport.attached().len() == attached).await;
    assert!(transport.publish("comments:upsert", json!({ "comment": comment("A", "a") })));

    wait_until(|| engine.version() == 1).await;
    assert_eq!(ids(&engine, &key), vec!["A"]);
    assert!(live.connection().is_connected());

    live.shutdown().await;
}

#[tokio::test]
async fn test_local_events_share_the_pump() {
    let transport = LocalTransport::new();
    let engine = engine();
    let key = register(&engine, QueryParams::new("comments"), vec![], 0);

    let live = LiveViews::start(engine.clone(), connection(&transport)).unwrap();
    live.pump()
        .send_raw(RawEvent::new("comments:upsert", json!({ "comment": comment("A", "a") })))
        .await
        .unwrap();

    wait_until(|| engine.version() == 1).await;
    assert_eq!(ids(&engine, &key), vec!["A"]);

    live.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_tears_connection_down() {
    let transport = LocalTransport::new();
    let live = LiveViews::start(engine(), connection(&transport)).unwrap();
    wait_attached(&transport).await;
    let connection = live.connection().clone();

    live.shutdown().await;

    assert_eq!(connection.state(), ConnectionState::Disconnected);
    assert_eq!(connection.subscriber_count(), 0);
    assert!(connection.identity().is_none());
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_starts_from_default_config() {
    enable_logger();
    let transport = LocalTransport::new();

    let live = LiveViews::from_config(
        &SyncConfig::default(),
        Arc::new(transport.clone()),
        Identity::new("admin-1"),
    )
    .unwrap();
    wait_attached(&transport).await;

    assert_eq!(live.connection().identity(), Some(Identity::new("admin-1")));
    assert_eq!(live.engine().catalog().len(), 4);

    live.shutdown().await;
}

#[tokio::test]
async fn test_rejects_blank_identity_from_config() {
    enable_logger();
    let result = LiveViews::from_config(
        &SyncConfig::default(),
        Arc::new(LocalTransport::new()),
        Identity::new(""),
    );

    assert!(result.is_err());
}
