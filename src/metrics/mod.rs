use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;
use tracing::error;


lazy_static! {
    pub static ref EVENTS_RECEIVED: IntCounterVec = IntCounterVec::new(
        Opts::new("events_received", "Push events handed to the engine"),
        &["resource"]
    )
    .expect("Should succeed to create metric");

    pub static ref EVENTS_DROPPED: IntCounterVec = IntCounterVec::new(
        Opts::new("events_dropped", "Malformed push events dropped by the normalizer"),
        &["reason"]
    )
    .expect("Should succeed to create metric");

    pub static ref VIEWS_UPDATED: IntCounterVec = IntCounterVec::new(
        Opts::new("views_updated", "View snapshots changed by reconciliation"),
        &["resource"]
    )
    .expect("Should succeed to create metric");

    pub static ref TOTAL_UNDERFLOW: IntCounterVec = IntCounterVec::new(
        Opts::new("view_total_underflow", "Removes that found a view total already at zero"),
        &["resource"]
    )
    .expect("Should succeed to create metric");

    pub static ref RECONNECT_ATTEMPTS: IntCounterVec = IntCounterVec::new(
        Opts::new("reconnect_attempts", "Push connection attempts after a failure"),
        &["outcome"]
    )
    .expect("Should succeed to create metric");

    pub static ref CONNECTION_STATE: IntGauge = IntGauge::new(
        "connection_state",
        "0 disconnected, 1 connecting, 2 connected, 3 disconnecting"
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

static REGISTER: Once = Once::new();

pub(crate) fn register_custom_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_RECEIVED.clone()),
        Box::new(EVENTS_DROPPED.clone()),
        Box::new(VIEWS_UPDATED.clone()),
        Box::new(TOTAL_UNDERFLOW.clone()),
        Box::new(RECONNECT_ATTEMPTS.clone()),
        Box::new(CONNECTION_STATE.clone()),
    ];
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            error!("collector can not be registered: {}", e);
        }
    }
}

/// Text exposition of every view-sync metric, ready to be served to a
/// Prometheus scraper by the host application.
pub fn gather_metrics() -> String {
    REGISTER.call_once(|| register_custom_metrics(&REGISTRY));

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_else(|e| {
        error!("custom metrics could not be from_utf8'd: {}", e);
        String::default()
    })
}
