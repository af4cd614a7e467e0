//! Live views: the push connection wired to the engine.
//!
//! One subscription covering every event name the catalog understands feeds
//! the ordered [`EventPump`], so events reach the reconciler in exactly the
//! order the transport delivered them.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::ConnectionManager;
use crate::EventPump;
use crate::Identity;
use crate::Result;
use crate::Subscription;
use crate::SyncConfig;
use crate::Transport;
use crate::ViewEngine;


#[derive(Debug)]
pub struct LiveViews {
    engine: ViewEngine,
    connection: ConnectionManager,
    pump: EventPump,
    stop: CancellationToken,
    forwarder: JoinHandle<()>,
    pump_handle: JoinHandle<()>,
}

impl LiveViews {
    /// Subscribes `connection` to every catalog event and starts feeding
    /// them into `engine`. Must be called from within a tokio runtime.
    pub fn start(
        engine: ViewEngine,
        connection: ConnectionManager,
    ) -> Result<Self> {
        let subscription = connection.subscribe(engine.catalog().event_names())?;
        let (pump, pump_handle) = EventPump::for_engine(&engine);
        let stop = CancellationToken::new();
        let forwarder = tokio::spawn(forward(subscription, pump.clone(), stop.clone()));
        info!(resources = engine.catalog().len(), "Live views started");

        Ok(Self {
            engine,
            connection,
            pump,
            stop,
            forwarder,
            pump_handle,
        })
    }

    /// Builds engine and connection from `config`, authenticates as
    /// `identity` and starts.
    pub fn from_config(
        config: &SyncConfig,
        transport: Arc<dyn Transport>,
        identity: Identity,
    ) -> Result<Self> {
        let engine = ViewEngine::from_config(config)?;
        let connection = ConnectionManager::from_config(transport, &config.connection);
        connection.set_identity(identity)?;
        Self::start(engine, connection)
    }

    pub fn engine(&self) -> &ViewEngine {
        &self.engine
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// Producer handle for events that arrive outside the push connection.
    pub fn pump(&self) -> &EventPump {
        &self.pump
    }

    /// Stops forwarding and tears the connection down. Events already
    /// delivered to the subscription or queued in the pump are applied
    /// first.
    pub async fn shutdown(self) {
        self.stop.cancel();
        if let Err(e) = self.forwarder.await {
            if e.is_panic() {
                error!("Event forwarder panicked: {:?}", e);
            }
        }
        drop(self.pump);
        let _ = self.pump_handle.await;
        self.connection.teardown().await;
        debug!("Live views stopped");
    }
}

async fn forward(
    mut subscription: Subscription,
    pump: EventPump,
    stop: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            event = subscription.recv() => event,
        };
        let Some(event) = event else {
            break;
        };
        if pump.send_raw(event).await.is_err() {
            return;
        }
    }

    // Hand over whatever the transport delivered before the stop
    let mut drained = 0usize;
    while let Some(event) = subscription.try_recv() {
        if pump.send_raw(event).await.is_err() {
            break;
        }
        drained += 1;
    }
    debug!(subscriber = subscription.id(), drained, "Event forwarder stopped");
}
