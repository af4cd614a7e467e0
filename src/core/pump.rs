//! Ordered event pump
//!
//! Single-consumer queue in front of the engine. Producers on any task push
//! events; one worker applies them strictly in arrival order, so no two
//! events are ever reconciled in parallel against the same registry.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::trace;

use super::ViewEngine;
use crate::CanonicalEvent;
use crate::Error;
use crate::RawEvent;
use crate::Result;

#[derive(Debug)]
pub(crate) enum PumpMessage {
    Raw(RawEvent),
    Canonical(CanonicalEvent),
}

/// Producer handle. The worker stops once every handle is dropped and the
/// queue is drained.
#[derive(Debug, Clone)]
pub struct EventPump {
    tx: mpsc::Sender<PumpMessage>,
}

impl EventPump {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(
        engine: ViewEngine,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run(engine, rx));
        (Self { tx }, handle)
    }

    /// Spawns a worker sized by the engine's configured queue capacity.
    pub fn for_engine(engine: &ViewEngine) -> (Self, JoinHandle<()>) {
        let capacity = engine.config().event_queue_capacity;
        Self::spawn(engine.clone(), capacity)
    }

    /// Queues a raw push event, waiting for room when the queue is full.
    pub async fn send_raw(
        &self,
        raw: RawEvent,
    ) -> Result<()> {
        self.tx
            .send(PumpMessage::Raw(raw))
            .await
            .map_err(|_| Error::PumpClosed)
    }

    /// Queues an already normalized event.
    pub async fn send(
        &self,
        event: CanonicalEvent,
    ) -> Result<()> {
        self.tx
            .send(PumpMessage::Canonical(event))
            .await
            .map_err(|_| Error::PumpClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

async fn run(
    engine: ViewEngine,
    mut rx: mpsc::Receiver<PumpMessage>,
) {
    debug!("Event pump started");
    while let Some(message) = rx.recv().await {
        let outcome = match message {
            PumpMessage::Raw(raw) => engine.apply_raw(&raw),
            PumpMessage::Canonical(event) => engine.apply(&event),
        };
        trace!(updated = outcome.len(), version = engine.version(), "Event pumped");
    }
    debug!("Event pump stopped");
}
