//! In-process transport
//!
//! Delivers events published from the same process. Useful for embedding
//! the engine behind an in-process event bus and for exercising the
//! connection lifecycle without a network.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use super::Identity;
use super::Transport;
use super::TransportSession;
use crate::ConnectionError;
use crate::RawEvent;

#[derive(Debug, Default)]
struct LocalState {
    link: Option<mpsc::UnboundedSender<RawEvent>>,
    /// Bumped per handshake so stale sessions cannot touch the live one
    generation: u64,
    attached: BTreeSet<String>,
    handshakes: usize,
    refuse_handshakes: usize,
    last_identity: Option<Identity>,
}

#[derive(Debug, Clone, Default)]
pub struct LocalTransport {
    state: Arc<Mutex<LocalState>>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` as `name` when the live session has that name
    /// attached. Returns whether the event was delivered.
    pub fn publish(
        &self,
        name: &str,
        payload: Value,
    ) -> bool {
        let state = self.state.lock();
        match &state.link {
            Some(link) if state.attached.contains(name) => link.send(RawEvent::new(name, payload)).is_ok(),
            _ => {
                trace!(event = name, "Local event not delivered");
                false
            }
        }
    }

    /// Drops the live session as a network failure would.
    pub fn disconnect(&self) {
        let mut state = self.state.lock();
        state.link = None;
        state.attached.clear();
    }

    /// Rejects the next `count` handshakes.
    pub fn refuse_handshakes(
        &self,
        count: usize,
    ) {
        self.state.lock().refuse_handshakes = count;
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().link.is_some()
    }

    pub fn attached(&self) -> Vec<String> {
        self.state.lock().attached.iter().cloned().collect()
    }

    pub fn handshakes(&self) -> usize {
        self.state.lock().handshakes
    }

    pub fn last_identity(&self) -> Option<Identity> {
        self.state.lock().last_identity.clone()
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn connect(
        &self,
        identity: &Identity,
    ) -> Result<Box<dyn TransportSession>, ConnectionError> {
        let mut state = self.state.lock();
        state.handshakes += 1;
        state.last_identity = Some(identity.clone());
        if state.refuse_handshakes > 0 {
            state.refuse_handshakes -= 1;
            return Err(ConnectionError::HandshakeFailed("refused by local transport".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        state.generation += 1;
        state.link = Some(tx);
        state.attached.clear();
        Ok(Box::new(LocalSession {
            state: self.state.clone(),
            generation: state.generation,
            rx,
        }))
    }
}

struct LocalSession {
    state: Arc<Mutex<LocalState>>,
    generation: u64,
    rx: mpsc::UnboundedReceiver<RawEvent>,
}

impl LocalSession {
    fn with_live_state<R>(
        &self,
        f: impl FnOnce(&mut LocalState) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock();
        (state.generation == self.generation && state.link.is_some()).then(|| f(&mut *state))
    }
}

#[async_trait]
impl TransportSession for LocalSession {
    async fn attach(
        &mut self,
        event: &str,
    ) -> Result<(), ConnectionError> {
        self.with_live_state(|state| {
            state.attached.insert(event.to_string());
        })
        .ok_or_else(|| ConnectionError::AttachFailed {
            event: event.to_string(),
            reason: "session closed".to_string(),
        })
    }

    async fn detach(
        &mut self,
        event: &str,
    ) -> Result<(), ConnectionError> {
        self.with_live_state(|state| {
            state.attached.remove(event);
        });
        Ok(())
    }

    async fn recv(&mut self) -> Option<RawEvent> {
        self.rx.recv().await
    }

    async fn close(&mut self) {
        self.with_live_state(|state| {
            state.link = None;
            state.attached.clear();
        });
        self.rx.close();
    }
}
