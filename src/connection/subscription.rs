use std::sync::Weak;

use tokio::sync::mpsc;
use tracing::debug;

use super::manager::Inner;
use crate::RawEvent;

/// Receiving end of one subscriber
///
/// Dropping it unregisters the subscriber; event names nobody else wants
/// are detached from the transport.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<RawEvent>,
    manager: Weak<Inner>,
}

impl Subscription {
    pub(super) fn new(
        id: u64,
        rx: mpsc::UnboundedReceiver<RawEvent>,
        manager: Weak<Inner>,
    ) -> Self {
        Self { id, rx, manager }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event in transport order, or `None` after teardown.
    pub async fn recv(&mut self) -> Option<RawEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<RawEvent> {
        self.rx.try_recv().ok()
    }

    /// Events delivered but not yet received.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            if manager.subscribers.remove(&self.id).is_some() {
                debug!(subscriber = self.id, "Subscriber unregistered");
                manager.resync.notify_one();
            }
        }
    }
}
