//! Version/Change Signal
//!
//! A monotonically increasing counter bumped once per reconciliation pass
//! that changed at least one view. Observers only learn that something
//! changed and re-read the snapshots they care about.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct VersionSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for VersionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Increments the version and wakes every receiver. Returns the new value.
    pub fn bump(&self) -> u64 {
        let mut next = 0;
        self.tx.send_modify(|version| {
            *version += 1;
            next = *version;
        });
        next
    }

    /// Receiver notified on every bump. Intermediate versions may be
    /// coalesced; the latest value is always observable.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}
