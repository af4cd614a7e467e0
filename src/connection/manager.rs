use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::ConnectionState;
use super::Identity;
use super::Subscription;
use super::Transport;
use super::TransportSession;
use crate::metrics;
use crate::utils::backoff::backoff_delay;
use crate::utils::backoff::retries_exhausted;
use crate::BackoffPolicy;
use crate::ConnectionConfig;
use crate::ConnectionError;
use crate::Error;
use crate::RawEvent;
use crate::Result;

pub(super) struct SubscriberEntry {
    events: HashSet<String>,
    tx: mpsc::UnboundedSender<RawEvent>,
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub(super) struct Inner {
    transport: Arc<dyn Transport>,
    policy: BackoffPolicy,
    identity: ArcSwapOption<Identity>,
    state: watch::Sender<ConnectionState>,
    pub(super) subscribers: DashMap<u64, SubscriberEntry>,
    next_subscriber_id: AtomicU64,
    /// Wakes the worker to re-diff attached event names
    pub(super) resync: Notify,
    worker: Mutex<Option<Worker>>,
}

/// Why a served session ended
enum SessionEnd {
    Cancelled,
    Dropped,
}

/// Handle to the process-wide push connection
///
/// Cheap to clone; every clone drives the same connection. The connection
/// is established once there is at least one subscriber and an identity.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("subscribers", &self.inner.subscribers.len())
            .finish()
    }
}

impl ConnectionManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        policy: BackoffPolicy,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                transport,
                policy,
                identity: ArcSwapOption::empty(),
                state,
                subscribers: DashMap::new(),
                next_subscriber_id: AtomicU64::new(1),
                resync: Notify::new(),
                worker: Mutex::new(None),
            }),
        }
    }

    pub fn from_config(
        transport: Arc<dyn Transport>,
        config: &ConnectionConfig,
    ) -> Self {
        Self::new(transport, config.reconnect)
    }

    /// Registers interest in `events`. The returned [`Subscription`]
    /// receives matching events until dropped; names are reattached on
    /// every reconnect without caller involvement.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<I, S>(
        &self,
        events: I,
    ) -> Result<Subscription>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Fatal(format!("subscribe requires a tokio runtime: {e}")))?;

        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        let events: HashSet<String> = events.into_iter().map(Into::into).collect();
        debug!(subscriber = id, events = events.len(), "Subscriber registered");
        self.inner.subscribers.insert(id, SubscriberEntry { events, tx });

        self.inner.ensure_worker(&runtime);
        Ok(Subscription::new(id, rx, Arc::downgrade(&self.inner)))
    }

    /// Sets or replaces the handshake identity.
    ///
    /// While connected the new identity is only held for the next handshake;
    /// it never forces a reconnect.
    pub fn set_identity(
        &self,
        identity: Identity,
    ) -> Result<()> {
        identity.validate()?;
        let changed = self
            .inner
            .identity
            .load()
            .as_deref()
            .map_or(true, |current| *current != identity);
        self.inner.identity.store(Some(Arc::new(identity)));
        if changed {
            debug!(state = %self.state(), "Connection identity updated");
        }

        if let Ok(runtime) = Handle::try_current() {
            self.inner.ensure_worker(&runtime);
        }
        Ok(())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.identity.load_full().map(|identity| (*identity).clone())
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Explicit, user-initiated teardown (e.g. sign-out).
    ///
    /// Clears every subscription and the identity; nothing is replayed on a
    /// later connect. Outstanding [`Subscription`]s observe end of stream.
    pub async fn teardown(&self) {
        info!("Tearing down push connection");
        self.inner.set_state(ConnectionState::Disconnecting);
        self.inner.subscribers.clear();
        self.inner.identity.store(None);

        let worker = self.inner.worker.lock().take();
        if let Some(worker) = worker {
            worker.cancel.cancel();
            if let Err(e) = worker.handle.await {
                if e.is_panic() {
                    error!("Connection worker panicked: {:?}", e);
                }
            }
        }
        self.inner.set_state(ConnectionState::Disconnected);
    }
}

impl Inner {
    fn set_state(
        &self,
        state: ConnectionState,
    ) {
        let previous = self.state.send_replace(state);
        metrics::CONNECTION_STATE.set(state.code());
        if previous != state {
            debug!(from = %previous, to = %state, "Connection state changed");
        }
    }

    /// Spawns the connection worker when there is something to connect for
    /// and none is running; otherwise asks the running worker to resync.
    fn ensure_worker(
        self: &Arc<Self>,
        runtime: &Handle,
    ) {
        let mut slot = self.worker.lock();
        if let Some(worker) = slot.as_ref() {
            if !worker.handle.is_finished() {
                self.resync.notify_one();
                return;
            }
        }
        if self.subscribers.is_empty() || self.identity.load().is_none() {
            return;
        }

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run(Arc::clone(self), cancel.clone()));
        *slot = Some(Worker { cancel, handle });
    }

    /// Union of every event name some subscriber wants
    fn wanted_events(&self) -> BTreeSet<String> {
        self.subscribers
            .iter()
            .flat_map(|entry| entry.events.iter().cloned().collect::<Vec<_>>())
            .collect()
    }

    fn dispatch(
        &self,
        event: RawEvent,
    ) {
        let mut delivered = 0usize;
        for entry in self.subscribers.iter() {
            if entry.events.contains(&event.name) && entry.tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        if delivered == 0 {
            debug!(event = %event.name, "No subscriber for delivered event");
        }
    }

    async fn establish(
        &self,
        identity: &Identity,
    ) -> std::result::Result<(Box<dyn TransportSession>, BTreeSet<String>), ConnectionError> {
        let handshake_timeout = Duration::from_millis(self.policy.timeout_ms);
        let mut session = match timeout(handshake_timeout, self.transport.connect(identity)).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(ConnectionError::HandshakeTimeout(handshake_timeout)),
        };

        let mut attached = BTreeSet::new();
        if let Err(e) = sync_attachments(session.as_mut(), &mut attached, self.wanted_events()).await {
            session.close().await;
            return Err(e);
        }
        Ok((session, attached))
    }

    async fn serve(
        &self,
        session: &mut dyn TransportSession,
        attached: &mut BTreeSet<String>,
        cancel: &CancellationToken,
    ) -> SessionEnd {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return SessionEnd::Cancelled,
                _ = self.resync.notified() => {
                    if let Err(e) = sync_attachments(session, attached, self.wanted_events()).await {
                        warn!("Failed to update event subscriptions: {}", e);
                        return SessionEnd::Dropped;
                    }
                }
                event = session.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => return SessionEnd::Dropped,
                },
            }
        }
    }
}

/// Attaches names that are wanted but not attached and detaches the rest.
pub(super) async fn sync_attachments(
    session: &mut dyn TransportSession,
    attached: &mut BTreeSet<String>,
    wanted: BTreeSet<String>,
) -> std::result::Result<(), ConnectionError> {
    for event in wanted.difference(attached) {
        session.attach(event).await?;
    }
    for event in attached.difference(&wanted) {
        session.detach(event).await?;
    }
    *attached = wanted;
    Ok(())
}

/// Connection worker: connect, serve until the session drops, reconnect.
async fn run(
    inner: Arc<Inner>,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;
    let mut failures: usize = 0;

    loop {
        if cancel.is_cancelled() {
            return;
        }
        let Some(identity) = inner.identity.load_full() else {
            inner.set_state(ConnectionState::Disconnected);
            return;
        };

        inner.set_state(ConnectionState::Connecting);
        let established = tokio::select! {
            _ = cancel.cancelled() => return,
            result = inner.establish(&identity) => result,
        };

        match established {
            Ok((mut session, mut attached)) => {
                if failures > 0 {
                    metrics::RECONNECT_ATTEMPTS.with_label_values(&["succeeded"]).inc();
                }
                attempt = 0;
                failures = 0;
                inner.set_state(ConnectionState::Connected);
                info!(user = %identity.user_id, events = attached.len(), "Push connection established");

                match inner.serve(session.as_mut(), &mut attached, &cancel).await {
                    SessionEnd::Cancelled => {
                        session.close().await;
                        return;
                    }
                    SessionEnd::Dropped => {
                        session.close().await;
                        warn!("Push connection dropped, reconnecting");
                    }
                }
            }
            Err(e) => {
                failures += 1;
                metrics::RECONNECT_ATTEMPTS.with_label_values(&["failed"]).inc();
                if retries_exhausted(&inner.policy, failures) {
                    error!("Push connection failed: {}", ConnectionError::RetriesExhausted(failures));
                    inner.set_state(ConnectionState::Disconnected);
                    return;
                }

                let delay = backoff_delay(&inner.policy, attempt);
                attempt = attempt.saturating_add(1);
                warn!(
                    attempt = failures,
                    delay_ms = delay.as_millis() as u64,
                    "Push connection attempt failed: {}",
                    e
                );
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
