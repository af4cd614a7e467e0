//! Push transport abstraction
//!
//! The wire protocol is owned by the host application. A [`Transport`]
//! performs the authenticated handshake; the resulting [`TransportSession`]
//! carries named events until the connection drops.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::Identity;
use crate::ConnectionError;
use crate::RawEvent;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Opens a new session authenticated as `identity`.
    ///
    /// The manager bounds this call with the configured handshake timeout;
    /// implementations need not time out on their own.
    async fn connect(
        &self,
        identity: &Identity,
    ) -> Result<Box<dyn TransportSession>, ConnectionError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransportSession: Send + 'static {
    /// Starts delivering events named `event`. Attaching an already
    /// attached name must succeed without side effects.
    async fn attach(
        &mut self,
        event: &str,
    ) -> Result<(), ConnectionError>;

    /// Stops delivering events named `event`.
    async fn detach(
        &mut self,
        event: &str,
    ) -> Result<(), ConnectionError>;

    /// Next delivered event, or `None` once the connection has dropped.
    ///
    /// Must be cancel safe: the manager polls it inside `select!`.
    async fn recv(&mut self) -> Option<RawEvent>;

    /// Closes the session on explicit teardown.
    async fn close(&mut self);
}
