use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::BackoffPolicy;
use crate::Result;

/// Push connection parameters
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ConnectionConfig {
    /// Handshake timeout and reconnect schedule. `timeout_ms` bounds every
    /// handshake attempt; retries are unbounded unless `max_retries` is set.
    #[serde(default)]
    pub reconnect: BackoffPolicy,
}

impl ConnectionConfig {
    pub fn validate(&self) -> Result<()> {
        self.reconnect.validate("connection.reconnect")
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.reconnect.timeout_ms)
    }
}
