use serde::Deserialize;
use serde::Serialize;

use crate::ConnectionError;

/// Credentials forwarded to the transport handshake. The role is opaque to
/// this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: None,
        }
    }

    pub fn with_role(
        mut self,
        role: impl Into<String>,
    ) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConnectionError> {
        if self.user_id.trim().is_empty() {
            return Err(ConnectionError::InvalidIdentity("user id is empty".to_string()));
        }
        Ok(())
    }
}
