use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Reconciliation engine parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Capacity of the ordered event queue feeding the engine
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,

    /// Largest page size a view may be registered with
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: default_event_queue_capacity(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.event_queue_capacity == 0 {
            return Err(Error::InvalidConfig(
                "engine.event_queue_capacity must be greater than 0".into(),
            ));
        }
        if self.max_page_size == 0 {
            return Err(Error::InvalidConfig("engine.max_page_size must be greater than 0".into()));
        }
        Ok(())
    }
}

fn default_event_queue_capacity() -> usize {
    1024
}
fn default_max_page_size() -> u32 {
    500
}
