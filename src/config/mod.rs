//! Configuration management for the view synchronization engine.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
mod connection;
mod engine;
mod resource;
mod retry;
pub use connection::*;
pub use engine::*;
pub use resource::*;
pub use retry::*;

use std::collections::HashSet;
use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Environment variable prefix, e.g. `VIEWSYNC__ENGINE__MAX_PAGE_SIZE`
pub const ENV_PREFIX: &str = "VIEWSYNC";

/// Main configuration container
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SyncConfig {
    /// Push connection and reconnect parameters
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Reconciliation engine parameters
    #[serde(default)]
    pub engine: EngineConfig,
    /// Resources declared in addition to the built-in ones
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl SyncConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `VIEWSYNC__` prefix (highest priority)
    ///
    /// # Note
    /// This method does NOT validate the configuration. Callers MUST call `validate()`
    /// after all overrides are applied.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.connection.validate()?;
        self.engine.validate()?;

        let mut names = HashSet::new();
        for resource in &self.resources {
            resource.validate()?;
            if !names.insert(resource.name.trim()) {
                return Err(Error::InvalidConfig(format!(
                    "resource {} declared more than once",
                    resource.name
                )));
            }
        }
        Ok(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
