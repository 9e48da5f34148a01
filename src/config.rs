//! # Engine Configuration
//!
//! Serde-backed configuration for the task execution engine with validation
//! and optional YAML file loading. Millisecond fields keep the on-disk format
//! plain; `Duration` accessors keep call sites typed.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BACKOFF_BASE_DELAY, DEFAULT_BACKOFF_MAX_DELAY, DEFAULT_BACKOFF_MULTIPLIER,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_RETRIES,
};
use crate::execution::errors::{EngineError, EngineResult};

/// Top-level configuration for [`crate::execution::engine::ExecutionEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of concurrently in-flight task attempts.
    pub max_concurrency: usize,
    /// Retries granted to tasks that don't specify their own limit.
    pub default_max_retries: u32,
    /// Backoff shape applied between retry attempts.
    pub backoff: BackoffConfig,
}

/// Exponential backoff configuration for retry delays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Cap on any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier applied per additional failed attempt.
    pub multiplier: f64,
    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            default_max_retries: DEFAULT_MAX_RETRIES,
            backoff: BackoffConfig::default(),
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: DEFAULT_BACKOFF_BASE_DELAY.as_millis() as u64,
            max_delay_ms: DEFAULT_BACKOFF_MAX_DELAY.as_millis() as u64,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: false,
        }
    }
}

impl BackoffConfig {
    /// Delay before the first retry.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Cap on any single delay.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl EngineConfig {
    /// Validate configuration, returning the first violation found.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_concurrency < 1 {
            return Err(EngineError::Configuration(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.backoff.base_delay_ms == 0 {
            return Err(EngineError::Configuration(
                "backoff.base_delay_ms must be positive".to_string(),
            ));
        }
        if self.backoff.multiplier < 1.0 {
            return Err(EngineError::Configuration(format!(
                "backoff.multiplier must be at least 1.0, got {}",
                self.backoff.multiplier
            )));
        }
        Ok(())
    }

    /// Load and validate configuration from a YAML file.
    ///
    /// Missing fields fall back to their defaults, so a partial document is
    /// a valid override file.
    pub fn load_from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Configuration(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let config: EngineConfig = serde_yaml::from_str(&contents).map_err(|e| {
            EngineError::Configuration(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }
}
