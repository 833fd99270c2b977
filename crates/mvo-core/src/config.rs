//! Engine configuration
//!
//! Aggregates the per-component configs and exposes them through a
//! hot-reloadable handle: the engine reads the current configuration at the
//! start of every request, so a changed rollout percentage, threshold, or
//! timeout applies to the next request without a restart.

use crate::error::EngineError;
use mvo_generation::GenerationConfig;
use mvo_retrieval::RetrievalConfig;
use mvo_rollout::RolloutConfig;
use mvo_telemetry::DEFAULT_EVENT_CAP;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Batch fan-out configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Target retrieval weights, one slot each, in canonical output order
    pub weights: Vec<f64>,
    /// Overall batch deadline in milliseconds
    pub batch_timeout_ms: u64,
}

impl BatchConfig {
    /// Batch deadline as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }

    /// Number of slots
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.weights.len()
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            weights: vec![1.0, 0.66, 0.33, 0.0],
            batch_timeout_ms: 25_000,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rollout gate settings
    pub rollout: RolloutConfig,
    /// Retrieval client settings
    pub retrieval: RetrievalConfig,
    /// Generation call settings
    pub generation: GenerationConfig,
    /// Fan-out settings
    pub batch: BatchConfig,
    /// Telemetry log cap
    pub telemetry_event_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rollout: RolloutConfig::default(),
            retrieval: RetrievalConfig::default(),
            generation: GenerationConfig::default(),
            batch: BatchConfig::default(),
            telemetry_event_cap: DEFAULT_EVENT_CAP,
        }
    }
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With rollout settings
    #[inline]
    #[must_use]
    pub fn with_rollout(mut self, rollout: RolloutConfig) -> Self {
        self.rollout = rollout;
        self
    }

    /// With batch weights
    #[inline]
    #[must_use]
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.batch.weights = weights;
        self
    }

    /// Parse configuration from a TOML document
    ///
    /// Missing sections and fields fall back to defaults.
    ///
    /// # Errors
    /// Returns `EngineError::Config` on syntax errors or structural
    /// validation failures.
    pub fn from_toml_str(input: &str) -> Result<Self, EngineError> {
        let config: Self =
            toml::from_str(input).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// Intended for reload tooling: read the file again and
    /// [`ConfigHandle::replace`] the running configuration.
    ///
    /// # Errors
    /// Returns `EngineError::Config` when the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        let input = std::fs::read_to_string(path.as_ref())
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&input)
    }

    /// Structural validation
    ///
    /// Rollout percentage anomalies are deliberately not rejected here; the
    /// gate degrades those to "disabled" per request.
    ///
    /// # Errors
    /// Returns `EngineError::Config` when the slot weights are unusable.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.batch.weights.is_empty() {
            return Err(EngineError::Config("batch.weights must not be empty".to_string()));
        }
        if let Some(weight) = self
            .batch
            .weights
            .iter()
            .find(|w| !w.is_finite() || **w < 0.0 || **w > 1.0)
        {
            return Err(EngineError::Config(format!(
                "batch weight {weight} outside [0, 1]"
            )));
        }
        if self.batch.batch_timeout_ms == 0 {
            return Err(EngineError::Config("batch.batch_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Shared, hot-reloadable configuration handle
///
/// Cheap to clone; readers take a snapshot per request, writers swap the
/// whole configuration. No restart is needed for changes to take effect.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<EngineConfig>>,
}

impl ConfigHandle {
    /// Create a handle over an initial configuration
    #[inline]
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Snapshot of the current configuration
    #[inline]
    #[must_use]
    pub fn current(&self) -> EngineConfig {
        self.inner.read().clone()
    }

    /// Replace the configuration wholesale
    #[inline]
    pub fn replace(&self, config: EngineConfig) {
        *self.inner.write() = config;
    }

    /// Mutate the configuration in place
    #[inline]
    pub fn update(&self, f: impl FnOnce(&mut EngineConfig)) {
        f(&mut self.inner.write());
    }
}
