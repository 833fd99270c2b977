//! Error types for the variant engine
//!
//! Most of the pipeline's failure modes are recovered locally and never
//! reach this taxonomy: degraded retrieval becomes an unavailable outcome,
//! per-slot generation failures take the fallback chain. Only whole-batch
//! failure and configuration parse errors surface to the caller.

use serde::{Deserialize, Serialize};

/// Pipeline stage whose options were exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    /// Retrieval degraded and the batch still failed
    Retrieval,
    /// Generative provider exhausted every slot's fallback chain
    Generation,
}

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Every slot exhausted its fallback chain
    ///
    /// The caller is expected to fall back to the legacy single-outline path
    /// or show an actionable error.
    #[error(
        "batch generation failed: no slot produced a model-generated outline \
         ({slots} slots, retrieval available: {retrieval_available})"
    )]
    BatchGenerationFailed {
        /// Number of slots attempted
        slots: usize,
        /// Whether retrieved context was usable for the batch
        retrieval_available: bool,
    },

    /// Configuration could not be parsed or is structurally unusable
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Stage the caller should report for a batch failure
    #[inline]
    #[must_use]
    pub fn failed_stage(&self) -> Option<FailedStage> {
        match self {
            Self::BatchGenerationFailed {
                retrieval_available: false,
                ..
            } => Some(FailedStage::Retrieval),
            Self::BatchGenerationFailed { .. } => Some(FailedStage::Generation),
            Self::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_failure_display_names_both_signals() {
        let err = EngineError::BatchGenerationFailed {
            slots: 4,
            retrieval_available: false,
        };
        let msg = err.to_string();
        assert!(msg.contains("4 slots"));
        assert!(msg.contains("retrieval available: false"));
    }

    #[test]
    fn failed_stage_reflects_retrieval_state() {
        let with_retrieval = EngineError::BatchGenerationFailed {
            slots: 4,
            retrieval_available: true,
        };
        assert_eq!(with_retrieval.failed_stage(), Some(FailedStage::Generation));

        let without_retrieval = EngineError::BatchGenerationFailed {
            slots: 4,
            retrieval_available: false,
        };
        assert_eq!(without_retrieval.failed_stage(), Some(FailedStage::Retrieval));

        assert_eq!(EngineError::Config("bad".to_string()).failed_stage(), None);
    }
}
