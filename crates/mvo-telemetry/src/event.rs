//! Telemetry events
//!
//! One structured event per pipeline stage. Events are observational only:
//! a process-lifetime record for monitoring export, not a system of record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stage-specific event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageEvent {
    /// Rollout gate evaluated
    RolloutDecided {
        /// Whether the multi-variant pipeline was chosen
        enabled: bool,
        /// Stable sample percentile
        sample_percentile: u8,
    },
    /// Retrieval round finished (successfully or degraded)
    RetrievalCompleted {
        /// Whether retrieved context is usable
        available: bool,
        /// Sources kept above the threshold
        source_count: usize,
        /// Wall time in milliseconds
        elapsed_ms: u64,
    },
    /// One variant slot settled
    VariantCompleted {
        /// Slot index in canonical weight order
        slot: usize,
        /// Retrieval weight the slot ended at
        rag_weight: f64,
        /// Whether the fallback chain was taken
        fallback_used: bool,
        /// Whether the slot ended on the template skeleton
        template_used: bool,
        /// Wall time in milliseconds
        elapsed_ms: u64,
    },
    /// Whole batch assembled
    BatchCompleted {
        /// Variants returned
        variant_count: usize,
        /// Slots that needed any fallback
        fallback_count: usize,
        /// Wall time in milliseconds
        elapsed_ms: u64,
    },
    /// Whole batch failed
    BatchFailed {
        /// Stage that exhausted its options ("retrieval" or "generation")
        failed_stage: String,
        /// Wall time in milliseconds
        elapsed_ms: u64,
    },
    /// Caller reported a selection
    SelectionRecorded {
        /// Short fingerprint of the originating request
        fingerprint: String,
        /// Chosen variant id
        variant_id: String,
    },
}

impl StageEvent {
    /// Stage name for dashboards and filtering
    #[inline]
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::RolloutDecided { .. } => "rollout_decided",
            Self::RetrievalCompleted { .. } => "retrieval_completed",
            Self::VariantCompleted { .. } => "variant_completed",
            Self::BatchCompleted { .. } => "batch_completed",
            Self::BatchFailed { .. } => "batch_failed",
            Self::SelectionRecorded { .. } => "selection_recorded",
        }
    }
}

/// A timestamped telemetry event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Append time (UTC)
    pub timestamp: DateTime<Utc>,
    /// Stage payload
    #[serde(flatten)]
    pub event: StageEvent,
}

impl TelemetryEvent {
    /// Stamp an event with the current time
    #[inline]
    #[must_use]
    pub fn now(event: StageEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// Stage name of the wrapped payload
    #[inline]
    #[must_use]
    pub fn stage(&self) -> &'static str {
        self.event.stage()
    }
}
