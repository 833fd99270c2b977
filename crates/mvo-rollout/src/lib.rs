//! MVO Rollout - deterministic feature-flag gate
//!
//! Decides, per request, whether the multi-variant pipeline or the legacy
//! single-outline path handles generation. Stateless and side-effect free:
//! the decision is a pure function of the request fingerprint and the
//! current rollout configuration.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod gate;

// Re-exports for convenience
pub use gate::{decide, sample_percentile, RolloutConfig, RolloutDecision, RolloutReason};
