//! Rollout decision gate
//!
//! Pure, stateless routing between the multi-variant pipeline and the legacy
//! single-outline path. The per-request sample is an explicit function of the
//! request fingerprint bytes, so the same logical request always lands on the
//! same side of the flag within a deploy.

use mvo_outline::RequestFingerprint;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Rollout configuration
///
/// Hot-reloadable: the gate reads it per request, so changing the percentage
/// takes effect on the next decision without a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloutConfig {
    /// Master enable flag
    pub enabled: bool,
    /// Rollout percentage in [0, 100]
    pub percentage: u8,
    /// Force the pipeline on for every request (still gated by `enabled`)
    pub force_on: bool,
}

impl RolloutConfig {
    /// Create a disabled configuration
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            percentage: 0,
            force_on: false,
        }
    }

    /// Create an enabled configuration at the given percentage
    #[inline]
    #[must_use]
    pub fn at_percentage(percentage: u8) -> Self {
        Self {
            enabled: true,
            percentage,
            force_on: false,
        }
    }

    /// With the force-on override set
    #[inline]
    #[must_use]
    pub fn with_force_on(mut self) -> Self {
        self.force_on = true;
        self
    }

    /// Whether the percentage is in range
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.percentage <= 100
    }
}

impl Default for RolloutConfig {
    /// Missing configuration means disabled
    fn default() -> Self {
        Self::disabled()
    }
}

/// Why the gate decided the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutReason {
    /// Master flag off or configuration invalid
    Disabled,
    /// Sample percentile below the rollout percentage
    BelowThreshold,
    /// Sample percentile at or above the rollout percentage
    AboveThreshold,
    /// Force-on override active
    ForcedOn,
}

/// Outcome of a gate evaluation
///
/// Derived per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutDecision {
    /// Whether the multi-variant pipeline handles this request
    pub enabled: bool,
    /// Stable sample percentile in [0, 100)
    pub sample_percentile: u8,
    /// Reason for the decision
    pub reason: RolloutReason,
}

/// Reduce a fingerprint to a stable percentile in [0, 100)
///
/// SHA-256 over the fingerprint bytes, first eight digest bytes interpreted
/// big-endian, reduced mod 100. Deliberately independent of any hash-map or
/// object-identity hashing, which is not stable across runs.
#[must_use]
pub fn sample_percentile(fingerprint: &RequestFingerprint) -> u8 {
    let digest = Sha256::digest(fingerprint.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % 100) as u8
}

/// Evaluate the gate for one request
///
/// Pure function: no side effects, always returns a decision. Any
/// configuration anomaly (out-of-range percentage) degrades to disabled.
#[must_use]
pub fn decide(config: &RolloutConfig, fingerprint: &RequestFingerprint) -> RolloutDecision {
    let sample = sample_percentile(fingerprint);

    let decision = if !config.enabled || !config.is_valid() {
        RolloutDecision {
            enabled: false,
            sample_percentile: sample,
            reason: RolloutReason::Disabled,
        }
    } else if config.force_on {
        RolloutDecision {
            enabled: true,
            sample_percentile: sample,
            reason: RolloutReason::ForcedOn,
        }
    } else if sample < config.percentage {
        RolloutDecision {
            enabled: true,
            sample_percentile: sample,
            reason: RolloutReason::BelowThreshold,
        }
    } else {
        RolloutDecision {
            enabled: false,
            sample_percentile: sample,
            reason: RolloutReason::AboveThreshold,
        }
    };

    tracing::debug!(
        fingerprint = %fingerprint.short(),
        percentile = decision.sample_percentile,
        enabled = decision.enabled,
        reason = ?decision.reason,
        "rollout decision"
    );

    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(seed: &str) -> RequestFingerprint {
        RequestFingerprint::compute(seed.as_bytes())
    }

    #[test]
    fn decision_is_deterministic() {
        let config = RolloutConfig::at_percentage(50);
        let fp = fingerprint("session-request-1");

        let first = decide(&config, &fp);
        for _ in 0..20 {
            assert_eq!(decide(&config, &fp), first);
        }
    }

    #[test]
    fn percentage_zero_disables_every_fingerprint() {
        let config = RolloutConfig::at_percentage(0);

        for i in 0..200 {
            let decision = decide(&config, &fingerprint(&format!("req-{i}")));
            assert!(!decision.enabled);
            assert_eq!(decision.reason, RolloutReason::AboveThreshold);
        }
    }

    #[test]
    fn percentage_hundred_enables_every_fingerprint() {
        let config = RolloutConfig::at_percentage(100);

        for i in 0..200 {
            let decision = decide(&config, &fingerprint(&format!("req-{i}")));
            assert!(decision.enabled);
            assert_eq!(decision.reason, RolloutReason::BelowThreshold);
        }
    }

    #[test]
    fn master_flag_off_wins() {
        let config = RolloutConfig {
            enabled: false,
            percentage: 100,
            force_on: true,
        };

        let decision = decide(&config, &fingerprint("anything"));
        assert!(!decision.enabled);
        assert_eq!(decision.reason, RolloutReason::Disabled);
    }

    #[test]
    fn invalid_percentage_degrades_to_disabled() {
        let config = RolloutConfig {
            enabled: true,
            percentage: 101,
            force_on: false,
        };

        let decision = decide(&config, &fingerprint("anything"));
        assert!(!decision.enabled);
        assert_eq!(decision.reason, RolloutReason::Disabled);
    }

    #[test]
    fn force_on_overrides_threshold() {
        let config = RolloutConfig::at_percentage(0).with_force_on();

        let decision = decide(&config, &fingerprint("forced"));
        assert!(decision.enabled);
        assert_eq!(decision.reason, RolloutReason::ForcedOn);
    }

    #[test]
    fn default_config_is_disabled() {
        let decision = decide(&RolloutConfig::default(), &fingerprint("missing config"));
        assert!(!decision.enabled);
        assert_eq!(decision.reason, RolloutReason::Disabled);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn percentile_always_below_100(seed in any::<Vec<u8>>()) {
                let fp = RequestFingerprint::compute(&seed);
                prop_assert!(sample_percentile(&fp) < 100);
            }

            #[test]
            fn percentile_is_stable(seed in any::<Vec<u8>>()) {
                let fp = RequestFingerprint::compute(&seed);
                prop_assert_eq!(sample_percentile(&fp), sample_percentile(&fp));
            }

            #[test]
            fn enabled_matches_threshold(seed in any::<Vec<u8>>(), percentage in 0u8..=100) {
                let fp = RequestFingerprint::compute(&seed);
                let decision = decide(&RolloutConfig::at_percentage(percentage), &fp);
                prop_assert_eq!(decision.enabled, decision.sample_percentile < percentage);
            }
        }
    }
}
