//! Contribution-mix accounting
//!
//! Attributes an outline's content to three origins (user-authored,
//! generatively produced, retrieved) as integer percentages that sum to
//! exactly 100.
//!
//! # Invariant
//! `user_percent + ai_percent + rag_percent == 100` for every computed mix,
//! including outlines with zero sections or zero total duration.

use crate::outline::Outline;
use serde::{Deserialize, Serialize};

/// Three-way percentage attribution of an outline's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionMix {
    /// Share seeded from pre-existing user-authored topics
    pub user_percent: u8,
    /// Share produced by free generation
    pub ai_percent: u8,
    /// Share grounded in retrieved knowledge-base content
    pub rag_percent: u8,
}

impl ContributionMix {
    /// Mix for a fully generated outline with no retrieval influence
    pub const ALL_GENERATED: Self = Self {
        user_percent: 0,
        ai_percent: 100,
        rag_percent: 0,
    };

    /// Sum of the three buckets; 100 by construction
    #[inline]
    #[must_use]
    pub fn total(&self) -> u16 {
        u16::from(self.user_percent) + u16::from(self.ai_percent) + u16::from(self.rag_percent)
    }

    /// Compute the mix for an outline at a given retrieval weight
    ///
    /// Partitions the outline by section provenance, then splits the
    /// non-user remainder between retrieved and generated proportionally to
    /// `rag_weight`. Rounded percentages are reconciled so the invariant
    /// holds despite rounding.
    ///
    /// Degenerate outlines (no sections, or no known duration) are treated
    /// as a single implicit generated section, so the split reduces to
    /// `rag_weight` against the full remainder.
    #[must_use]
    pub fn for_outline(outline: &Outline, rag_weight: f64) -> Self {
        let rag_weight = rag_weight.clamp(0.0, 1.0);
        let total = outline.total_duration();

        let user_share = if total == 0 {
            // Implicit single generated section of weight 1.
            0.0
        } else {
            (f64::from(outline.user_duration()) / f64::from(total)).clamp(0.0, 1.0)
        };

        let rag_share = (1.0 - user_share) * rag_weight;
        let ai_share = (1.0 - user_share) - rag_share;

        reconcile(user_share, ai_share, rag_share)
    }
}

/// Bucket identity, in remainder-correction priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Ai,
    Rag,
    User,
}

/// Round shares to integer percentages and force the sum to exactly 100
///
/// The rounding difference is applied to the largest bucket; ties resolve by
/// the fixed priority generated > retrieved > user.
fn reconcile(user_share: f64, ai_share: f64, rag_share: f64) -> ContributionMix {
    let mut buckets = [
        (Bucket::Ai, round_percent(ai_share)),
        (Bucket::Rag, round_percent(rag_share)),
        (Bucket::User, round_percent(user_share)),
    ];

    let sum: i32 = buckets.iter().map(|(_, v)| *v).sum();
    let diff = 100 - sum;

    if diff != 0 {
        // First entry wins ties because the array is in priority order.
        let largest = buckets
            .iter()
            .enumerate()
            .max_by_key(|&(idx, &(_, v))| (v, std::cmp::Reverse(idx)))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        buckets[largest].1 += diff;
    }

    let value_of = |bucket: Bucket| -> u8 {
        buckets
            .iter()
            .find(|(b, _)| *b == bucket)
            .map(|(_, v)| (*v).clamp(0, 100) as u8)
            .unwrap_or(0)
    };

    ContributionMix {
        user_percent: value_of(Bucket::User),
        ai_percent: value_of(Bucket::Ai),
        rag_percent: value_of(Bucket::Rag),
    }
}

#[inline]
fn round_percent(share: f64) -> i32 {
    (share * 100.0).round() as i32
}
