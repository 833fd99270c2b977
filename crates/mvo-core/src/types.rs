//! Core types for the variant engine
//!
//! Defines the batch-level types:
//! - Variant identifiers
//! - Candidate variants and assembled batches
//! - Batch metadata and the engine's outcome enum

use mvo_outline::{ContributionMix, Outline};
use mvo_retrieval::KnowledgeSource;
use mvo_rollout::RolloutDecision;
use mvo_telemetry::GenerationSource;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique variant identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariantId(pub Ulid);

impl VariantId {
    /// Generate new variant ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for VariantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One candidate outline in a generated batch
///
/// Batches always carry exactly N variants in canonical weight order. A slot
/// whose generation failed is filled through the fallback chain rather than
/// omitted, with `rag_weight` forced to 0 and `fallback_used` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant ID
    pub id: VariantId,
    /// Style label of the slot ("Knowledge-driven", "Fresh take", ...)
    pub label: String,
    /// One-line description of the slot's style
    pub description: String,
    /// Retrieval weight the outline was actually produced at
    pub rag_weight: f64,
    /// Sources that entered the prompt context
    pub sources_used: Vec<KnowledgeSource>,
    /// The candidate outline
    pub outline: Outline,
    /// Provenance attribution of the outline's content
    pub mix: ContributionMix,
    /// Whether the fallback chain was taken for this slot
    pub fallback_used: bool,
    /// Which chain link produced the outline
    pub generation_source: GenerationSource,
}

impl Variant {
    /// Number of retrieved sources that influenced this variant
    #[inline]
    #[must_use]
    pub fn rag_sources_used(&self) -> usize {
        self.sources_used.len()
    }
}

/// Timings and counters for one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// The rollout decision that admitted this request
    pub decision: RolloutDecision,
    /// Wall time of the retrieval round, in milliseconds
    pub retrieval_elapsed_ms: u64,
    /// Wall time of the whole batch, in milliseconds
    pub batch_elapsed_ms: u64,
    /// Slots that needed any fallback
    pub fallback_count: usize,
}

/// A completed batch of candidate variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantBatch {
    /// Exactly N variants in canonical weight order
    pub variants: Vec<Variant>,
    /// Whether retrieved context was usable for this batch
    pub rag_available: bool,
    /// Batch metadata
    pub metadata: GenerationMetadata,
}

impl VariantBatch {
    /// Slots that ended on any fallback
    #[inline]
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.variants.iter().filter(|v| v.fallback_used).count()
    }
}

/// Result of one engine invocation
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The multi-variant pipeline handled the request
    MultiVariant(VariantBatch),
    /// The rollout gate routed the request to the legacy single-outline path
    LegacyRoute(RolloutDecision),
}

impl GenerationOutcome {
    /// The batch, when the multi-variant pipeline ran
    #[inline]
    #[must_use]
    pub fn batch(&self) -> Option<&VariantBatch> {
        match self {
            Self::MultiVariant(batch) => Some(batch),
            Self::LegacyRoute(_) => None,
        }
    }

    /// Whether the request was routed to the legacy path
    #[inline]
    #[must_use]
    pub fn is_legacy_route(&self) -> bool {
        matches!(self, Self::LegacyRoute(_))
    }
}
