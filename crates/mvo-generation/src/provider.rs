//! Generative provider seam
//!
//! The engine consumes outline generation through [`GenerativeProvider`].
//! The provider returns a structured [`RawOutline`]; assembling it into the
//! domain model (and rejecting malformed responses) happens in the blend
//! generator.

use mvo_outline::{GenerationRequest, SectionKind};
use serde::{Deserialize, Serialize};

/// One retrieved passage included in a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPassage {
    /// Origin label of the passage
    pub origin: String,
    /// Passage text
    pub excerpt: String,
}

/// Fully assembled prompt for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSpec {
    /// The request being served
    pub request: GenerationRequest,
    /// Retrieval weight of the slot this prompt serves
    pub rag_weight: f64,
    /// Structural instructions for the outline shape
    pub structural_instructions: String,
    /// Weight-specific persona/style framing
    pub persona: String,
    /// Retrieved context, already scaled to the slot's weight
    pub context: Vec<ContextPassage>,
}

/// Structured outline as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutline {
    /// Suggested title
    pub title: String,
    /// Suggested description
    #[serde(default)]
    pub description: String,
    /// Stated total duration, if the provider gives one
    #[serde(default)]
    pub total_duration_minutes: Option<u32>,
    /// Sections in order
    pub sections: Vec<RawSection>,
}

/// One section of a provider response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSection {
    /// Structural role
    pub kind: SectionKind,
    /// Section title
    pub title: String,
    /// Duration in minutes
    pub duration_minutes: u32,
    /// Section description
    #[serde(default)]
    pub description: String,
    /// Learning objectives
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Echoed seed-topic id when the section incorporates a user topic
    #[serde(default)]
    pub topic_id: Option<String>,
}

/// Generative provider errors
#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    /// Call exceeded its deadline
    #[error("generation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider responded with an error status
    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    /// Response was not a usable structured outline
    #[error("malformed outline response: {0}")]
    Malformed(String),
}

impl GenerativeError {
    /// Whether a single bounded retry may plausibly succeed
    ///
    /// Only 5xx-class and transport failures qualify; timeouts already
    /// consumed their budget and malformed output is deterministic.
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Provider { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Timeout { .. } | Self::Malformed(_) => false,
        }
    }
}

/// External generative language-model provider
#[async_trait::async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generate one structured outline
    async fn generate(&self, prompt: PromptSpec) -> Result<RawOutline, GenerativeError>;
}
