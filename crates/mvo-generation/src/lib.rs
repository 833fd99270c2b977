//! MVO Generation - blend generator
//!
//! Produces candidate outlines for the variant orchestrator:
//! - Provider seam for the generative language model
//! - Prompt assembly with weight-scaled retrieved context
//! - Per-call timeout and a single bounded retry on transient failures
//! - Template skeleton as the last fallback link
//!
//! Retries across fallback weights belong to the orchestrator; this crate
//! only signals [`VariantGenerationFailed`] per attempt.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod blend;
pub mod prompt;
pub mod provider;
pub mod template;

// Re-exports for convenience
pub use blend::{BlendGenerator, BlendOutcome, GenerationConfig, VariantGenerationFailed};
pub use prompt::{build_prompt, scale_context, weight_band, WeightBand};
pub use provider::{
    ContextPassage, GenerativeError, GenerativeProvider, PromptSpec, RawOutline, RawSection,
};
pub use template::template_outline;
