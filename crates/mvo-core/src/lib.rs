//! MVO Core - Multi-Variant Outline Engine
//!
//! The central pipeline that:
//! - Gates requests between the multi-variant pipeline and the legacy path
//! - Resolves knowledge retrieval once per batch
//! - Fans out blend generation across the configured weights
//! - Applies the per-slot fallback chain and assembles exactly N variants
//! - Attributes every variant's content (user / generated / retrieved)
//!
//! # Example
//!
//! ```rust,ignore
//! use mvo_core::{ConfigHandle, EngineConfig, GenerationOutcome, VariantEngine};
//! use mvo_outline::GenerationRequest;
//!
//! # async fn example(
//! #     retrieval: std::sync::Arc<dyn mvo_retrieval::RetrievalProvider>,
//! #     generative: std::sync::Arc<dyn mvo_generation::GenerativeProvider>,
//! # ) -> Result<(), mvo_core::EngineError> {
//! let config = ConfigHandle::new(EngineConfig::default());
//! let engine = VariantEngine::new(config, retrieval, generative);
//!
//! let request = GenerationRequest::new("leadership", "workshop", "better feedback", 180);
//! match engine.generate_variants(&request).await? {
//!     GenerationOutcome::MultiVariant(batch) => println!("{} variants", batch.variants.len()),
//!     GenerationOutcome::LegacyRoute(decision) => println!("legacy: {:?}", decision.reason),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod types;

// Re-exports for convenience
pub use config::{BatchConfig, ConfigHandle, EngineConfig};
pub use engine::VariantEngine;
pub use error::{EngineError, FailedStage};
pub use orchestrator::VariantOrchestrator;
pub use types::{GenerationMetadata, GenerationOutcome, Variant, VariantBatch, VariantId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the variant engine
    pub use crate::{
        ConfigHandle, EngineConfig, EngineError, GenerationOutcome, Variant, VariantBatch,
        VariantEngine,
    };
    pub use mvo_outline::{ContributionMix, GenerationRequest, Outline, Section};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
