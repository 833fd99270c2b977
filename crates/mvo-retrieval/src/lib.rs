//! MVO Retrieval - knowledge retrieval client
//!
//! Wraps the external semantic-search provider behind a client that owns
//! timeout, bounded retry, and similarity filtering. Degrades instead of
//! failing: the orchestrator always gets an outcome, possibly with
//! `available = false` and no sources.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod provider;
pub mod source;

// Re-exports for convenience
pub use client::{RetrievalClient, RetrievalConfig, RetrievalOutcome};
pub use provider::{RetrievalProvider, RetrievalProviderError, RetrievalQuery};
pub use source::KnowledgeSource;
