//! MVO Remote - HTTP provider backends
//!
//! Switchable JSON-over-HTTP implementations of the engine's two provider
//! seams: a semantic-search endpoint for retrieval and an outline-generation
//! endpoint for the generative model. The engine consumes them only through
//! the `RetrievalProvider` and `GenerativeProvider` traits.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod generation;
pub mod retrieval;

// Re-exports for convenience
pub use config::{RemoteConfig, RemoteError};
pub use generation::{temperature_for_weight, HttpGenerativeProvider};
pub use retrieval::HttpRetrievalProvider;
