//! MVO Outline - typed session-outline model
//!
//! Foundation types for the multi-variant outline engine:
//! - Ordered outlines and sections with explicit provenance
//! - Contribution-mix accounting (user / generated / retrieved)
//! - Stable request fingerprinting for deterministic sampling
//!
//! # Example
//!
//! ```rust
//! use mvo_outline::{ContributionMix, Outline, Section, SectionKind};
//!
//! let outline = Outline::new("Feedback workshop", "Half-day session")
//!     .with_section(Section::generated(SectionKind::Opener, "Welcome", 10))
//!     .with_section(Section::generated(SectionKind::Topic, "SBI model", 50));
//!
//! let mix = ContributionMix::for_outline(&outline, 0.5);
//! assert_eq!(mix.total(), 100);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod fingerprint;
pub mod mix;
pub mod outline;
pub mod request;
pub mod section;

// Re-exports for convenience
pub use fingerprint::{FingerprintError, RequestFingerprint};
pub use mix::ContributionMix;
pub use outline::Outline;
pub use request::{GenerationRequest, UserTopic};
pub use section::{Provenance, Section, SectionId, SectionKind, TopicRef};
