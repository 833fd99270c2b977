//! MVO Telemetry - pipeline observability
//!
//! Two append-only sinks:
//! - [`TelemetryLog`]: bounded, process-lifetime event log fed synchronously
//!   by every pipeline stage; oldest events are evicted past the cap
//! - [`SelectionLog`]: out-of-band record of user picks for offline
//!   comparison of variant strategies
//!
//! Both expose only bulk export and counts; querying belongs to external
//! monitoring collaborators.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod event;
pub mod log;
pub mod selection;

// Re-exports for convenience
pub use event::{StageEvent, TelemetryEvent};
pub use log::{TelemetryLog, DEFAULT_EVENT_CAP};
pub use selection::{GenerationSource, SelectionLog, SelectionRecord};
