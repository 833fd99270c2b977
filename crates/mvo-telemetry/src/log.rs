//! Bounded telemetry log
//!
//! Shared append target for all in-flight pipeline stages. Appends are
//! synchronized and infallible; once the cap is reached the oldest events
//! are evicted. A telemetry write can never fail generation.

use crate::event::{StageEvent, TelemetryEvent};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Default event cap
pub const DEFAULT_EVENT_CAP: usize = 10_000;

/// Process-lifetime, bounded, append-only event log
#[derive(Debug)]
pub struct TelemetryLog {
    inner: Mutex<VecDeque<TelemetryEvent>>,
    cap: usize,
}

impl TelemetryLog {
    /// Create a log holding at most `cap` events
    #[inline]
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            cap: cap.max(1),
        }
    }

    /// Append one event, evicting the oldest past the cap
    pub fn record(&self, event: StageEvent) {
        let event = TelemetryEvent::now(event);
        tracing::trace!(stage = event.stage(), "telemetry event");

        let mut guard = self.inner.lock();
        if guard.len() == self.cap {
            guard.pop_front();
        }
        guard.push_back(event);
    }

    /// Read-only snapshot of the current contents, oldest first
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Vec<TelemetryEvent> {
        self.inner.lock().iter().cloned().collect()
    }

    /// Number of retained events
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the log is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Configured cap
    #[inline]
    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAP)
    }
}
