//! Selection recorder
//!
//! Append-only record of which variant the user eventually picked (or that
//! none were acceptable), keyed by request fingerprint for offline
//! comparison. Duplicate reports for one fingerprint are appended, not
//! deduped.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mvo_outline::RequestFingerprint;
use serde::{Deserialize, Serialize};

/// Which link of the chain produced the chosen variant's outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    /// First-attempt model generation at the slot's weight
    Model,
    /// Weight-0 fallback generation
    FallbackModel,
    /// Template skeleton
    Template,
}

/// One recorded selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecord {
    /// Fingerprint of the originating request
    pub fingerprint: RequestFingerprint,
    /// Chosen variant id; `None` when no variant was acceptable
    pub chosen_variant_id: Option<String>,
    /// Retrieval weight of the chosen variant
    pub rag_weight: Option<f64>,
    /// How the chosen variant's outline was produced
    pub generation_source: Option<GenerationSource>,
    /// Report time (UTC)
    pub timestamp: DateTime<Utc>,
}

impl SelectionRecord {
    /// Record a concrete pick
    #[inline]
    #[must_use]
    pub fn chosen(
        fingerprint: RequestFingerprint,
        variant_id: impl Into<String>,
        rag_weight: f64,
        generation_source: GenerationSource,
    ) -> Self {
        Self {
            fingerprint,
            chosen_variant_id: Some(variant_id.into()),
            rag_weight: Some(rag_weight),
            generation_source: Some(generation_source),
            timestamp: Utc::now(),
        }
    }

    /// Record that no variant was acceptable
    #[inline]
    #[must_use]
    pub fn rejected(fingerprint: RequestFingerprint) -> Self {
        Self {
            fingerprint,
            chosen_variant_id: None,
            rag_weight: None,
            generation_source: None,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only selection log with a per-fingerprint index
#[derive(Debug, Default)]
pub struct SelectionLog {
    inner: DashMap<RequestFingerprint, Vec<SelectionRecord>>,
}

impl SelectionLog {
    /// Create an empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record
    pub fn record(&self, record: SelectionRecord) {
        tracing::debug!(
            fingerprint = %record.fingerprint.short(),
            chosen = ?record.chosen_variant_id,
            "selection recorded"
        );
        self.inner.entry(record.fingerprint).or_default().push(record);
    }

    /// Records for one fingerprint, in append order
    #[inline]
    #[must_use]
    pub fn records_for(&self, fingerprint: &RequestFingerprint) -> Vec<SelectionRecord> {
        self.inner
            .get(fingerprint)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// All records, for bulk export
    #[must_use]
    pub fn export(&self) -> Vec<SelectionRecord> {
        self.inner
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect()
    }

    /// Total number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.iter().map(|entry| entry.value().len()).sum()
    }

    /// Whether the log is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(seed: &str) -> RequestFingerprint {
        RequestFingerprint::compute(seed.as_bytes())
    }

    #[test]
    fn record_and_read_back() {
        let log = SelectionLog::new();
        let fp = fingerprint("req-1");

        log.record(SelectionRecord::chosen(fp, "variant-a", 0.66, GenerationSource::Model));

        let records = log.records_for(&fp);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chosen_variant_id.as_deref(), Some("variant-a"));
    }

    #[test]
    fn duplicate_reports_are_appended() {
        let log = SelectionLog::new();
        let fp = fingerprint("req-1");

        log.record(SelectionRecord::chosen(fp, "variant-a", 1.0, GenerationSource::Model));
        log.record(SelectionRecord::chosen(fp, "variant-b", 0.0, GenerationSource::Template));

        assert_eq!(log.records_for(&fp).len(), 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn rejection_has_no_variant() {
        let log = SelectionLog::new();
        let fp = fingerprint("req-2");

        log.record(SelectionRecord::rejected(fp));

        let records = log.records_for(&fp);
        assert!(records[0].chosen_variant_id.is_none());
        assert!(records[0].generation_source.is_none());
    }

    #[test]
    fn export_collects_all_fingerprints() {
        let log = SelectionLog::new();
        log.record(SelectionRecord::rejected(fingerprint("a")));
        log.record(SelectionRecord::rejected(fingerprint("b")));

        assert_eq!(log.export().len(), 2);
        assert!(!log.is_empty());
    }
}
