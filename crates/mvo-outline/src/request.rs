//! Generation request: the immutable input of one user action

use crate::fingerprint::RequestFingerprint;
use serde::{Deserialize, Serialize};

/// Pre-existing user-authored topic referenced by a request
///
/// Seeds the "user" contribution bucket: sections built from one of these
/// carry user provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTopic {
    /// Stable topic identifier in the caller's store
    pub topic_id: String,
    /// Topic title
    pub title: String,
    /// Topic description
    pub description: String,
    /// Expected duration in minutes
    pub duration_minutes: u32,
}

/// Immutable description of the desired training session
///
/// Created once per user action, never mutated. The fingerprint is a hash of
/// the semantically meaningful fields and drives deterministic rollout
/// sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Session category
    pub category: String,
    /// Session type (workshop, seminar, onboarding, ...)
    pub session_kind: String,
    /// Desired outcome in the requester's words
    pub desired_outcome: String,
    /// Expected audience size, if known
    pub audience_size: Option<u32>,
    /// Target duration in minutes
    pub duration_minutes: u32,
    /// Pre-existing user topics to incorporate
    pub seed_topics: Vec<UserTopic>,
    /// Stable fingerprint over the semantic fields
    pub fingerprint: RequestFingerprint,
}

/// The fields that participate in the fingerprint
#[derive(Serialize)]
struct SemanticFields<'a> {
    category: &'a str,
    session_kind: &'a str,
    desired_outcome: &'a str,
    audience_size: Option<u32>,
    duration_minutes: u32,
    seed_topic_ids: Vec<&'a str>,
}

impl GenerationRequest {
    /// Create a request, deriving its fingerprint from the semantic fields
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        session_kind: impl Into<String>,
        desired_outcome: impl Into<String>,
        duration_minutes: u32,
    ) -> Self {
        let mut request = Self {
            category: category.into(),
            session_kind: session_kind.into(),
            desired_outcome: desired_outcome.into(),
            audience_size: None,
            duration_minutes,
            seed_topics: Vec::new(),
            fingerprint: RequestFingerprint::compute(&[]),
        };
        request.fingerprint = request.compute_fingerprint();
        request
    }

    /// With an audience size hint
    #[inline]
    #[must_use]
    pub fn with_audience_size(mut self, size: u32) -> Self {
        self.audience_size = Some(size);
        self.fingerprint = self.compute_fingerprint();
        self
    }

    /// With seed topics
    #[inline]
    #[must_use]
    pub fn with_seed_topics(mut self, topics: Vec<UserTopic>) -> Self {
        self.seed_topics = topics;
        self.fingerprint = self.compute_fingerprint();
        self
    }

    fn compute_fingerprint(&self) -> RequestFingerprint {
        let fields = SemanticFields {
            category: &self.category,
            session_kind: &self.session_kind,
            desired_outcome: &self.desired_outcome,
            audience_size: self.audience_size,
            duration_minutes: self.duration_minutes,
            seed_topic_ids: self.seed_topics.iter().map(|t| t.topic_id.as_str()).collect(),
        };
        // JSON over a fixed field order is stable; infallible for these types.
        RequestFingerprint::compute_serializable(&fields)
            .unwrap_or_else(|_| RequestFingerprint::compute(self.desired_outcome.as_bytes()))
    }
}
