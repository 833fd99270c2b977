//! Retrieval provider seam
//!
//! The engine consumes semantic search through [`RetrievalProvider`]; the
//! concrete transport lives elsewhere (HTTP backend, test double).

use crate::source::KnowledgeSource;

/// Query semantics for one retrieval call
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetrievalQuery {
    /// Session category
    pub category: String,
    /// Topic hints extracted from the request
    pub topics: Vec<String>,
    /// Desired session outcome
    pub outcome: String,
    /// Maximum number of sources to keep (0 = provider default)
    pub limit: usize,
}

impl RetrievalQuery {
    /// Create a query for a category and desired outcome
    #[inline]
    #[must_use]
    pub fn new(category: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            topics: Vec::new(),
            outcome: outcome.into(),
            limit: 0,
        }
    }

    /// With topic hints
    #[inline]
    #[must_use]
    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    /// With a result limit
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Retrieval provider errors
#[derive(Debug, thiserror::Error)]
pub enum RetrievalProviderError {
    /// Call exceeded its deadline
    #[error("retrieval timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider responded with an error status
    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    /// Provider response could not be decoded
    #[error("malformed provider response: {0}")]
    Decode(String),
}

impl RetrievalProviderError {
    /// Whether a retry may plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::Provider { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Decode(_) => false,
        }
    }
}

/// External semantic-search provider
///
/// One call per batch: the orchestrator resolves retrieval once and shares
/// the result read-only across all variant tasks.
#[async_trait::async_trait]
pub trait RetrievalProvider: Send + Sync {
    /// Search the knowledge base
    async fn search(
        &self,
        query: RetrievalQuery,
    ) -> Result<Vec<KnowledgeSource>, RetrievalProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(RetrievalProviderError::Timeout { timeout_ms: 10_000 }.is_transient());
        assert!(RetrievalProviderError::Transport("connection reset".to_string()).is_transient());
        assert!(RetrievalProviderError::Provider {
            status: 503,
            message: "overloaded".to_string()
        }
        .is_transient());
        assert!(RetrievalProviderError::Provider {
            status: 429,
            message: "rate limited".to_string()
        }
        .is_transient());
        assert!(!RetrievalProviderError::Provider {
            status: 400,
            message: "bad query".to_string()
        }
        .is_transient());
        assert!(!RetrievalProviderError::Decode("truncated body".to_string()).is_transient());
    }

    #[test]
    fn query_builder() {
        let query = RetrievalQuery::new("leadership", "give actionable feedback")
            .with_topics(vec!["feedback".to_string(), "sbi".to_string()])
            .with_limit(5);

        assert_eq!(query.topics.len(), 2);
        assert_eq!(query.limit, 5);
    }
}
