//! Retrieval client: timeout, bounded retry, similarity filtering
//!
//! Retrieval is an optimization, never a dependency that can sink a request.
//! Every failure mode of the provider (outage, timeout, error status, empty
//! result set) degrades to an unavailable outcome; nothing propagates as an
//! error to the orchestrator.

use crate::provider::{RetrievalProvider, RetrievalQuery};
use crate::source::KnowledgeSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Retrieval client configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Minimum similarity for a source to be kept
    pub similarity_threshold: f64,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after a transient failure
    pub max_retries: u32,
}

impl RetrievalConfig {
    /// With similarity threshold
    #[inline]
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// With per-call timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Per-call timeout as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.65,
            timeout_ms: 10_000,
            max_retries: 1,
        }
    }
}

/// Result of one retrieval round
///
/// `available` is false whenever the variants should proceed baseline-only:
/// provider failure, timeout, or nothing above the similarity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    /// Sources above the threshold, ordered by descending similarity
    pub sources: Vec<KnowledgeSource>,
    /// Whether retrieved context is usable for this batch
    pub available: bool,
    /// Wall time spent retrieving, in milliseconds
    pub elapsed_ms: u64,
}

impl RetrievalOutcome {
    /// Degraded outcome: no sources, not available
    #[inline]
    #[must_use]
    pub fn unavailable(elapsed_ms: u64) -> Self {
        Self {
            sources: Vec::new(),
            available: false,
            elapsed_ms,
        }
    }
}

/// Client wrapping the external retrieval provider
#[derive(Clone)]
pub struct RetrievalClient {
    provider: Arc<dyn RetrievalProvider>,
}

impl RetrievalClient {
    /// Create a client over a provider
    #[inline]
    #[must_use]
    pub fn new(provider: Arc<dyn RetrievalProvider>) -> Self {
        Self { provider }
    }

    /// Retrieve sources for one batch
    ///
    /// Applies the configured timeout per attempt and retries once on a
    /// transient failure. Never returns an error: degraded retrieval is an
    /// outcome, not a failure.
    pub async fn retrieve(
        &self,
        query: RetrievalQuery,
        config: &RetrievalConfig,
    ) -> RetrievalOutcome {
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let call = self.provider.search(query.clone());

            match tokio::time::timeout(config.call_timeout(), call).await {
                Ok(Ok(sources)) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    return self.filter(sources, &query, config, elapsed_ms);
                }
                Ok(Err(err)) if err.is_transient() && attempt <= config.max_retries => {
                    tracing::warn!(attempt, error = %err, "retrieval failed, retrying");
                }
                Ok(Err(err)) => {
                    tracing::warn!(attempt, error = %err, "retrieval degraded");
                    return RetrievalOutcome::unavailable(started.elapsed().as_millis() as u64);
                }
                Err(_) if attempt <= config.max_retries => {
                    tracing::warn!(
                        attempt,
                        timeout_ms = config.timeout_ms,
                        "retrieval timed out, retrying"
                    );
                }
                Err(_) => {
                    tracing::warn!(timeout_ms = config.timeout_ms, "retrieval timed out");
                    return RetrievalOutcome::unavailable(started.elapsed().as_millis() as u64);
                }
            }
        }
    }

    fn filter(
        &self,
        mut sources: Vec<KnowledgeSource>,
        query: &RetrievalQuery,
        config: &RetrievalConfig,
        elapsed_ms: u64,
    ) -> RetrievalOutcome {
        sources.retain(|s| s.similarity >= config.similarity_threshold);
        sources.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        if query.limit > 0 {
            sources.truncate(query.limit);
        }

        let available = !sources.is_empty();
        tracing::debug!(
            kept = sources.len(),
            available,
            elapsed_ms,
            "retrieval completed"
        );

        RetrievalOutcome {
            sources,
            available,
            elapsed_ms,
        }
    }
}

impl std::fmt::Debug for RetrievalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RetrievalProviderError;
    use mockall::Sequence;

    mockall::mock! {
        Provider {}

        #[async_trait::async_trait]
        impl RetrievalProvider for Provider {
            async fn search(
                &self,
                query: RetrievalQuery,
            ) -> Result<Vec<KnowledgeSource>, RetrievalProviderError>;
        }
    }

    fn query() -> RetrievalQuery {
        RetrievalQuery::new("leadership", "better feedback conversations")
    }

    #[tokio::test]
    async fn retrieve_filters_below_threshold_and_sorts() {
        let mut provider = MockProvider::new();
        provider.expect_search().times(1).returning(|_| {
            Ok(vec![
                KnowledgeSource::new("a.md", "low", 0.40),
                KnowledgeSource::new("b.md", "high", 0.91),
                KnowledgeSource::new("c.md", "mid", 0.70),
            ])
        });

        let client = RetrievalClient::new(Arc::new(provider));
        let outcome = client.retrieve(query(), &RetrievalConfig::default()).await;

        assert!(outcome.available);
        let origins: Vec<&str> = outcome.sources.iter().map(|s| s.origin.as_str()).collect();
        assert_eq!(origins, vec!["b.md", "c.md"]);
    }

    #[tokio::test]
    async fn retrieve_empty_result_is_unavailable() {
        let mut provider = MockProvider::new();
        provider.expect_search().times(1).returning(|_| Ok(vec![]));

        let client = RetrievalClient::new(Arc::new(provider));
        let outcome = client.retrieve(query(), &RetrievalConfig::default()).await;

        assert!(!outcome.available);
        assert!(outcome.sources.is_empty());
    }

    #[tokio::test]
    async fn retrieve_all_below_threshold_is_unavailable() {
        let mut provider = MockProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_| Ok(vec![KnowledgeSource::new("a.md", "weak match", 0.30)]));

        let client = RetrievalClient::new(Arc::new(provider));
        let outcome = client.retrieve(query(), &RetrievalConfig::default()).await;

        assert!(!outcome.available);
    }

    #[tokio::test]
    async fn retrieve_retries_once_on_transient_failure() {
        let mut provider = MockProvider::new();
        let mut seq = Sequence::new();
        provider
            .expect_search()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(RetrievalProviderError::Provider {
                    status: 503,
                    message: "overloaded".to_string(),
                })
            });
        provider
            .expect_search()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![KnowledgeSource::new("a.md", "recovered", 0.88)]));

        let client = RetrievalClient::new(Arc::new(provider));
        let outcome = client.retrieve(query(), &RetrievalConfig::default()).await;

        assert!(outcome.available);
        assert_eq!(outcome.sources.len(), 1);
    }

    #[tokio::test]
    async fn retrieve_does_not_retry_permanent_failure() {
        let mut provider = MockProvider::new();
        provider.expect_search().times(1).returning(|_| {
            Err(RetrievalProviderError::Provider {
                status: 400,
                message: "bad query".to_string(),
            })
        });

        let client = RetrievalClient::new(Arc::new(provider));
        let outcome = client.retrieve(query(), &RetrievalConfig::default()).await;

        assert!(!outcome.available);
    }

    #[tokio::test]
    async fn retrieve_gives_up_after_bounded_retries() {
        let mut provider = MockProvider::new();
        provider.expect_search().times(2).returning(|_| {
            Err(RetrievalProviderError::Transport("connection reset".to_string()))
        });

        let client = RetrievalClient::new(Arc::new(provider));
        let outcome = client.retrieve(query(), &RetrievalConfig::default()).await;

        assert!(!outcome.available);
        assert!(outcome.sources.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn retrieve_times_out_slow_provider() {
        struct SlowProvider;

        #[async_trait::async_trait]
        impl RetrievalProvider for SlowProvider {
            async fn search(
                &self,
                _query: RetrievalQuery,
            ) -> Result<Vec<KnowledgeSource>, RetrievalProviderError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(vec![KnowledgeSource::new("late.md", "too late", 0.99)])
            }
        }

        let client = RetrievalClient::new(Arc::new(SlowProvider));
        let config = RetrievalConfig::default().with_timeout(Duration::from_secs(10));
        let outcome = client.retrieve(query(), &config).await;

        assert!(!outcome.available);
    }

    #[tokio::test]
    async fn retrieve_respects_query_limit() {
        let mut provider = MockProvider::new();
        provider.expect_search().times(1).returning(|_| {
            Ok((0..6)
                .map(|i| KnowledgeSource::new(format!("doc-{i}.md"), "text", 0.70 + f64::from(i) * 0.01))
                .collect())
        });

        let client = RetrievalClient::new(Arc::new(provider));
        let outcome = client
            .retrieve(query().with_limit(3), &RetrievalConfig::default())
            .await;

        assert_eq!(outcome.sources.len(), 3);
    }
}
