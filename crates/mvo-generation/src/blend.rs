//! Blend generator
//!
//! Produces one candidate outline for a given retrieval weight. Owns the
//! per-call timeout and a single bounded retry on transient provider
//! failures; every failure mode collapses into [`VariantGenerationFailed`]
//! for the orchestrator's fallback policy to handle.

use crate::provider::{GenerativeError, GenerativeProvider, PromptSpec, RawOutline};
use crate::prompt::build_prompt;
use mvo_outline::{GenerationRequest, Outline, Section, TopicRef};
use mvo_retrieval::KnowledgeSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Generation call configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after a transient provider failure
    pub max_transient_retries: u32,
    /// Context token budget at weight 1.0
    pub context_token_budget: u32,
}

impl GenerationConfig {
    /// Per-call timeout as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// With per-call timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_transient_retries: 1,
            context_token_budget: 3000,
        }
    }
}

/// A completed blend: one outline plus what went into it
#[derive(Debug, Clone)]
pub struct BlendOutcome {
    /// The generated outline
    pub outline: Outline,
    /// Sources that actually entered the prompt context
    pub sources_used: Vec<KnowledgeSource>,
    /// Wall time spent generating, in milliseconds
    pub elapsed_ms: u64,
}

/// Signal raised when one slot's generation attempt fails
///
/// Carries the weight and elapsed time; recovery (weight-0 retry, template
/// substitution) is the orchestrator's job.
#[derive(Debug, thiserror::Error)]
#[error("variant generation failed at weight {rag_weight} after {elapsed_ms}ms: {source}")]
pub struct VariantGenerationFailed {
    /// Retrieval weight of the failed slot
    pub rag_weight: f64,
    /// Wall time spent before failing, in milliseconds
    pub elapsed_ms: u64,
    /// Underlying provider failure
    #[source]
    pub source: GenerativeError,
}

/// Generates one candidate outline per invocation
#[derive(Clone)]
pub struct BlendGenerator {
    provider: Arc<dyn GenerativeProvider>,
}

impl BlendGenerator {
    /// Create a generator over a provider
    #[inline]
    #[must_use]
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Self {
        Self { provider }
    }

    /// Generate one outline at the given retrieval weight
    ///
    /// `sources` is the batch-wide retrieval result, shared read-only; the
    /// slice actually used is scaled to the weight and reported back in the
    /// outcome.
    ///
    /// # Errors
    /// Returns [`VariantGenerationFailed`] on timeout, provider error, or a
    /// malformed response. At most one extra attempt is made, and only for
    /// transient (5xx-class) failures.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        rag_weight: f64,
        sources: &[KnowledgeSource],
        config: &GenerationConfig,
    ) -> Result<BlendOutcome, VariantGenerationFailed> {
        let started = Instant::now();
        let (prompt, used) = build_prompt(request, rag_weight, sources, config.context_token_budget);

        let fail = |err: GenerativeError, started: Instant| VariantGenerationFailed {
            rag_weight,
            elapsed_ms: started.elapsed().as_millis() as u64,
            source: err,
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.attempt(prompt.clone(), request, config).await {
                Ok(outline) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    tracing::debug!(
                        rag_weight,
                        sections = outline.section_count(),
                        elapsed_ms,
                        "blend generated"
                    );
                    return Ok(BlendOutcome {
                        outline,
                        sources_used: used,
                        elapsed_ms,
                    });
                }
                Err(err) if err.is_transient() && attempt <= config.max_transient_retries => {
                    tracing::warn!(rag_weight, attempt, error = %err, "generation failed, retrying");
                }
                Err(err) => {
                    tracing::warn!(rag_weight, attempt, error = %err, "generation failed");
                    return Err(fail(err, started));
                }
            }
        }
    }

    async fn attempt(
        &self,
        prompt: PromptSpec,
        request: &GenerationRequest,
        config: &GenerationConfig,
    ) -> Result<Outline, GenerativeError> {
        let call = self.provider.generate(prompt);
        let raw = tokio::time::timeout(config.call_timeout(), call)
            .await
            .map_err(|_| GenerativeError::Timeout {
                timeout_ms: config.timeout_ms,
            })??;
        assemble(raw, request)
    }
}

impl std::fmt::Debug for BlendGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlendGenerator").finish_non_exhaustive()
    }
}

/// Turn a raw provider response into a domain outline
///
/// Provenance is assigned here, once: sections echoing a seed-topic id get
/// user provenance and a topic link; everything else is generated.
fn assemble(raw: RawOutline, request: &GenerationRequest) -> Result<Outline, GenerativeError> {
    if raw.title.trim().is_empty() {
        return Err(GenerativeError::Malformed("empty outline title".to_string()));
    }
    if raw.sections.is_empty() {
        return Err(GenerativeError::Malformed("outline has no sections".to_string()));
    }

    let mut outline = Outline::new(raw.title, raw.description);
    if let Some(total) = raw.total_duration_minutes {
        outline = outline.with_stated_duration(total);
    }

    for raw_section in raw.sections {
        let seed = raw_section
            .topic_id
            .as_deref()
            .and_then(|id| request.seed_topics.iter().find(|t| t.topic_id == id));

        let section = match seed {
            Some(topic) => Section::from_user_topic(
                raw_section.kind,
                TopicRef {
                    topic_id: topic.topic_id.clone(),
                    title: topic.title.clone(),
                },
                raw_section.duration_minutes,
            )
            .with_description(raw_section.description)
            .with_objectives(raw_section.objectives),
            None => Section::generated(
                raw_section.kind,
                raw_section.title,
                raw_section.duration_minutes,
            )
            .with_description(raw_section.description)
            .with_objectives(raw_section.objectives),
        };

        outline.push_section(section);
    }

    Ok(outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RawSection;
    use mvo_outline::{Provenance, SectionKind, UserTopic};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn request() -> GenerationRequest {
        GenerationRequest::new("leadership", "workshop", "actionable feedback", 120)
    }

    fn raw_outline() -> RawOutline {
        RawOutline {
            title: "Feedback essentials".to_string(),
            description: "A compact feedback workshop".to_string(),
            total_duration_minutes: None,
            sections: vec![
                RawSection {
                    kind: SectionKind::Opener,
                    title: "Welcome".to_string(),
                    duration_minutes: 10,
                    description: String::new(),
                    objectives: Vec::new(),
                    topic_id: None,
                },
                RawSection {
                    kind: SectionKind::Topic,
                    title: "SBI model".to_string(),
                    duration_minutes: 40,
                    description: String::new(),
                    objectives: Vec::new(),
                    topic_id: None,
                },
            ],
        }
    }

    /// Provider that fails a fixed number of times, then succeeds.
    struct FlakyProvider {
        failures: AtomicU32,
        error_status: u16,
    }

    #[async_trait::async_trait]
    impl GenerativeProvider for FlakyProvider {
        async fn generate(&self, _prompt: PromptSpec) -> Result<RawOutline, GenerativeError> {
            if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n > 0).then(|| n - 1)
            }).is_ok()
            {
                return Err(GenerativeError::Provider {
                    status: self.error_status,
                    message: "provider failure".to_string(),
                });
            }
            Ok(raw_outline())
        }
    }

    #[tokio::test]
    async fn generate_success() {
        let generator = BlendGenerator::new(Arc::new(FlakyProvider {
            failures: AtomicU32::new(0),
            error_status: 500,
        }));

        let outcome = generator
            .generate(&request(), 0.5, &[], &GenerationConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.outline.section_count(), 2);
        assert_eq!(outcome.outline.total_duration(), 50);
    }

    #[tokio::test]
    async fn generate_retries_transient_failure_once() {
        let generator = BlendGenerator::new(Arc::new(FlakyProvider {
            failures: AtomicU32::new(1),
            error_status: 503,
        }));

        let outcome = generator
            .generate(&request(), 0.66, &[], &GenerationConfig::default())
            .await;

        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn generate_fails_after_exhausted_retries() {
        let generator = BlendGenerator::new(Arc::new(FlakyProvider {
            failures: AtomicU32::new(5),
            error_status: 503,
        }));

        let err = generator
            .generate(&request(), 0.66, &[], &GenerationConfig::default())
            .await
            .unwrap_err();

        assert!((err.rag_weight - 0.66).abs() < f64::EPSILON);
        assert!(matches!(err.source, GenerativeError::Provider { status: 503, .. }));
    }

    #[tokio::test]
    async fn generate_does_not_retry_permanent_failure() {
        let provider = FlakyProvider {
            failures: AtomicU32::new(5),
            error_status: 401,
        };
        let generator = BlendGenerator::new(Arc::new(provider));

        let err = generator
            .generate(&request(), 1.0, &[], &GenerationConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err.source, GenerativeError::Provider { status: 401, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn generate_times_out_slow_provider() {
        struct SlowProvider;

        #[async_trait::async_trait]
        impl GenerativeProvider for SlowProvider {
            async fn generate(&self, _prompt: PromptSpec) -> Result<RawOutline, GenerativeError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(raw_outline())
            }
        }

        let generator = BlendGenerator::new(Arc::new(SlowProvider));
        let config = GenerationConfig::default().with_timeout(Duration::from_secs(10));

        let err = generator
            .generate(&request(), 0.66, &[], &config)
            .await
            .unwrap_err();

        assert!(matches!(err.source, GenerativeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn malformed_empty_outline_fails() {
        struct EmptyProvider;

        #[async_trait::async_trait]
        impl GenerativeProvider for EmptyProvider {
            async fn generate(&self, _prompt: PromptSpec) -> Result<RawOutline, GenerativeError> {
                Ok(RawOutline {
                    title: "Empty".to_string(),
                    description: String::new(),
                    total_duration_minutes: None,
                    sections: Vec::new(),
                })
            }
        }

        let generator = BlendGenerator::new(Arc::new(EmptyProvider));
        let err = generator
            .generate(&request(), 0.33, &[], &GenerationConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err.source, GenerativeError::Malformed(_)));
    }

    #[test]
    fn assemble_marks_seed_topic_sections_as_user() {
        let request = request().with_seed_topics(vec![UserTopic {
            topic_id: "topic-42".to_string(),
            title: "Existing module".to_string(),
            description: String::new(),
            duration_minutes: 20,
        }]);

        let mut raw = raw_outline();
        raw.sections.push(RawSection {
            kind: SectionKind::Topic,
            title: "Existing module".to_string(),
            duration_minutes: 20,
            description: String::new(),
            objectives: Vec::new(),
            topic_id: Some("topic-42".to_string()),
        });

        let outline = assemble(raw, &request).unwrap();
        let user_sections: Vec<_> = outline
            .sections
            .iter()
            .filter(|s| s.provenance() == Provenance::User)
            .collect();

        assert_eq!(user_sections.len(), 1);
        assert_eq!(
            user_sections[0].topic_ref.as_ref().map(|t| t.topic_id.as_str()),
            Some("topic-42")
        );
    }

    #[test]
    fn assemble_ignores_unknown_topic_ids() {
        let mut raw = raw_outline();
        raw.sections[1].topic_id = Some("not-a-seed".to_string());

        let outline = assemble(raw, &request()).unwrap();
        assert!(outline.sections.iter().all(|s| !s.is_user_authored()));
    }
}
