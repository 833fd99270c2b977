//! The variant engine
//!
//! Sole entry point for callers: gate the request, resolve retrieval once,
//! run the fan-out, and hand back either a full batch or the legacy route.
//! Selections are reported out-of-band through [`VariantEngine::record_selection`].

use crate::config::ConfigHandle;
use crate::error::EngineError;
use crate::orchestrator::VariantOrchestrator;
use crate::types::{GenerationMetadata, GenerationOutcome, Variant, VariantBatch};
use mvo_generation::{BlendGenerator, GenerativeProvider};
use mvo_outline::{GenerationRequest, RequestFingerprint};
use mvo_retrieval::{RetrievalClient, RetrievalProvider, RetrievalQuery};
use mvo_telemetry::{SelectionLog, SelectionRecord, StageEvent, TelemetryLog};
use std::sync::Arc;
use std::time::Instant;

/// The multi-variant outline engine
///
/// Owns the pipeline end to end; the retrieval and generative providers are
/// injected at the seams.
pub struct VariantEngine {
    config: ConfigHandle,
    retrieval: RetrievalClient,
    orchestrator: VariantOrchestrator,
    telemetry: Arc<TelemetryLog>,
    selections: Arc<SelectionLog>,
}

impl VariantEngine {
    /// Create an engine over the two external providers
    #[must_use]
    pub fn new(
        config: ConfigHandle,
        retrieval_provider: Arc<dyn RetrievalProvider>,
        generative_provider: Arc<dyn GenerativeProvider>,
    ) -> Self {
        let event_cap = config.current().telemetry_event_cap;
        Self {
            config,
            retrieval: RetrievalClient::new(retrieval_provider),
            orchestrator: VariantOrchestrator::new(BlendGenerator::new(generative_provider)),
            telemetry: Arc::new(TelemetryLog::new(event_cap)),
            selections: Arc::new(SelectionLog::new()),
        }
    }

    /// Generate a batch of candidate variants for a request
    ///
    /// Control flow: rollout gate, then one retrieval round shared by the
    /// whole batch, then the concurrent fan-out. A disabled gate is a normal
    /// outcome ([`GenerationOutcome::LegacyRoute`]), not an error.
    ///
    /// # Errors
    /// Returns [`EngineError::BatchGenerationFailed`] only when every slot
    /// exhausted its fallback chain.
    pub async fn generate_variants(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, EngineError> {
        // Hot-reload point: one snapshot governs the whole request.
        let config = self.config.current();
        let started = Instant::now();

        let decision = mvo_rollout::decide(&config.rollout, &request.fingerprint);
        self.telemetry.record(StageEvent::RolloutDecided {
            enabled: decision.enabled,
            sample_percentile: decision.sample_percentile,
        });

        if !decision.enabled {
            tracing::info!(
                fingerprint = %request.fingerprint.short(),
                reason = ?decision.reason,
                "request routed to legacy path"
            );
            return Ok(GenerationOutcome::LegacyRoute(decision));
        }

        tracing::info!(
            fingerprint = %request.fingerprint.short(),
            category = %request.category,
            "generating variant batch"
        );

        // One retrieval call per batch, shared by every slot.
        let query = RetrievalQuery::new(&request.category, &request.desired_outcome)
            .with_topics(request.seed_topics.iter().map(|t| t.title.clone()).collect());
        let retrieval = self.retrieval.retrieve(query, &config.retrieval).await;
        self.telemetry.record(StageEvent::RetrievalCompleted {
            available: retrieval.available,
            source_count: retrieval.sources.len(),
            elapsed_ms: retrieval.elapsed_ms,
        });

        match self
            .orchestrator
            .run(request, &retrieval, &config, &self.telemetry)
            .await
        {
            Ok(variants) => {
                let batch = VariantBatch {
                    rag_available: retrieval.available,
                    metadata: GenerationMetadata {
                        decision,
                        retrieval_elapsed_ms: retrieval.elapsed_ms,
                        batch_elapsed_ms: started.elapsed().as_millis() as u64,
                        fallback_count: variants.iter().filter(|v| v.fallback_used).count(),
                    },
                    variants,
                };
                self.telemetry.record(StageEvent::BatchCompleted {
                    variant_count: batch.variants.len(),
                    fallback_count: batch.metadata.fallback_count,
                    elapsed_ms: batch.metadata.batch_elapsed_ms,
                });
                tracing::info!(
                    variants = batch.variants.len(),
                    fallbacks = batch.metadata.fallback_count,
                    rag_available = batch.rag_available,
                    "batch completed"
                );
                Ok(GenerationOutcome::MultiVariant(batch))
            }
            Err(err) => {
                let failed_stage = err
                    .failed_stage()
                    .map_or("unknown", |s| match s {
                        crate::error::FailedStage::Retrieval => "retrieval",
                        crate::error::FailedStage::Generation => "generation",
                    });
                self.telemetry.record(StageEvent::BatchFailed {
                    failed_stage: failed_stage.to_string(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
                tracing::error!(error = %err, "batch failed");
                Err(err)
            }
        }
    }

    /// Report the user's eventual pick (or that none were acceptable)
    ///
    /// Fire-and-forget: never fails, never blocks the response path.
    pub fn record_selection(&self, fingerprint: RequestFingerprint, chosen: Option<&Variant>) {
        let record = match chosen {
            Some(variant) => SelectionRecord::chosen(
                fingerprint,
                variant.id.to_string(),
                variant.rag_weight,
                variant.generation_source,
            ),
            None => SelectionRecord::rejected(fingerprint),
        };

        self.telemetry.record(StageEvent::SelectionRecorded {
            fingerprint: fingerprint.short(),
            variant_id: record.chosen_variant_id.clone().unwrap_or_default(),
        });
        self.selections.record(record);
    }

    /// Configuration handle (shared; writes apply to subsequent requests)
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Telemetry log, for bulk export by monitoring collaborators
    #[inline]
    #[must_use]
    pub fn telemetry(&self) -> &TelemetryLog {
        &self.telemetry
    }

    /// Selection log, for offline comparison export
    #[inline]
    #[must_use]
    pub fn selections(&self) -> &SelectionLog {
        &self.selections
    }
}

impl std::fmt::Debug for VariantEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantEngine")
            .field("config", &self.config.current())
            .finish_non_exhaustive()
    }
}
