//! Variant orchestrator
//!
//! Fans out one generation task per configured weight, waits for the whole
//! set to settle inside the batch deadline, and assembles exactly N variants
//! in canonical weight order.
//!
//! # Per-slot fallback chain
//! 1. Model generation at the slot's weight
//! 2. Model generation at weight 0, ignoring retrieval entirely
//! 3. Template skeleton
//!
//! A slot is never empty. The batch as a whole fails only when no slot
//! obtained a model-generated outline.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::types::{Variant, VariantId};
use mvo_generation::{template_outline, weight_band, BlendGenerator, BlendOutcome};
use mvo_outline::{ContributionMix, GenerationRequest};
use mvo_retrieval::{KnowledgeSource, RetrievalOutcome};
use mvo_telemetry::{GenerationSource, StageEvent, TelemetryLog};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// How one slot settled
#[derive(Debug)]
enum SlotSettled {
    /// Primary attempt at the slot's weight succeeded
    Primary(BlendOutcome),
    /// Weight-0 fallback generation succeeded
    FallbackModel(BlendOutcome),
    /// Both model attempts failed
    Exhausted {
        /// Wall time spent on the slot, in milliseconds
        elapsed_ms: u64,
    },
}

/// Slot index plus its settled state, returned by each fan-out task
#[derive(Debug)]
struct SlotResult {
    slot: usize,
    settled: SlotSettled,
}

/// Fans out blend generation and assembles variant batches
#[derive(Debug, Clone)]
pub struct VariantOrchestrator {
    generator: BlendGenerator,
}

impl VariantOrchestrator {
    /// Create an orchestrator over a blend generator
    #[inline]
    #[must_use]
    pub fn new(generator: BlendGenerator) -> Self {
        Self { generator }
    }

    /// Run the fan-out for one batch
    ///
    /// The retrieval outcome is resolved once per batch and shared read-only
    /// across all slot tasks. Output order follows the configured weights,
    /// independent of task completion order.
    ///
    /// # Errors
    /// Returns [`EngineError::BatchGenerationFailed`] when no slot produced
    /// a model-generated outline; no partial batch is ever returned.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        retrieval: &RetrievalOutcome,
        config: &EngineConfig,
        telemetry: &TelemetryLog,
    ) -> Result<Vec<Variant>, EngineError> {
        let weights = config.batch.weights.clone();
        let slots = weights.len();

        // Shared read-only by every slot task. Degraded retrieval means an
        // empty list: all weights run baseline-only, labels preserved.
        let sources: Arc<Vec<KnowledgeSource>> = Arc::new(if retrieval.available {
            retrieval.sources.clone()
        } else {
            Vec::new()
        });

        let mut join_set = JoinSet::new();
        for (slot, weight) in weights.iter().copied().enumerate() {
            let generator = self.generator.clone();
            let request = request.clone();
            let sources = Arc::clone(&sources);
            let gen_config = config.generation;

            join_set.spawn(async move {
                let started = Instant::now();
                let settled = match generator
                    .generate(&request, weight, &sources, &gen_config)
                    .await
                {
                    Ok(outcome) => SlotSettled::Primary(outcome),
                    Err(primary) => {
                        tracing::warn!(slot, weight, error = %primary, "slot falling back to weight 0");
                        match generator.generate(&request, 0.0, &[], &gen_config).await {
                            Ok(outcome) => SlotSettled::FallbackModel(outcome),
                            Err(fallback) => {
                                tracing::warn!(slot, error = %fallback, "slot exhausted model attempts");
                                SlotSettled::Exhausted {
                                    elapsed_ms: started.elapsed().as_millis() as u64,
                                }
                            }
                        }
                    }
                };
                SlotResult { slot, settled }
            });
        }

        let mut settled: Vec<Option<SlotSettled>> =
            std::iter::repeat_with(|| None).take(slots).collect();

        let deadline = tokio::time::sleep(config.batch.batch_timeout());
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                () = &mut deadline => {
                    tracing::warn!(
                        timeout_ms = config.batch.batch_timeout_ms,
                        "batch deadline elapsed, cancelling in-flight slots"
                    );
                    join_set.abort_all();
                    break;
                }
                joined = join_set.join_next() => match joined {
                    Some(Ok(result)) => settled[result.slot] = Some(result.settled),
                    Some(Err(err)) if err.is_cancelled() => {}
                    Some(Err(err)) => tracing::error!(error = %err, "slot task failed"),
                    None => break,
                }
            }
        }

        // Slots that finished before the abort landed are kept as-is.
        while let Some(joined) = join_set.join_next().await {
            if let Ok(result) = joined {
                settled[result.slot].get_or_insert(result.settled);
            }
        }

        self.assemble(request, retrieval, &weights, settled, config, telemetry)
    }

    /// Turn settled slots into the final batch, in canonical order
    fn assemble(
        &self,
        request: &GenerationRequest,
        retrieval: &RetrievalOutcome,
        weights: &[f64],
        mut settled: Vec<Option<SlotSettled>>,
        config: &EngineConfig,
        telemetry: &TelemetryLog,
    ) -> Result<Vec<Variant>, EngineError> {
        let mut variants = Vec::with_capacity(weights.len());
        let mut model_outlines = 0usize;

        for (slot, weight) in weights.iter().copied().enumerate() {
            let band = weight_band(weight);

            let (variant, template_used, elapsed_ms) = match settled[slot].take() {
                Some(SlotSettled::Primary(outcome)) => {
                    model_outlines += 1;
                    // No usable context means no retrieved share, whatever
                    // the slot's nominal weight.
                    let mix_weight = if outcome.sources_used.is_empty() { 0.0 } else { weight };
                    let mix = ContributionMix::for_outline(&outcome.outline, mix_weight);
                    let elapsed_ms = outcome.elapsed_ms;
                    (
                        Variant {
                            id: VariantId::new(),
                            label: band.label.to_string(),
                            description: band.description.to_string(),
                            rag_weight: weight,
                            sources_used: outcome.sources_used,
                            outline: outcome.outline,
                            mix,
                            fallback_used: false,
                            generation_source: GenerationSource::Model,
                        },
                        false,
                        elapsed_ms,
                    )
                }
                Some(SlotSettled::FallbackModel(outcome)) => {
                    model_outlines += 1;
                    let mix = ContributionMix::for_outline(&outcome.outline, 0.0);
                    let elapsed_ms = outcome.elapsed_ms;
                    (
                        Variant {
                            id: VariantId::new(),
                            label: band.label.to_string(),
                            description: band.description.to_string(),
                            rag_weight: 0.0,
                            sources_used: Vec::new(),
                            outline: outcome.outline,
                            mix,
                            fallback_used: true,
                            generation_source: GenerationSource::FallbackModel,
                        },
                        false,
                        elapsed_ms,
                    )
                }
                // Exhausted, or cancelled at the batch deadline: template.
                other => {
                    let elapsed_ms = match other {
                        Some(SlotSettled::Exhausted { elapsed_ms }) => elapsed_ms,
                        _ => config.batch.batch_timeout_ms,
                    };
                    let outline = template_outline(request);
                    let mix = ContributionMix::for_outline(&outline, 0.0);
                    (
                        Variant {
                            id: VariantId::new(),
                            label: band.label.to_string(),
                            description: band.description.to_string(),
                            rag_weight: 0.0,
                            sources_used: Vec::new(),
                            outline,
                            mix,
                            fallback_used: true,
                            generation_source: GenerationSource::Template,
                        },
                        true,
                        elapsed_ms,
                    )
                }
            };

            telemetry.record(StageEvent::VariantCompleted {
                slot,
                rag_weight: variant.rag_weight,
                fallback_used: variant.fallback_used,
                template_used,
                elapsed_ms,
            });
            variants.push(variant);
        }

        if model_outlines == 0 {
            return Err(EngineError::BatchGenerationFailed {
                slots: weights.len(),
                retrieval_available: retrieval.available,
            });
        }

        Ok(variants)
    }
}
