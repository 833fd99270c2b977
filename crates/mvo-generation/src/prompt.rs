//! Prompt assembly
//!
//! Builds the [`PromptSpec`] for one slot: structural instructions, a
//! weight-band persona, and retrieved context scaled linearly to the slot's
//! retrieval weight.

use crate::provider::{ContextPassage, PromptSpec};
use mvo_outline::GenerationRequest;
use mvo_retrieval::KnowledgeSource;

/// Rough chars-per-token ratio used for context budgeting
const CHARS_PER_TOKEN: usize = 4;

/// Style framing attached to a retrieval weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightBand {
    /// Short label shown to the user on the variant
    pub label: &'static str,
    /// One-line description of the variant's style
    pub description: &'static str,
    /// Persona framing injected into the prompt
    pub persona: &'static str,
}

const BANDS: [(f64, WeightBand); 4] = [
    (
        0.9,
        WeightBand {
            label: "Knowledge-driven",
            description: "Grounded as closely as possible in your knowledge base",
            persona: "You are a meticulous curriculum designer. Stay close to the \
                      provided reference material; prefer its terminology, exercises, \
                      and sequencing over your own inventions.",
        },
    ),
    (
        0.5,
        WeightBand {
            label: "Balanced blend",
            description: "Even mix of knowledge-base material and fresh ideas",
            persona: "You are an experienced trainer. Weave the provided reference \
                      material together with your own proven session patterns.",
        },
    ),
    (
        f64::EPSILON,
        WeightBand {
            label: "Lightly sourced",
            description: "Mostly fresh content with a few grounding references",
            persona: "You are a creative facilitator. Design freely, using the \
                      provided reference material only where it clearly strengthens \
                      a section.",
        },
    ),
    (
        f64::NEG_INFINITY,
        WeightBand {
            label: "Fresh take",
            description: "Free-form design, unconstrained by existing material",
            persona: "You are an inventive session designer. Ignore existing \
                      material and propose an original, engaging structure.",
        },
    ),
];

/// Style framing for a retrieval weight
///
/// Bands are fixed so slot labels stay distinct even when retrieval is
/// degraded and every slot runs baseline-only.
#[must_use]
pub fn weight_band(weight: f64) -> WeightBand {
    for (floor, band) in BANDS {
        if weight >= floor {
            return band;
        }
    }
    BANDS[BANDS.len() - 1].1
}

/// Select the context that fits a weight-scaled token budget
///
/// The budget scales linearly: full at weight 1.0, zero at weight 0.0.
/// Sources are consumed in the given (similarity-descending) order; a source
/// that would overflow the remaining budget is skipped rather than split.
#[must_use]
pub fn scale_context(
    sources: &[KnowledgeSource],
    weight: f64,
    token_budget: u32,
) -> Vec<KnowledgeSource> {
    let weight = weight.clamp(0.0, 1.0);
    let mut remaining = (f64::from(token_budget) * weight).round() as usize;
    let mut selected = Vec::new();

    for source in sources {
        let cost = source.excerpt.len().div_ceil(CHARS_PER_TOKEN).max(1);
        if cost > remaining {
            continue;
        }
        remaining -= cost;
        selected.push(source.clone());
    }

    selected
}

/// Assemble the prompt for one slot
///
/// Returns the prompt together with the sources that actually made it into
/// the context window, so the caller can attribute them on the variant.
#[must_use]
pub fn build_prompt(
    request: &GenerationRequest,
    weight: f64,
    sources: &[KnowledgeSource],
    token_budget: u32,
) -> (PromptSpec, Vec<KnowledgeSource>) {
    let band = weight_band(weight);
    let used = scale_context(sources, weight, token_budget);

    let context = used
        .iter()
        .map(|s| ContextPassage {
            origin: s.origin.clone(),
            excerpt: s.excerpt.clone(),
        })
        .collect();

    let mut instructions = format!(
        "Design a {} session outline for the category \"{}\". Desired outcome: {}. \
         Target duration: {} minutes. Return an ordered list of sections \
         (opener/topic/exercise/discussion/break/closing) with titles, durations \
         in minutes, descriptions, and learning objectives.",
        request.session_kind, request.category, request.desired_outcome, request.duration_minutes,
    );
    if let Some(size) = request.audience_size {
        instructions.push_str(&format!(" Expected audience: about {size} participants."));
    }
    if !request.seed_topics.is_empty() {
        instructions.push_str(
            " Incorporate each of the following existing topics as its own section, \
             echoing the given topic id:",
        );
        for topic in &request.seed_topics {
            instructions.push_str(&format!(
                " [{}] \"{}\" ({} min);",
                topic.topic_id, topic.title, topic.duration_minutes
            ));
        }
    }

    let prompt = PromptSpec {
        request: request.clone(),
        rag_weight: weight.clamp(0.0, 1.0),
        structural_instructions: instructions,
        persona: band.persona.to_string(),
        context,
    };

    (prompt, used)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::new("leadership", "workshop", "actionable feedback", 180)
    }

    fn source(origin: &str, excerpt_len: usize, similarity: f64) -> KnowledgeSource {
        KnowledgeSource::new(origin, "x".repeat(excerpt_len), similarity)
    }

    #[test]
    fn weight_bands_are_distinct() {
        let labels: Vec<&str> = [1.0, 0.66, 0.33, 0.0]
            .iter()
            .map(|w| weight_band(*w).label)
            .collect();
        assert_eq!(
            labels,
            vec!["Knowledge-driven", "Balanced blend", "Lightly sourced", "Fresh take"]
        );
    }

    #[test]
    fn full_weight_keeps_sources_within_budget() {
        let sources = vec![
            source("a.md", 400, 0.9), // ~100 tokens
            source("b.md", 400, 0.8),
            source("c.md", 400, 0.7),
        ];

        let kept = scale_context(&sources, 1.0, 3000);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn zero_weight_keeps_nothing() {
        let sources = vec![source("a.md", 4, 0.9)];
        assert!(scale_context(&sources, 0.0, 3000).is_empty());
    }

    #[test]
    fn scaled_budget_truncates_lower_ranked_sources() {
        // Each source costs ~250 tokens; a half-weight budget of 500 fits two.
        let sources = vec![
            source("a.md", 1000, 0.9),
            source("b.md", 1000, 0.8),
            source("c.md", 1000, 0.7),
        ];

        let kept = scale_context(&sources, 0.5, 1000);
        let origins: Vec<&str> = kept.iter().map(|s| s.origin.as_str()).collect();
        assert_eq!(origins, vec!["a.md", "b.md"]);
    }

    #[test]
    fn build_prompt_reports_used_sources() {
        let sources = vec![source("a.md", 1000, 0.9), source("b.md", 100_000, 0.8)];

        let (prompt, used) = build_prompt(&request(), 1.0, &sources, 3000);
        assert_eq!(used.len(), 1);
        assert_eq!(prompt.context.len(), 1);
        assert_eq!(prompt.context[0].origin, "a.md");
    }

    #[test]
    fn build_prompt_mentions_seed_topics() {
        let request = request().with_seed_topics(vec![mvo_outline::UserTopic {
            topic_id: "topic-42".to_string(),
            title: "Existing module".to_string(),
            description: String::new(),
            duration_minutes: 20,
        }]);

        let (prompt, _) = build_prompt(&request, 0.5, &[], 3000);
        assert!(prompt.structural_instructions.contains("topic-42"));
    }
}
