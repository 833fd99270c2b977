//! Testing utilities for MVO workspace
//!
//! Scripted provider doubles and request/source fixtures shared by
//! workspace tests.

#![allow(missing_docs)]

use mvo_generation::{
    GenerativeError, GenerativeProvider, PromptSpec, RawOutline, RawSection,
};
use mvo_outline::{GenerationRequest, SectionKind, UserTopic};
use mvo_retrieval::{KnowledgeSource, RetrievalProvider, RetrievalProviderError, RetrievalQuery};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn sample_request() -> GenerationRequest {
    GenerationRequest::new(
        "leadership",
        "workshop",
        "managers give actionable feedback",
        180,
    )
    .with_audience_size(12)
}

pub fn seeded_request() -> GenerationRequest {
    sample_request().with_seed_topics(vec![UserTopic {
        topic_id: "topic-42".to_string(),
        title: "Our feedback playbook".to_string(),
        description: "The existing internal module".to_string(),
        duration_minutes: 20,
    }])
}

pub fn sample_sources(count: usize) -> Vec<KnowledgeSource> {
    (0..count)
        .map(|i| {
            KnowledgeSource::new(
                format!("kb/doc-{i}.md"),
                format!("Reference passage {i} about giving feedback."),
                0.95 - (i as f64) * 0.05,
            )
            .with_category("leadership")
        })
        .collect()
}

/// Deterministic structured response for a prompt
///
/// Echoes every seed topic with its topic id, so provenance mapping is
/// exercised end to end.
pub fn raw_outline_for(prompt: &PromptSpec) -> RawOutline {
    let request = &prompt.request;
    let mut sections = vec![RawSection {
        kind: SectionKind::Opener,
        title: "Welcome".to_string(),
        duration_minutes: 10,
        description: String::new(),
        objectives: Vec::new(),
        topic_id: None,
    }];

    for topic in &request.seed_topics {
        sections.push(RawSection {
            kind: SectionKind::Topic,
            title: topic.title.clone(),
            duration_minutes: topic.duration_minutes,
            description: topic.description.clone(),
            objectives: Vec::new(),
            topic_id: Some(topic.topic_id.clone()),
        });
    }

    let used: u32 = sections.iter().map(|s| s.duration_minutes).sum::<u32>() + 10;
    sections.push(RawSection {
        kind: SectionKind::Topic,
        title: "Core material".to_string(),
        duration_minutes: request.duration_minutes.saturating_sub(used).max(10),
        description: String::new(),
        objectives: vec!["Apply the model in conversation".to_string()],
        topic_id: None,
    });
    sections.push(RawSection {
        kind: SectionKind::Closing,
        title: "Wrap-up".to_string(),
        duration_minutes: 10,
        description: String::new(),
        objectives: Vec::new(),
        topic_id: None,
    });

    RawOutline {
        title: format!("{} session", request.category),
        description: request.desired_outcome.clone(),
        total_duration_minutes: None,
        sections,
    }
}

/// Behavior of a [`ScriptedGenerator`]
#[derive(Debug, Clone)]
pub enum GenerationScript {
    /// Every call succeeds
    Succeed,
    /// Every call fails with the given status
    Fail { status: u16 },
    /// Calls at these weights fail; everything else (the weight-0 fallback
    /// included) succeeds
    FailAtWeights { weights: Vec<f64>, status: u16 },
    /// Every call sleeps before succeeding
    Delay { delay: Duration },
    /// Calls at these weights sleep before succeeding
    DelayAtWeights { weights: Vec<f64>, delay: Duration },
}

/// Generative provider double driven by a fixed script
pub struct ScriptedGenerator {
    script: GenerationScript,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(script: GenerationScript) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls observed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn weight_matches(weights: &[f64], weight: f64) -> bool {
    weights.iter().any(|w| (w - weight).abs() < 1e-9)
}

#[async_trait::async_trait]
impl GenerativeProvider for ScriptedGenerator {
    async fn generate(&self, prompt: PromptSpec) -> Result<RawOutline, GenerativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.script {
            GenerationScript::Succeed => Ok(raw_outline_for(&prompt)),
            GenerationScript::Fail { status } => Err(GenerativeError::Provider {
                status: *status,
                message: "scripted failure".to_string(),
            }),
            GenerationScript::FailAtWeights { weights, status } => {
                if weight_matches(weights, prompt.rag_weight) {
                    Err(GenerativeError::Provider {
                        status: *status,
                        message: "scripted weight failure".to_string(),
                    })
                } else {
                    Ok(raw_outline_for(&prompt))
                }
            }
            GenerationScript::Delay { delay } => {
                tokio::time::sleep(*delay).await;
                Ok(raw_outline_for(&prompt))
            }
            GenerationScript::DelayAtWeights { weights, delay } => {
                if weight_matches(weights, prompt.rag_weight) {
                    tokio::time::sleep(*delay).await;
                }
                Ok(raw_outline_for(&prompt))
            }
        }
    }
}

/// Behavior of a [`ScriptedRetrieval`]
#[derive(Debug, Clone)]
pub enum RetrievalScript {
    /// Return these sources
    Sources(Vec<KnowledgeSource>),
    /// Return nothing
    Empty,
    /// Fail with the given status
    Fail { status: u16 },
    /// Sleep, then return these sources
    Delay {
        delay: Duration,
        sources: Vec<KnowledgeSource>,
    },
}

/// Retrieval provider double driven by a fixed script
pub struct ScriptedRetrieval {
    script: RetrievalScript,
    calls: AtomicUsize,
}

impl ScriptedRetrieval {
    pub fn new(script: RetrievalScript) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of search calls observed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RetrievalProvider for ScriptedRetrieval {
    async fn search(
        &self,
        _query: RetrievalQuery,
    ) -> Result<Vec<KnowledgeSource>, RetrievalProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.script {
            RetrievalScript::Sources(sources) => Ok(sources.clone()),
            RetrievalScript::Empty => Ok(Vec::new()),
            RetrievalScript::Fail { status } => Err(RetrievalProviderError::Provider {
                status: *status,
                message: "scripted retrieval failure".to_string(),
            }),
            RetrievalScript::Delay { delay, sources } => {
                tokio::time::sleep(*delay).await;
                Ok(sources.clone())
            }
        }
    }
}
