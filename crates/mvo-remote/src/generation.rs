//! HTTP generative provider
//!
//! `POST {base}/generate` against an outline-generation service. The slot's
//! retrieval weight also drives the sampling temperature: creative slots run
//! hotter than knowledge-driven ones.

use crate::config::{build_client, RemoteConfig, RemoteError};
use mvo_generation::{GenerativeError, GenerativeProvider, PromptSpec, RawOutline};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct GenerateRequestBody<'a> {
    model: Option<&'a str>,
    persona: &'a str,
    instructions: &'a str,
    context: Vec<PassageBody<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct PassageBody<'a> {
    origin: &'a str,
    excerpt: &'a str,
}

/// Sampling temperature for a retrieval weight
///
/// Weight 1.0 maps to 0.2 (stay close to the sources), weight 0.0 to 0.8
/// (free-form design).
#[inline]
#[must_use]
pub fn temperature_for_weight(rag_weight: f64) -> f64 {
    0.2 + (1.0 - rag_weight.clamp(0.0, 1.0)) * 0.6
}

/// Generative provider backed by an HTTP outline-generation service
#[derive(Debug, Clone)]
pub struct HttpGenerativeProvider {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpGenerativeProvider {
    /// Create a provider for a remote configuration
    ///
    /// # Errors
    /// Returns [`RemoteError`] if the HTTP client cannot be constructed.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> GenerativeError {
        if err.is_timeout() {
            GenerativeError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            GenerativeError::Transport(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl GenerativeProvider for HttpGenerativeProvider {
    async fn generate(&self, prompt: PromptSpec) -> Result<RawOutline, GenerativeError> {
        let body = GenerateRequestBody {
            model: self.config.model.as_deref(),
            persona: &prompt.persona,
            instructions: &prompt.structural_instructions,
            context: prompt
                .context
                .iter()
                .map(|p| PassageBody {
                    origin: &p.origin,
                    excerpt: &p.excerpt,
                })
                .collect(),
            temperature: temperature_for_weight(prompt.rag_weight),
        };

        let mut request = self
            .client
            .post(self.config.endpoint("generate"))
            .json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let outline: RawOutline = response
            .json()
            .await
            .map_err(|e| GenerativeError::Malformed(e.to_string()))?;

        tracing::debug!(sections = outline.sections.len(), "outline response decoded");
        Ok(outline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvo_generation::ContextPassage;
    use mvo_outline::GenerationRequest;

    #[test]
    fn temperature_scales_inversely_with_weight() {
        assert!((temperature_for_weight(1.0) - 0.2).abs() < f64::EPSILON);
        assert!((temperature_for_weight(0.0) - 0.8).abs() < f64::EPSILON);
        assert!(temperature_for_weight(0.33) > temperature_for_weight(0.66));
    }

    #[test]
    fn request_body_shape() {
        let prompt = PromptSpec {
            request: GenerationRequest::new("leadership", "workshop", "feedback", 120),
            rag_weight: 1.0,
            structural_instructions: "Design a session".to_string(),
            persona: "curriculum designer".to_string(),
            context: vec![ContextPassage {
                origin: "kb/doc.md".to_string(),
                excerpt: "passage".to_string(),
            }],
        };

        let body = GenerateRequestBody {
            model: Some("outline-large"),
            persona: &prompt.persona,
            instructions: &prompt.structural_instructions,
            context: prompt
                .context
                .iter()
                .map(|p| PassageBody {
                    origin: &p.origin,
                    excerpt: &p.excerpt,
                })
                .collect(),
            temperature: temperature_for_weight(prompt.rag_weight),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "outline-large");
        assert_eq!(json["context"][0]["origin"], "kb/doc.md");
        assert_eq!(json["temperature"], 0.2);
    }
}
