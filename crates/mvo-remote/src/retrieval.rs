//! HTTP retrieval provider
//!
//! `POST {base}/search` against a semantic-search service. Wire DTOs stay in
//! this module; the engine only ever sees domain types.

use crate::config::{build_client, RemoteConfig, RemoteError};
use mvo_retrieval::{KnowledgeSource, RetrievalProvider, RetrievalProviderError, RetrievalQuery};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct SearchRequestBody<'a> {
    query: &'a str,
    category: &'a str,
    topics: &'a [String],
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    sources: Vec<SourceDto>,
}

#[derive(Debug, Deserialize)]
struct SourceDto {
    id: Option<Uuid>,
    origin: String,
    excerpt: String,
    similarity: f64,
    #[serde(default)]
    category: String,
}

impl From<SourceDto> for KnowledgeSource {
    fn from(dto: SourceDto) -> Self {
        Self {
            id: dto.id.unwrap_or_else(Uuid::new_v4),
            origin: dto.origin,
            excerpt: dto.excerpt,
            similarity: dto.similarity,
            category: dto.category,
        }
    }
}

/// Retrieval provider backed by an HTTP semantic-search service
#[derive(Debug, Clone)]
pub struct HttpRetrievalProvider {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRetrievalProvider {
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

    fn map_transport(&self, err: reqwest::Error) -> RetrievalProviderError {
        if err.is_timeout() {
            RetrievalProviderError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            RetrievalProviderError::Transport(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl RetrievalProvider for HttpRetrievalProvider {
    async fn search(
        &self,
        query: RetrievalQuery,
    ) -> Result<Vec<KnowledgeSource>, RetrievalProviderError> {
        let body = SearchRequestBody {
            query: &query.outcome,
            category: &query.category,
            topics: &query.topics,
            limit: query.limit,
        };

        let mut request = self.client.post(self.config.endpoint("search")).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RetrievalProviderError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let decoded: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| RetrievalProviderError::Decode(e.to_string()))?;

        tracing::debug!(sources = decoded.sources.len(), "search response decoded");
        Ok(decoded.sources.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let topics = vec!["feedback".to_string()];
        let body = SearchRequestBody {
            query: "better feedback",
            category: "leadership",
            topics: &topics,
            limit: 5,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["query"], "better feedback");
        assert_eq!(json["limit"], 5);
        assert_eq!(json["topics"][0], "feedback");
    }

    #[test]
    fn response_decodes_without_source_ids() {
        let json = r#"{
            "sources": [
                {"origin": "kb/doc.md", "excerpt": "passage", "similarity": 0.8}
            ]
        }"#;

        let decoded: SearchResponseBody = serde_json::from_str(json).unwrap();
        let source: KnowledgeSource = decoded.sources.into_iter().next().unwrap().into();
        assert_eq!(source.origin, "kb/doc.md");
        assert!(source.category.is_empty());
    }
}
