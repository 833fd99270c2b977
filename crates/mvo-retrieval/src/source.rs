//! Retrieved knowledge snippets

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One snippet retrieved from the knowledge base
///
/// Read-only for the duration of one request; the engine never caches
/// sources across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSource {
    /// Provider-side snippet identifier
    pub id: Uuid,
    /// Filename or origin label of the indexed document
    pub origin: String,
    /// Excerpt text
    pub excerpt: String,
    /// Similarity score in [0, 1]
    pub similarity: f64,
    /// Category tag
    pub category: String,
}

impl KnowledgeSource {
    /// Create a new source
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<String>, excerpt: impl Into<String>, similarity: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin: origin.into(),
            excerpt: excerpt.into(),
            similarity,
            category: String::new(),
        }
    }

    /// With category tag
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serde_roundtrip() {
        let source = KnowledgeSource::new("facilitation.md", "Open with a check-in round", 0.82)
            .with_category("facilitation");
        let json = serde_json::to_string(&source).unwrap();
        let decoded: KnowledgeSource = serde_json::from_str(&json).unwrap();
        assert_eq!(source, decoded);
    }
}
