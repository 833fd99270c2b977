//! Outline sections with explicit provenance
//!
//! A section's origin is recorded once, at construction, in a single
//! [`Provenance`] field. Nothing downstream re-derives origin from flags,
//! title prefixes, or topic links.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique section identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectionId(pub Ulid);

impl SectionId {
    /// Generate new section ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structural role of a section within a session outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Icebreaker / welcome block
    Opener,
    /// Content-delivery block
    Topic,
    /// Hands-on practice block
    Exercise,
    /// Facilitated group discussion
    Discussion,
    /// Scheduled pause
    Break,
    /// Wrap-up and next steps
    Closing,
}

/// Origin of a section's content
///
/// Set exactly once when the section is constructed and carried immutably
/// thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Seeded from a pre-existing user-authored topic
    User,
    /// Produced by the generative model (or the template skeleton)
    Generated,
}

/// Link back to the pre-existing user-authored topic a section came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRef {
    /// Stable topic identifier in the caller's store
    pub topic_id: String,
    /// Topic title at seed time
    pub title: String,
}

/// One ordered block of a session outline
///
/// Immutable once the owning variant has been returned; edits happen
/// downstream, outside this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section ID
    pub id: SectionId,
    /// Structural role
    pub kind: SectionKind,
    /// Zero-based position within the outline
    pub position: u32,
    /// Section title
    pub title: String,
    /// Duration in minutes
    pub duration_minutes: u32,
    /// Section description
    pub description: String,
    /// Optional learning objectives
    pub objectives: Vec<String>,
    /// Link to the seeding user topic, if any
    pub topic_ref: Option<TopicRef>,
    provenance: Provenance,
}

impl Section {
    /// Create a model-generated section
    #[inline]
    #[must_use]
    pub fn generated(kind: SectionKind, title: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            id: SectionId::new(),
            kind,
            position: 0,
            title: title.into(),
            duration_minutes,
            description: String::new(),
            objectives: Vec::new(),
            topic_ref: None,
            provenance: Provenance::Generated,
        }
    }

    /// Create a section seeded from a user-authored topic
    ///
    /// The topic link is mandatory here: user provenance without a source
    /// topic cannot be represented.
    #[inline]
    #[must_use]
    pub fn from_user_topic(
        kind: SectionKind,
        topic: TopicRef,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: SectionId::new(),
            kind,
            position: 0,
            title: topic.title.clone(),
            duration_minutes,
            description: String::new(),
            objectives: Vec::new(),
            topic_ref: Some(topic),
            provenance: Provenance::User,
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With learning objectives
    #[inline]
    #[must_use]
    pub fn with_objectives(mut self, objectives: Vec<String>) -> Self {
        self.objectives = objectives;
        self
    }

    /// With explicit position
    #[inline]
    #[must_use]
    pub fn at_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    /// Section origin
    #[inline]
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Whether this section came from a user-authored topic
    #[inline]
    #[must_use]
    pub fn is_user_authored(&self) -> bool {
        self.provenance == Provenance::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn generated_section_provenance() {
        let section = Section::generated(SectionKind::Topic, "Active listening", 25);
        assert_eq!(section.provenance(), Provenance::Generated);
        assert!(!section.is_user_authored());
        assert!(section.topic_ref.is_none());
    }

    #[test]
    fn user_section_carries_topic_ref() {
        let topic = TopicRef {
            topic_id: "topic-17".to_string(),
            title: "Feedback models".to_string(),
        };
        let section = Section::from_user_topic(SectionKind::Topic, topic, 20);

        assert_eq!(section.provenance(), Provenance::User);
        assert!(section.is_user_authored());
        assert_eq!(section.title, "Feedback models");
        assert_eq!(
            section.topic_ref.as_ref().map(|t| t.topic_id.as_str()),
            Some("topic-17")
        );
    }

    #[test]
    fn section_builder_methods() {
        let section = Section::generated(SectionKind::Exercise, "Role play", 30)
            .with_description("Pairs practice the feedback model")
            .with_objectives(vec!["Apply SBI in conversation".to_string()])
            .at_position(2);

        assert_eq!(section.position, 2);
        assert_eq!(section.objectives.len(), 1);
        assert!(!section.description.is_empty());
    }

    #[test]
    fn section_serde_roundtrip() {
        let section = Section::generated(SectionKind::Opener, "Welcome", 10);
        let json = serde_json::to_string(&section).unwrap();
        let decoded: Section = serde_json::from_str(&json).unwrap();
        assert_eq!(section, decoded);
    }
}
