//! Session outline: an ordered list of sections with an aggregate duration

use crate::section::Section;
use serde::{Deserialize, Serialize};

/// An ordered session outline
///
/// Sections are kept in position order. The outline may carry a stated total
/// duration for the case where sections were produced without individual
/// durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Suggested session title
    pub title: String,
    /// Suggested session description
    pub description: String,
    /// Ordered sections
    pub sections: Vec<Section>,
    /// Stated total duration in minutes, used when sections carry none
    pub stated_duration_minutes: Option<u32>,
}

impl Outline {
    /// Create an empty outline
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            sections: Vec::new(),
            stated_duration_minutes: None,
        }
    }

    /// With a stated total duration
    #[inline]
    #[must_use]
    pub fn with_stated_duration(mut self, minutes: u32) -> Self {
        self.stated_duration_minutes = Some(minutes);
        self
    }

    /// Append a section, assigning it the next position
    #[inline]
    pub fn push_section(&mut self, mut section: Section) {
        section.position = self.sections.len() as u32;
        self.sections.push(section);
    }

    /// Append a section (builder form)
    #[inline]
    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.push_section(section);
        self
    }

    /// Number of sections
    #[inline]
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Whether the outline has no sections
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total duration in minutes
    ///
    /// Sum of section durations; falls back to the stated total when the
    /// sections carry no durations of their own.
    #[inline]
    #[must_use]
    pub fn total_duration(&self) -> u32 {
        let summed: u32 = self.sections.iter().map(|s| s.duration_minutes).sum();
        if summed == 0 {
            self.stated_duration_minutes.unwrap_or(0)
        } else {
            summed
        }
    }

    /// Total duration of user-authored sections in minutes
    #[inline]
    #[must_use]
    pub fn user_duration(&self) -> u32 {
        self.sections
            .iter()
            .filter(|s| s.is_user_authored())
            .map(|s| s.duration_minutes)
            .sum()
    }
}
