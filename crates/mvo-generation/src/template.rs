//! Template fallback outline
//!
//! Last link of the per-slot fallback chain: a fixed structural skeleton
//! with no generative or retrieved content, scaled to the requested
//! duration. A slot is never left empty.

use mvo_outline::{GenerationRequest, Outline, Section, SectionKind};
use once_cell::sync::Lazy;

/// Skeleton entry: kind, title, description, share of total duration
struct SkeletonSlot {
    kind: SectionKind,
    title: &'static str,
    description: &'static str,
    share: f64,
}

static SKELETON: Lazy<Vec<SkeletonSlot>> = Lazy::new(|| {
    vec![
        SkeletonSlot {
            kind: SectionKind::Opener,
            title: "Welcome and goals",
            description: "Introductions, agenda walkthrough, expectations",
            share: 0.10,
        },
        SkeletonSlot {
            kind: SectionKind::Topic,
            title: "Core concepts",
            description: "Present the session's central ideas",
            share: 0.35,
        },
        SkeletonSlot {
            kind: SectionKind::Exercise,
            title: "Guided practice",
            description: "Participants apply the concepts in small groups",
            share: 0.30,
        },
        SkeletonSlot {
            kind: SectionKind::Discussion,
            title: "Group reflection",
            description: "Share observations and open questions",
            share: 0.15,
        },
        SkeletonSlot {
            kind: SectionKind::Closing,
            title: "Wrap-up and next steps",
            description: "Summarize takeaways and agree on follow-ups",
            share: 0.10,
        },
    ]
});

/// Default duration when the request carries none
const FALLBACK_DURATION_MINUTES: u32 = 60;

/// Build the template outline for a request
///
/// Durations follow the skeleton's shares of the requested total; the final
/// section absorbs the rounding remainder so the outline total matches the
/// request exactly.
#[must_use]
pub fn template_outline(request: &GenerationRequest) -> Outline {
    let total = if request.duration_minutes == 0 {
        FALLBACK_DURATION_MINUTES
    } else {
        request.duration_minutes
    };

    let mut outline = Outline::new(
        format!("{} session plan", capitalize(&request.category)),
        format!(
            "A structured {} covering: {}",
            request.session_kind, request.desired_outcome
        ),
    );

    let mut assigned = 0u32;
    let last = SKELETON.len() - 1;
    for (idx, slot) in SKELETON.iter().enumerate() {
        let minutes = if idx == last {
            total.saturating_sub(assigned)
        } else {
            ((f64::from(total) * slot.share).round() as u32).max(1)
        };
        assigned += minutes;

        outline.push_section(
            Section::generated(slot.kind, slot.title, minutes).with_description(slot.description),
        );
    }

    outline
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvo_outline::Provenance;

    fn request(minutes: u32) -> GenerationRequest {
        GenerationRequest::new("leadership", "workshop", "actionable feedback", minutes)
    }

    #[test]
    fn template_total_matches_request() {
        for minutes in [30, 60, 90, 120, 175, 240] {
            let outline = template_outline(&request(minutes));
            assert_eq!(outline.total_duration(), minutes, "for {minutes} minutes");
        }
    }

    #[test]
    fn template_has_full_skeleton() {
        let outline = template_outline(&request(120));
        assert_eq!(outline.section_count(), 5);
        assert_eq!(outline.sections[0].kind, SectionKind::Opener);
        assert_eq!(outline.sections[4].kind, SectionKind::Closing);
    }

    #[test]
    fn template_sections_are_generated_provenance() {
        let outline = template_outline(&request(90));
        assert!(outline
            .sections
            .iter()
            .all(|s| s.provenance() == Provenance::Generated));
    }

    #[test]
    fn template_zero_duration_request_uses_fallback() {
        let outline = template_outline(&request(0));
        assert_eq!(outline.total_duration(), FALLBACK_DURATION_MINUTES);
    }
}
