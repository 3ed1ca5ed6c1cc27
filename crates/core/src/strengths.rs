//! Strength/weakness derivation from graded attempts.

use std::collections::{BTreeSet, HashMap};

use tracing::info;

use crate::config::EngagementConfig;
use crate::model::{AdaptiveProfile, LessonId, LessonRef, ProgressRecord};

/// Score bands that classify a lesson category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthThresholds {
    /// Attempts at or above this are strengths.
    pub strength: u8,
    /// Attempts strictly below this are weaknesses.
    pub weakness: u8,
}

impl Default for StrengthThresholds {
    fn default() -> Self {
        Self::from_config(&EngagementConfig::default())
    }
}

impl StrengthThresholds {
    #[must_use]
    pub fn from_config(config: &EngagementConfig) -> Self {
        Self {
            strength: config.strength_threshold,
            weakness: config.weakness_threshold,
        }
    }
}

fn push_distinct(into: &mut Vec<String>, value: &str) {
    if !into.iter().any(|v| v == value) {
        into.push(value.to_owned());
    }
}

/// Recompute a profile's strengths and extend its weaknesses.
///
/// Strengths are replaced by the distinct categories of strong attempts.
/// Weak categories are added to the existing weakness list; nothing is ever
/// removed from it. Attempts on lessons that are missing from `lessons`, or
/// that have no category, are skipped.
#[must_use]
pub fn refresh_profile(
    mut profile: AdaptiveProfile,
    progress: &[ProgressRecord],
    lessons: &[LessonRef],
    thresholds: StrengthThresholds,
) -> AdaptiveProfile {
    let categories: HashMap<LessonId, &str> = lessons
        .iter()
        .filter_map(|l| l.category.as_deref().map(|c| (l.id, c)))
        .collect();

    let mut strengths = Vec::new();
    for attempt in progress {
        let Some(category) = categories.get(&attempt.lesson_id()) else {
            continue;
        };
        if attempt.score() >= thresholds.strength {
            push_distinct(&mut strengths, category);
        }
        if attempt.is_below(thresholds.weakness) {
            push_distinct(&mut profile.weaknesses, category);
        }
    }
    profile.strengths = strengths;

    info!(
        user = %profile.user_id,
        strengths = profile.strengths.len(),
        weaknesses = profile.weaknesses.len(),
        "refreshed adaptive profile"
    );
    profile
}

/// Lesson ids referenced by `progress`, without repeats.
#[must_use]
pub fn referenced_lessons(progress: &[ProgressRecord]) -> Vec<LessonId> {
    progress
        .iter()
        .map(ProgressRecord::lesson_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
