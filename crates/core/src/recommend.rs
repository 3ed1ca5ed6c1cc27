//! Next-lesson and review-lesson selection.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::config::EngagementConfig;
use crate::model::{AdaptiveProfile, LessonId, LessonRef, ProgressRecord, UserId};

//
// ─── CATALOG FILTER ────────────────────────────────────────────────────────────
//

/// Query handed to the lesson catalog.
///
/// An empty `languages` list means "any language".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogFilter {
    pub exclude_ids: BTreeSet<LessonId>,
    pub max_age_group: u32,
    pub languages: Vec<String>,
}

impl CatalogFilter {
    /// Lessons at or below the learner's level, in their preferred
    /// languages, that they have not completed yet.
    #[must_use]
    pub fn for_profile(
        profile: &AdaptiveProfile,
        completed: impl IntoIterator<Item = LessonId>,
    ) -> Self {
        Self {
            exclude_ids: completed.into_iter().collect(),
            max_age_group: profile.current_level,
            languages: profile.preferences.topic_preferences.clone(),
        }
    }

    #[must_use]
    pub fn matches(&self, lesson: &LessonRef) -> bool {
        lesson.age_group <= self.max_age_group
            && !self.exclude_ids.contains(&lesson.id)
            && (self.languages.is_empty() || self.languages.iter().any(|l| *l == lesson.language))
    }
}

/// First `limit` lessons of `catalog` that pass `filter`, in catalog order.
#[must_use]
pub fn select_next_lessons(
    catalog: impl IntoIterator<Item = LessonRef>,
    filter: &CatalogFilter,
    limit: usize,
) -> Vec<LessonRef> {
    catalog
        .into_iter()
        .filter(|lesson| filter.matches(lesson))
        .take(limit)
        .collect()
}

//
// ─── RECOMMENDATION SET ────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationSet {
    pub next_lessons: Vec<LessonRef>,
    pub review_lessons: Vec<LessonId>,
    pub suggested_topics: Vec<String>,
}

/// Every lesson the learner has at least one attempt on.
#[must_use]
pub fn completed_lesson_ids(progress: &[ProgressRecord]) -> BTreeSet<LessonId> {
    progress.iter().map(ProgressRecord::lesson_id).collect()
}

/// Lessons of every attempt below `threshold`, in input order, repeats kept.
#[must_use]
pub fn review_lessons(progress: &[ProgressRecord], threshold: u8) -> Vec<LessonId> {
    progress
        .iter()
        .filter(|p| p.is_below(threshold))
        .map(ProgressRecord::lesson_id)
        .collect()
}

fn distinct_in_order(items: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

//
// ─── RECOMMENDER ───────────────────────────────────────────────────────────────
//

/// Stateless policy that turns a profile plus attempt history into a
/// catalog query and, once the catalog answered, a recommendation set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommender {
    review_threshold: u8,
    limit: usize,
    default_level: u32,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::from_config(&EngagementConfig::default())
    }
}

impl Recommender {
    #[must_use]
    pub fn from_config(config: &EngagementConfig) -> Self {
        Self {
            review_threshold: config.weak_score_threshold,
            limit: config.recommendation_limit,
            default_level: config.default_level,
        }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The stored profile, or a default one for learners without a record.
    #[must_use]
    pub fn resolve_profile(
        &self,
        user_id: UserId,
        stored: Option<AdaptiveProfile>,
    ) -> AdaptiveProfile {
        stored.unwrap_or_else(|| AdaptiveProfile::fallback(user_id, self.default_level))
    }

    #[must_use]
    pub fn catalog_filter(
        &self,
        profile: &AdaptiveProfile,
        progress: &[ProgressRecord],
    ) -> CatalogFilter {
        CatalogFilter::for_profile(profile, completed_lesson_ids(progress))
    }

    /// Combine the catalog answer with review candidates and profile topics.
    #[must_use]
    pub fn assemble(
        &self,
        profile: &AdaptiveProfile,
        progress: &[ProgressRecord],
        candidates: Vec<LessonRef>,
    ) -> RecommendationSet {
        let next_lessons: Vec<LessonRef> = candidates.into_iter().take(self.limit).collect();
        let set = RecommendationSet {
            next_lessons,
            review_lessons: review_lessons(progress, self.review_threshold),
            suggested_topics: distinct_in_order(&profile.weaknesses),
        };
        debug!(
            user = %profile.user_id,
            next = set.next_lessons.len(),
            review = set.review_lessons.len(),
            "assembled recommendations"
        );
        set
    }

    /// Full recommendation pass over an in-memory catalog.
    #[must_use]
    pub fn recommend(
        &self,
        profile: &AdaptiveProfile,
        progress: &[ProgressRecord],
        catalog: impl IntoIterator<Item = LessonRef>,
    ) -> RecommendationSet {
        let filter = self.catalog_filter(profile, progress);
        let candidates = select_next_lessons(catalog, &filter, self.limit);
        self.assemble(profile, progress, candidates)
    }
}
