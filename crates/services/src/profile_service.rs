use std::sync::Arc;

use engage_core::EngagementConfig;
use engage_core::model::{
    AdaptiveProfile, Difficulty, FeedbackRecord, LearningPreferences, LessonId, UserId,
};
use engage_core::strengths::{self, StrengthThresholds};
use serde::Deserialize;
use storage::repository::{
    CatalogRepository, FeedbackRepository, ProfileRepository, ProgressRepository,
};
use tracing::info;

use crate::Clock;
use crate::error::ProfileServiceError;

/// Replacement values for a learner's adaptive profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LearningPath {
    pub current_level: u32,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub preferences: LearningPreferences,
}

/// Writes to the adaptive profile: feedback intake, strength refresh and
/// learning-path edits.
#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    default_level: u32,
    thresholds: StrengthThresholds,
    progress: Arc<dyn ProgressRepository>,
    feedback: Arc<dyn FeedbackRepository>,
    profiles: Arc<dyn ProfileRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: &EngagementConfig,
        progress: Arc<dyn ProgressRepository>,
        feedback: Arc<dyn FeedbackRepository>,
        profiles: Arc<dyn ProfileRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            clock,
            default_level: config.default_level,
            thresholds: StrengthThresholds::from_config(config),
            progress,
            feedback,
            profiles,
            catalog,
        }
    }

    /// Store feedback on a lesson, then refresh the learner's strengths.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Feedback` for an invalid rating.
    /// Returns `ProfileServiceError::Storage` if persistence fails.
    pub async fn submit_feedback(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        rating: u8,
        difficulty: Difficulty,
        comments: Option<String>,
    ) -> Result<FeedbackRecord, ProfileServiceError> {
        let record = FeedbackRecord::new(
            user_id,
            lesson_id,
            rating,
            difficulty,
            comments,
            self.clock.now(),
        )?;
        self.feedback.append_feedback(&record).await?;
        self.refresh_strengths(user_id).await?;
        Ok(record)
    }

    /// Re-derive strengths and weaknesses from every attempt the learner made.
    ///
    /// Creates a default profile when the learner has none.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if a fetch or the upsert fails.
    pub async fn refresh_strengths(
        &self,
        user_id: UserId,
    ) -> Result<AdaptiveProfile, ProfileServiceError> {
        let profile = self
            .profiles
            .fetch_profile(user_id)
            .await?
            .unwrap_or_else(|| AdaptiveProfile::fallback(user_id, self.default_level));

        let progress = self.progress.fetch_progress(user_id, None).await?;
        let lessons = self
            .catalog
            .fetch_lessons(&strengths::referenced_lessons(&progress))
            .await?;

        let refreshed = strengths::refresh_profile(profile, &progress, &lessons, self.thresholds);
        self.profiles.upsert_profile(&refreshed).await?;
        Ok(refreshed)
    }

    /// Overwrite level, strengths, weaknesses and preferences.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if the upsert fails.
    pub async fn update_learning_path(
        &self,
        user_id: UserId,
        path: LearningPath,
    ) -> Result<AdaptiveProfile, ProfileServiceError> {
        let profile = AdaptiveProfile {
            user_id,
            current_level: path.current_level,
            strengths: path.strengths,
            weaknesses: path.weaknesses,
            preferences: path.preferences,
        };
        self.profiles.upsert_profile(&profile).await?;
        info!(user = %user_id, level = profile.current_level, "learning path updated");
        Ok(profile)
    }
}
