use std::sync::Arc;

use engage_core::EngagementConfig;
use engage_core::model::UserId;
use engage_core::recommend::{RecommendationSet, Recommender};
use storage::repository::{CatalogRepository, ProfileRepository, ProgressRepository};
use tracing::warn;

use crate::error::RecommendationError;

/// Picks next lessons, review lessons and topics for a learner.
#[derive(Clone)]
pub struct RecommendationService {
    recommender: Recommender,
    progress: Arc<dyn ProgressRepository>,
    profiles: Arc<dyn ProfileRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl RecommendationService {
    #[must_use]
    pub fn new(
        config: &EngagementConfig,
        progress: Arc<dyn ProgressRepository>,
        profiles: Arc<dyn ProfileRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            recommender: Recommender::from_config(config),
            progress,
            profiles,
            catalog,
        }
    }

    /// Recommendations from the learner's profile and full attempt history.
    ///
    /// Learners without a profile are treated as beginners with no
    /// preferences.
    ///
    /// # Errors
    ///
    /// Returns `RecommendationError::Storage` unchanged if any fetch fails.
    pub async fn get_recommendations(
        &self,
        user_id: UserId,
    ) -> Result<RecommendationSet, RecommendationError> {
        let stored = self.profiles.fetch_profile(user_id).await?;
        if stored.is_none() {
            warn!(user = %user_id, "no adaptive profile; using defaults");
        }
        let profile = self.recommender.resolve_profile(user_id, stored);

        let progress = self.progress.fetch_progress(user_id, None).await?;
        let filter = self.recommender.catalog_filter(&profile, &progress);
        let candidates = self
            .catalog
            .fetch_catalog(&filter, self.recommender.limit())
            .await?;

        Ok(self.recommender.assemble(&profile, &progress, candidates))
    }
}
