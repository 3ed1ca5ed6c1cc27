use std::sync::Arc;

use engage_core::EngagementConfig;
use storage::repository::Storage;

use crate::Clock;
use crate::engagement_service::EngagementService;
use crate::error::AppServicesError;
use crate::insights_service::InsightsService;
use crate::profile_service::ProfileService;
use crate::recommendation_service::RecommendationService;
use crate::tracking_service::TrackingService;

/// Assembles caller-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    engagement: Arc<EngagementService>,
    recommendations: Arc<RecommendationService>,
    insights: Arc<InsightsService>,
    profiles: Arc<ProfileService>,
    tracking: Arc<TrackingService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the configuration is invalid or storage
    /// initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: &EngagementConfig,
    ) -> Result<Self, AppServicesError> {
        config.validate()?;
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, clock, config)
    }

    /// Build services over an existing storage aggregate.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Config` if the configuration is invalid.
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        config: &EngagementConfig,
    ) -> Result<Self, AppServicesError> {
        let engagement = Arc::new(EngagementService::new(
            clock,
            config,
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.feedback),
        )?);
        let recommendations = Arc::new(RecommendationService::new(
            config,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.catalog),
        ));
        let insights = Arc::new(InsightsService::new(
            clock,
            config,
            Arc::clone(&storage.sessions),
            Arc::clone(&engagement),
            Arc::clone(&recommendations),
        ));
        let profiles = Arc::new(ProfileService::new(
            clock,
            config,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.feedback),
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.catalog),
        ));
        let tracking = Arc::new(TrackingService::new(
            clock,
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.progress),
        ));

        Ok(Self {
            engagement,
            recommendations,
            insights,
            profiles,
            tracking,
        })
    }

    #[must_use]
    pub fn engagement(&self) -> Arc<EngagementService> {
        Arc::clone(&self.engagement)
    }

    #[must_use]
    pub fn recommendations(&self) -> Arc<RecommendationService> {
        Arc::clone(&self.recommendations)
    }

    #[must_use]
    pub fn insights(&self) -> Arc<InsightsService> {
        Arc::clone(&self.insights)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }

    #[must_use]
    pub fn tracking(&self) -> Arc<TrackingService> {
        Arc::clone(&self.tracking)
    }
}
