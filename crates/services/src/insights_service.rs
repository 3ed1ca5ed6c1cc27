use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use engage_core::EngagementConfig;
use engage_core::engagement::EngagementMetrics;
use engage_core::insights::{self, StudyAdvice, WeeklyActivity};
use engage_core::model::UserId;
use engage_core::recommend::RecommendationSet;
use serde::Serialize;
use storage::repository::SessionRepository;

use crate::Clock;
use crate::engagement_service::EngagementService;
use crate::error::InsightsError;
use crate::recommendation_service::RecommendationService;

/// Weekly activity, engagement figures and the advice derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalizedInsights {
    pub weekly_activity: WeeklyActivity,
    pub engagement: EngagementMetrics,
    pub advice: StudyAdvice,
}

/// Recommendations bundled with activity insights and the next review time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalizedContent {
    pub recommendations: RecommendationSet,
    pub insights: WeeklyActivity,
    pub next_review_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct InsightsService {
    clock: Clock,
    insight_days: usize,
    study_time_bonus_minutes: f64,
    milestone_step: u32,
    review_interval: Duration,
    sessions: Arc<dyn SessionRepository>,
    engagement: Arc<EngagementService>,
    recommendations: Arc<RecommendationService>,
}

impl InsightsService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: &EngagementConfig,
        sessions: Arc<dyn SessionRepository>,
        engagement: Arc<EngagementService>,
        recommendations: Arc<RecommendationService>,
    ) -> Self {
        Self {
            clock,
            insight_days: config.insight_days,
            study_time_bonus_minutes: config.study_time_bonus_minutes,
            milestone_step: config.milestone_step,
            review_interval: Duration::hours(i64::from(config.review_interval_hours)),
            sessions,
            engagement,
            recommendations,
        }
    }

    /// Per-day totals for the learner's most recent active days.
    ///
    /// # Errors
    ///
    /// Returns `InsightsError::Storage` if sessions cannot be fetched.
    pub async fn weekly_activity(&self, user_id: UserId) -> Result<WeeklyActivity, InsightsError> {
        let sessions = self.sessions.fetch_sessions(user_id, None).await?;
        Ok(insights::weekly_activity(&sessions, self.insight_days))
    }

    /// # Errors
    ///
    /// Returns `InsightsError` if any underlying fetch fails.
    pub async fn personalized_insights(
        &self,
        user_id: UserId,
    ) -> Result<PersonalizedInsights, InsightsError> {
        let weekly_activity = self.weekly_activity(user_id).await?;
        let engagement = self.engagement.get_engagement_metrics(user_id).await?;
        let advice = insights::study_advice(
            &engagement,
            self.study_time_bonus_minutes,
            self.milestone_step,
        );
        Ok(PersonalizedInsights {
            weekly_activity,
            engagement,
            advice,
        })
    }

    /// # Errors
    ///
    /// Returns `InsightsError` if any underlying fetch fails.
    pub async fn personalized_content(
        &self,
        user_id: UserId,
    ) -> Result<PersonalizedContent, InsightsError> {
        let recommendations = self.recommendations.get_recommendations(user_id).await?;
        let insights = self.weekly_activity(user_id).await?;
        Ok(PersonalizedContent {
            recommendations,
            insights,
            next_review_at: self.clock.now() + self.review_interval,
        })
    }
}
