use std::sync::Arc;

use engage_core::engagement::{ActivityWindow, EngagementEngine, EngagementMetrics};
use engage_core::model::UserId;
use engage_core::{ConfigError, EngagementConfig, TimeWindow};
use storage::repository::{FeedbackRepository, ProgressRepository, SessionRepository};

use crate::Clock;
use crate::error::EngagementError;

/// Computes windowed engagement metrics from the record store.
#[derive(Clone)]
pub struct EngagementService {
    clock: Clock,
    window_days: u32,
    engine: EngagementEngine,
    sessions: Arc<dyn SessionRepository>,
    progress: Arc<dyn ProgressRepository>,
    feedback: Arc<dyn FeedbackRepository>,
}

impl EngagementService {
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` does not validate.
    pub fn new(
        clock: Clock,
        config: &EngagementConfig,
        sessions: Arc<dyn SessionRepository>,
        progress: Arc<dyn ProgressRepository>,
        feedback: Arc<dyn FeedbackRepository>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            clock,
            window_days: config.window_days,
            engine: EngagementEngine::new(config)?,
            sessions,
            progress,
            feedback,
        })
    }

    /// Trailing window ending at the clock's current time.
    #[must_use]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::trailing_days(self.clock.now(), self.window_days)
    }

    /// Engagement metrics over the trailing window.
    ///
    /// Records stamped after the clock's current time are not counted.
    ///
    /// A user with no records in the window gets all-zero metrics.
    ///
    /// # Errors
    ///
    /// Returns `EngagementError::Storage` unchanged if any fetch fails.
    pub async fn get_engagement_metrics(
        &self,
        user_id: UserId,
    ) -> Result<EngagementMetrics, EngagementError> {
        let window = self.window();
        let since = Some(window.start());

        let mut sessions = self.sessions.fetch_sessions(user_id, since).await?;
        let mut progress = self.progress.fetch_progress(user_id, since).await?;
        let mut feedback = self.feedback.fetch_feedback(user_id, since).await?;

        sessions.retain(|s| window.contains(s.started_at()));
        progress.retain(|p| window.contains(p.completed_at()));
        feedback.retain(|f| window.contains(f.created_at()));

        Ok(self.engine.compute(ActivityWindow {
            sessions: &sessions,
            progress: &progress,
            feedback: &feedback,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use engage_core::model::{Difficulty, FeedbackRecord, LessonId, ProgressRecord, SessionRecord};
    use engage_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository, config: &EngagementConfig) -> EngagementService {
        EngagementService::new(
            Clock::fixed(fixed_now()),
            config,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn records_outside_the_window_are_ignored() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(1);
        let recent = fixed_now() - Duration::days(1);
        let stale = fixed_now() - Duration::days(8);

        for start in [recent, stale] {
            let session =
                SessionRecord::new(user, start, Some(start + Duration::minutes(30)), Vec::new())
                    .unwrap();
            repo.append_session(&session).await.unwrap();
        }
        let old_attempt =
            ProgressRecord::new(user, LessonId::new(1), 40, stale, 60, 4).unwrap();
        repo.append_progress(&old_attempt).await.unwrap();

        let svc = service(&repo, &EngagementConfig::default());
        let metrics = svc.get_engagement_metrics(user).await.unwrap();
        assert_eq!(metrics.sessions_count, 1);
        assert_eq!(metrics.completed_lessons_count, 0);
        assert!(metrics.weak_areas.is_empty());
        assert_eq!(metrics.last_active_at, Some(recent + Duration::minutes(30)));
    }

    #[tokio::test]
    async fn records_after_now_are_ignored() {
        let repo = InMemoryRepository::new();
        let user = UserId::new(1);
        let later = fixed_now() + Duration::days(30);

        let session =
            SessionRecord::new(user, later, Some(later + Duration::hours(1)), Vec::new()).unwrap();
        repo.append_session(&session).await.unwrap();
        let attempt = ProgressRecord::new(user, LessonId::new(2), 50, later, 60, 1).unwrap();
        repo.append_progress(&attempt).await.unwrap();
        let feedback = FeedbackRecord::new(
            user,
            LessonId::new(2),
            3,
            Difficulty::JustRight,
            None,
            later,
        )
        .unwrap();
        repo.append_feedback(&feedback).await.unwrap();

        let svc = service(&repo, &EngagementConfig::default());
        let metrics = svc.get_engagement_metrics(user).await.unwrap();
        assert_eq!(metrics.sessions_count, 0);
        assert_eq!(metrics.completed_lessons_count, 0);
        assert_eq!(metrics.feedback_count, 0);
        assert_eq!(metrics.last_active_at, None);
        assert_eq!(metrics.engagement_score, 0.0);
    }

    #[tokio::test]
    async fn window_length_follows_config() {
        let repo = InMemoryRepository::new();
        let config = EngagementConfig {
            window_days: 30,
            ..EngagementConfig::default()
        };
        let svc = service(&repo, &config);
        assert_eq!(svc.window().start(), fixed_now() - Duration::days(30));
        assert_eq!(svc.window().end(), fixed_now());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let repo = InMemoryRepository::new();
        let config = EngagementConfig {
            window_days: 0,
            ..EngagementConfig::default()
        };
        let result = EngagementService::new(
            Clock::fixed(fixed_now()),
            &config,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        assert!(matches!(result, Err(ConfigError::ZeroWindowDays)));
    }
}
