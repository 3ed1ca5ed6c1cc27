use std::sync::Arc;

use chrono::{DateTime, Utc};
use engage_core::model::{Activity, LessonId, ProgressRecord, SessionRecord, UserId};
use storage::repository::{ProgressRepository, SessionRepository};
use tracing::debug;

use crate::Clock;
use crate::error::TrackingError;

/// A graded lesson attempt as reported by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonAttempt {
    pub lesson_id: LessonId,
    pub score: u32,
    pub time_spent_seconds: u32,
    pub mistakes: u32,
}

/// Appends learner activity to the record store.
#[derive(Clone)]
pub struct TrackingService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl TrackingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            sessions,
            progress,
        }
    }

    /// Record a session that started at `started_at` and ends now.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Session` if `started_at` lies in the future.
    /// Returns `TrackingError::Storage` if persistence fails.
    pub async fn track_session(
        &self,
        user_id: UserId,
        started_at: DateTime<Utc>,
        activities: Vec<Activity>,
    ) -> Result<SessionRecord, TrackingError> {
        let session = SessionRecord::new(user_id, started_at, Some(self.clock.now()), activities)?;
        let id = self.sessions.append_session(&session).await?;
        debug!(user = %user_id, id, activities = session.activities().len(), "session tracked");
        Ok(session)
    }

    /// Record a completed lesson attempt at the current time.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Progress` for a score above 100.
    /// Returns `TrackingError::Storage` if persistence fails.
    pub async fn record_attempt(
        &self,
        user_id: UserId,
        attempt: LessonAttempt,
    ) -> Result<ProgressRecord, TrackingError> {
        let record = ProgressRecord::new(
            user_id,
            attempt.lesson_id,
            attempt.score,
            self.clock.now(),
            attempt.time_spent_seconds,
            attempt.mistakes,
        )?;
        self.progress.append_progress(&record).await?;
        Ok(record)
    }
}
