use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::{LessonId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("score must be between 0 and 100, got {0}")]
    InvalidScore(u32),
}

/// Highest score a lesson attempt can earn.
pub const MAX_SCORE: u8 = 100;

/// One completed lesson attempt.
///
/// Records are append-only: a retry produces a new record rather than
/// updating the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressRecord {
    user_id: UserId,
    lesson_id: LessonId,
    score: u8,
    completed_at: DateTime<Utc>,
    time_spent_seconds: u32,
    mistakes: u32,
}

impl ProgressRecord {
    /// Build a progress record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidScore` if `score` exceeds 100.
    pub fn new(
        user_id: UserId,
        lesson_id: LessonId,
        score: u32,
        completed_at: DateTime<Utc>,
        time_spent_seconds: u32,
        mistakes: u32,
    ) -> Result<Self, ProgressError> {
        let score = u8::try_from(score)
            .ok()
            .filter(|s| *s <= MAX_SCORE)
            .ok_or(ProgressError::InvalidScore(score))?;

        Ok(Self {
            user_id,
            lesson_id,
            score,
            completed_at,
            time_spent_seconds,
            mistakes,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn time_spent_seconds(&self) -> u32 {
        self.time_spent_seconds
    }

    #[must_use]
    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    /// True when the attempt scored strictly below `threshold`.
    #[must_use]
    pub fn is_below(&self, threshold: u8) -> bool {
        self.score < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn accepts_full_score_range() {
        for score in [0, 70, 100] {
            let record =
                ProgressRecord::new(UserId::new(1), LessonId::new(1), score, fixed_now(), 60, 0)
                    .unwrap();
            assert_eq!(u32::from(record.score()), score);
        }
    }

    #[test]
    fn rejects_scores_above_100() {
        let err = ProgressRecord::new(UserId::new(1), LessonId::new(1), 101, fixed_now(), 60, 0)
            .unwrap_err();
        assert_eq!(err, ProgressError::InvalidScore(101));

        let err = ProgressRecord::new(UserId::new(1), LessonId::new(1), 300, fixed_now(), 60, 0)
            .unwrap_err();
        assert_eq!(err, ProgressError::InvalidScore(300));
    }

    #[test]
    fn threshold_is_strict() {
        let record =
            ProgressRecord::new(UserId::new(1), LessonId::new(1), 70, fixed_now(), 60, 0).unwrap();
        assert!(!record.is_below(70));
        assert!(record.is_below(71));
    }
}
