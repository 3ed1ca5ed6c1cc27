use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{LessonId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

/// How the learner perceived a lesson's difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    TooEasy,
    JustRight,
    TooHard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::TooEasy => "too_easy",
            Difficulty::JustRight => "just_right",
            Difficulty::TooHard => "too_hard",
        }
    }

    /// Parse the persisted string form.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::UnknownDifficulty` for any other value.
    pub fn parse(raw: &str) -> Result<Self, FeedbackError> {
        match raw {
            "too_easy" => Ok(Self::TooEasy),
            "just_right" => Ok(Self::JustRight),
            "too_hard" => Ok(Self::TooHard),
            other => Err(FeedbackError::UnknownDifficulty(other.to_owned())),
        }
    }
}

/// Learner feedback left on a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord {
    user_id: UserId,
    lesson_id: LessonId,
    rating: u8,
    difficulty: Difficulty,
    comments: Option<String>,
    created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    /// Build a feedback record.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidRating` if `rating` is outside 1..=5.
    pub fn new(
        user_id: UserId,
        lesson_id: LessonId,
        rating: u8,
        difficulty: Difficulty,
        comments: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FeedbackError> {
        if !(1..=5).contains(&rating) {
            return Err(FeedbackError::InvalidRating(rating));
        }
        let comments = comments.filter(|c| !c.trim().is_empty());

        Ok(Self {
            user_id,
            lesson_id,
            rating,
            difficulty,
            comments,
            created_at,
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
    pub fn rating(&self) -> u8 {
        self.rating
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rating_must_be_one_to_five() {
        for rating in [0, 6] {
            let err = FeedbackRecord::new(
                UserId::new(1),
                LessonId::new(1),
                rating,
                Difficulty::JustRight,
                None,
                fixed_now(),
            )
            .unwrap_err();
            assert_eq!(err, FeedbackError::InvalidRating(rating));
        }
    }

    #[test]
    fn blank_comments_are_dropped() {
        let record = FeedbackRecord::new(
            UserId::new(1),
            LessonId::new(1),
            4,
            Difficulty::TooHard,
            Some("   ".into()),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(record.comments(), None);
    }

    #[test]
    fn difficulty_parses_snake_case() {
        assert_eq!(Difficulty::parse("too_easy").unwrap(), Difficulty::TooEasy);
        assert_eq!(Difficulty::TooHard.as_str(), "too_hard");
        assert!(Difficulty::parse("impossible").is_err());
    }
}
