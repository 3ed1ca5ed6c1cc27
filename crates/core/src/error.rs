//! Crate-wide error type covering record validation and configuration.

use thiserror::Error;

use crate::config::ConfigError;
use crate::model::{FeedbackError, ProgressError, SessionRecordError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionRecordError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonId, ProgressRecord, UserId};
    use crate::time::fixed_now;

    fn build(score: u32) -> Result<ProgressRecord, Error> {
        Ok(ProgressRecord::new(UserId::new(1), LessonId::new(1), score, fixed_now(), 0, 0)?)
    }

    #[test]
    fn record_errors_convert() {
        let err = build(101).unwrap_err();
        assert!(matches!(err, Error::Progress(ProgressError::InvalidScore(101))));
        assert!(build(100).is_ok());
    }
}
