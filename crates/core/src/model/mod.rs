mod feedback;
mod ids;
mod lesson;
mod profile;
mod progress;
mod session;

pub use ids::{ItemId, LessonId, UserId};

pub use feedback::{Difficulty, FeedbackError, FeedbackRecord};
pub use lesson::LessonRef;
pub use profile::{AdaptiveProfile, DEFAULT_DAILY_GOAL_MINUTES, LearningPreferences};
pub use progress::{MAX_SCORE, ProgressError, ProgressRecord};
pub use session::{Activity, ActivityKind, SessionRecord, SessionRecordError};
