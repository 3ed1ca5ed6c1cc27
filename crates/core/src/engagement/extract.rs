//! Scalar sub-metrics pulled out of raw activity records.
//!
//! Every function here tolerates empty input and returns a zero value rather
//! than dividing by zero.

use chrono::{DateTime, Utc};

use crate::model::{FeedbackRecord, LessonId, ProgressRecord, SessionRecord};

fn count_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: f64, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    total / len as f64
}

/// Number of sessions, open ones included.
#[must_use]
pub fn sessions_count(sessions: &[SessionRecord]) -> u32 {
    count_u32(sessions.len())
}

/// Mean length in minutes of the sessions that were closed.
#[must_use]
pub fn average_session_duration_minutes(sessions: &[SessionRecord]) -> f64 {
    let durations: Vec<f64> = sessions
        .iter()
        .filter_map(SessionRecord::duration_minutes)
        .collect();
    mean(durations.iter().sum(), durations.len())
}

/// Latest end time among closed sessions.
#[must_use]
pub fn last_active_at(sessions: &[SessionRecord]) -> Option<DateTime<Utc>> {
    sessions.iter().filter_map(SessionRecord::ended_at).max()
}

/// Every progress record is one completed attempt.
#[must_use]
pub fn completed_lessons_count(progress: &[ProgressRecord]) -> u32 {
    count_u32(progress.len())
}

#[must_use]
pub fn average_score(progress: &[ProgressRecord]) -> f64 {
    let total: f64 = progress.iter().map(|p| f64::from(p.score())).sum();
    mean(total, progress.len())
}

/// Lessons of the first `cap` attempts scoring below `threshold`, in input order.
#[must_use]
pub fn weak_areas(progress: &[ProgressRecord], threshold: u8, cap: usize) -> Vec<LessonId> {
    progress
        .iter()
        .filter(|p| p.is_below(threshold))
        .map(ProgressRecord::lesson_id)
        .take(cap)
        .collect()
}

#[must_use]
pub fn feedback_count(feedback: &[FeedbackRecord]) -> u32 {
    count_u32(feedback.len())
}
