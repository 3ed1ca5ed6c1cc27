use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ItemId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionRecordError {
    #[error("session ends before it starts")]
    InvalidTimeRange,

    #[error("unknown activity kind: {0}")]
    UnknownActivityKind(String),
}

//
// ─── ACTIVITIES ────────────────────────────────────────────────────────────────
//

/// What the learner was doing during part of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Lesson,
    Chat,
    Practice,
}

impl ActivityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Lesson => "lesson",
            ActivityKind::Chat => "chat",
            ActivityKind::Practice => "practice",
        }
    }

    /// Parse the persisted string form.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError::UnknownActivityKind` for any other value.
    pub fn parse(raw: &str) -> Result<Self, SessionRecordError> {
        match raw {
            "lesson" => Ok(Self::Lesson),
            "chat" => Ok(Self::Chat),
            "practice" => Ok(Self::Practice),
            other => Err(SessionRecordError::UnknownActivityKind(other.to_owned())),
        }
    }
}

/// One step inside a session, kept in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub item_id: ItemId,
    pub duration_seconds: u32,
    pub completed: bool,
}

impl Activity {
    #[must_use]
    pub fn new(kind: ActivityKind, item_id: ItemId, duration_seconds: u32, completed: bool) -> Self {
        Self {
            kind,
            item_id,
            duration_seconds,
            completed,
        }
    }
}

//
// ─── SESSION RECORD ────────────────────────────────────────────────────────────
//

/// A single app session.
///
/// `ended_at` is `None` while the session is still open (or was never closed
/// by the client). Such sessions still count as sessions, but they carry no
/// duration and no recency signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    user_id: UserId,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    activities: Vec<Activity>,
}

impl SessionRecord {
    /// Build a session record.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError::InvalidTimeRange` if `ended_at` precedes `started_at`.
    pub fn new(
        user_id: UserId,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
        activities: Vec<Activity>,
    ) -> Result<Self, SessionRecordError> {
        if ended_at.is_some_and(|end| end < started_at) {
            return Err(SessionRecordError::InvalidTimeRange);
        }
        Ok(Self {
            user_id,
            started_at,
            ended_at,
            activities,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Wall-clock length of the session, if it was closed.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }

    /// Session length in (fractional) minutes, if it was closed.
    #[must_use]
    pub fn duration_minutes(&self) -> Option<f64> {
        let millis = self.duration()?.num_milliseconds();

        // Millisecond precision is plenty for human session lengths.
        #[allow(clippy::cast_precision_loss)]
        let minutes = millis as f64 / 60_000.0;

        Some(minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_end_before_start() {
        let now = fixed_now();
        let err = SessionRecord::new(
            UserId::new(1),
            now,
            Some(now - Duration::seconds(1)),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, SessionRecordError::InvalidTimeRange);
    }

    #[test]
    fn open_session_has_no_duration() {
        let session = SessionRecord::new(UserId::new(1), fixed_now(), None, Vec::new()).unwrap();
        assert!(!session.is_terminated());
        assert_eq!(session.duration_minutes(), None);
    }

    #[test]
    fn duration_is_reported_in_minutes() {
        let now = fixed_now();
        let session = SessionRecord::new(
            UserId::new(1),
            now,
            Some(now + Duration::seconds(90)),
            Vec::new(),
        )
        .unwrap();
        assert_eq!(session.duration_minutes(), Some(1.5));
    }

    #[test]
    fn activity_kind_round_trips_through_str() {
        for kind in [ActivityKind::Lesson, ActivityKind::Chat, ActivityKind::Practice] {
            assert_eq!(ActivityKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(matches!(
            ActivityKind::parse("quiz"),
            Err(SessionRecordError::UnknownActivityKind(_))
        ));
    }
}
