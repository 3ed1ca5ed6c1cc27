//! Day-bucketed activity summaries and study advice.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::engagement::EngagementMetrics;
use crate::model::{LessonId, SessionRecord};

/// Activity totals for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyActivity {
    pub day: NaiveDate,
    pub total_time_seconds: u64,
    pub activities: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyActivity {
    /// Most recent active days first.
    pub days: Vec<DailyActivity>,
    pub total_time_spent_seconds: u64,
    pub average_activities_per_day: f64,
}

/// Fold sessions into per-day activity buckets and keep the latest `days` of them.
///
/// Activities are attributed to the day their session started. Sessions with
/// no activities produce no bucket. The per-day average always divides by
/// `days`, so quiet days pull it down.
#[must_use]
pub fn weekly_activity(sessions: &[SessionRecord], days: usize) -> WeeklyActivity {
    let mut buckets: BTreeMap<NaiveDate, (u64, u32)> = BTreeMap::new();
    for session in sessions {
        if session.activities().is_empty() {
            continue;
        }
        let entry = buckets
            .entry(session.started_at().date_naive())
            .or_insert((0, 0));
        for activity in session.activities() {
            entry.0 = entry.0.saturating_add(u64::from(activity.duration_seconds));
            entry.1 = entry.1.saturating_add(1);
        }
    }

    let recent: Vec<DailyActivity> = buckets
        .into_iter()
        .rev()
        .take(days)
        .map(|(day, (total_time_seconds, activities))| DailyActivity {
            day,
            total_time_seconds,
            activities,
        })
        .collect();

    let total_time_spent_seconds = recent.iter().map(|d| d.total_time_seconds).sum();
    let total_activities: u64 = recent.iter().map(|d| u64::from(d.activities)).sum();

    #[allow(clippy::cast_precision_loss)]
    let average_activities_per_day = if days == 0 {
        0.0
    } else {
        total_activities as f64 / days as f64
    };

    WeeklyActivity {
        days: recent,
        total_time_spent_seconds,
        average_activities_per_day,
    }
}

/// Short-term study targets derived from engagement metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyAdvice {
    pub suggested_study_time_minutes: f64,
    pub focus_areas: Vec<LessonId>,
    pub next_milestone: u32,
}

/// Suggest slightly longer sessions, point at weak lessons, and name the next
/// completed-lessons milestone (rounded up to a multiple of `milestone_step`).
#[must_use]
pub fn study_advice(
    metrics: &EngagementMetrics,
    bonus_minutes: f64,
    milestone_step: u32,
) -> StudyAdvice {
    let step = milestone_step.max(1);
    StudyAdvice {
        suggested_study_time_minutes: metrics.average_session_duration_minutes + bonus_minutes,
        focus_areas: metrics.weak_areas.clone(),
        next_milestone: metrics.completed_lessons_count.div_ceil(step).saturating_mul(step),
    }
}
