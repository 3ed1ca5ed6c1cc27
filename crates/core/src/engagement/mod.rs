//! Engagement scoring: extract sub-metrics, normalize them, and combine them
//! into a single score.

pub mod extract;
mod normalize;
mod score;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::{ConfigError, EngagementConfig};
use crate::model::{FeedbackRecord, LessonId, ProgressRecord, SessionRecord};

pub use normalize::{MetricName, MetricRange, NormalizationRanges};
pub use score::{EngagementScorer, MetricValues, ScoreWeights, WEIGHT_SUM_TOLERANCE};

/// Records for one user inside one time window.
#[derive(Debug, Clone, Copy)]
pub struct ActivityWindow<'a> {
    pub sessions: &'a [SessionRecord],
    pub progress: &'a [ProgressRecord],
    pub feedback: &'a [FeedbackRecord],
}

/// Derived engagement figures for a user; recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementMetrics {
    pub sessions_count: u32,
    pub average_session_duration_minutes: f64,
    pub completed_lessons_count: u32,
    pub average_score: f64,
    pub feedback_count: u32,
    pub last_active_at: Option<DateTime<Utc>>,
    pub weak_areas: Vec<LessonId>,
    pub engagement_score: f64,
}

impl EngagementMetrics {
    /// The five scalar inputs of the score.
    #[must_use]
    pub fn values(&self) -> MetricValues {
        MetricValues {
            sessions_count: f64::from(self.sessions_count),
            average_session_duration_minutes: self.average_session_duration_minutes,
            completed_lessons_count: f64::from(self.completed_lessons_count),
            average_score: self.average_score,
            feedback_count: f64::from(self.feedback_count),
        }
    }
}

/// Extractors + scorer bound to one validated configuration.
#[derive(Debug, Clone)]
pub struct EngagementEngine {
    scorer: EngagementScorer,
    weak_score_threshold: u8,
    weak_area_cap: usize,
}

impl Default for EngagementEngine {
    fn default() -> Self {
        let config = EngagementConfig::default();
        Self {
            scorer: EngagementScorer::default(),
            weak_score_threshold: config.weak_score_threshold,
            weak_area_cap: config.weak_area_cap,
        }
    }
}

impl EngagementEngine {
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration does not validate.
    pub fn new(config: &EngagementConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scorer: EngagementScorer::new(config.weights.clone(), config.ranges.clone())?,
            weak_score_threshold: config.weak_score_threshold,
            weak_area_cap: config.weak_area_cap,
        })
    }

    #[must_use]
    pub fn scorer(&self) -> &EngagementScorer {
        &self.scorer
    }

    /// Compute metrics for already-windowed records.
    ///
    /// An empty window yields all-zero metrics and a score of `0.0`.
    #[must_use]
    pub fn compute(&self, window: ActivityWindow<'_>) -> EngagementMetrics {
        let mut metrics = EngagementMetrics {
            sessions_count: extract::sessions_count(window.sessions),
            average_session_duration_minutes: extract::average_session_duration_minutes(
                window.sessions,
            ),
            completed_lessons_count: extract::completed_lessons_count(window.progress),
            average_score: extract::average_score(window.progress),
            feedback_count: extract::feedback_count(window.feedback),
            last_active_at: extract::last_active_at(window.sessions),
            weak_areas: extract::weak_areas(
                window.progress,
                self.weak_score_threshold,
                self.weak_area_cap,
            ),
            engagement_score: 0.0,
        };
        metrics.engagement_score = self.scorer.score(&metrics.values());

        debug!(
            sessions = metrics.sessions_count,
            completed = metrics.completed_lessons_count,
            feedback = metrics.feedback_count,
            score = metrics.engagement_score,
            "computed engagement metrics"
        );
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn empty_window_is_all_zero() {
        let metrics = EngagementEngine::default().compute(ActivityWindow {
            sessions: &[],
            progress: &[],
            feedback: &[],
        });
        assert_eq!(metrics.sessions_count, 0);
        assert_eq!(metrics.average_session_duration_minutes, 0.0);
        assert_eq!(metrics.average_score, 0.0);
        assert_eq!(metrics.last_active_at, None);
        assert!(metrics.weak_areas.is_empty());
        assert_eq!(metrics.engagement_score, 0.0);
    }

    #[test]
    fn worked_example_end_to_end() {
        let user = UserId::new(1);
        let t = fixed_now();
        let sessions =
            vec![SessionRecord::new(user, t, Some(t + Duration::seconds(1800)), Vec::new()).unwrap()];
        let progress = vec![
            ProgressRecord::new(user, LessonId::new(10), 80, t, 600, 1).unwrap(),
            ProgressRecord::new(user, LessonId::new(11), 55, t, 600, 4).unwrap(),
        ];

        let metrics = EngagementEngine::default().compute(ActivityWindow {
            sessions: &sessions,
            progress: &progress,
            feedback: &[],
        });

        assert_eq!(metrics.sessions_count, 1);
        assert_eq!(metrics.average_session_duration_minutes, 30.0);
        assert_eq!(metrics.completed_lessons_count, 2);
        assert_eq!(metrics.average_score, 67.5);
        assert_eq!(metrics.weak_areas, vec![LessonId::new(11)]);
        assert_eq!(metrics.feedback_count, 0);
        assert_eq!(metrics.last_active_at, Some(t + Duration::seconds(1800)));

        let expected = 0.3 * (1.0 / 14.0) + 0.2 * 0.5 + 0.3 * 0.2 + 0.1 * 0.675 + 0.1 * 0.0;
        assert!((metrics.engagement_score - expected).abs() < 1e-9);
    }

    #[test]
    fn engine_uses_configured_weak_threshold() {
        let config = EngagementConfig {
            weak_score_threshold: 90,
            weak_area_cap: 1,
            ..EngagementConfig::default()
        };
        let engine = EngagementEngine::new(&config).unwrap();
        let user = UserId::new(1);
        let progress = vec![
            ProgressRecord::new(user, LessonId::new(1), 85, fixed_now(), 60, 0).unwrap(),
            ProgressRecord::new(user, LessonId::new(2), 75, fixed_now(), 60, 0).unwrap(),
        ];
        let metrics = engine.compute(ActivityWindow {
            sessions: &[],
            progress: &progress,
            feedback: &[],
        });
        assert_eq!(metrics.weak_areas, vec![LessonId::new(1)]);
    }
}
