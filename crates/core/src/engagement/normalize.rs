use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

//
// ─── METRIC NAMES ──────────────────────────────────────────────────────────────
//

/// The closed set of sub-metrics that feed the engagement score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    SessionsCount,
    AverageSessionDurationMinutes,
    CompletedLessonsCount,
    AverageScore,
    FeedbackCount,
}

impl MetricName {
    /// Every metric, in scoring order.
    pub const ALL: [MetricName; 5] = [
        MetricName::SessionsCount,
        MetricName::AverageSessionDurationMinutes,
        MetricName::CompletedLessonsCount,
        MetricName::AverageScore,
        MetricName::FeedbackCount,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            MetricName::SessionsCount => "sessions_count",
            MetricName::AverageSessionDurationMinutes => "average_session_duration_minutes",
            MetricName::CompletedLessonsCount => "completed_lessons_count",
            MetricName::AverageScore => "average_score",
            MetricName::FeedbackCount => "feedback_count",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

//
// ─── RANGES ────────────────────────────────────────────────────────────────────
//

/// Fixed domain a raw metric is rescaled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Linear rescale into `[0, 1]`, clamping values outside the domain.
    ///
    /// Non-numeric input (NaN) maps to `0.0` so the output stays in range.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let ratio = (value - self.min) / (self.max - self.min);
        if ratio.is_nan() {
            return 0.0;
        }
        ratio.clamp(0.0, 1.0)
    }

    fn validate(&self, metric: MetricName) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            return Err(ConfigError::InvalidRange {
                metric: metric.key(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Normalization domains, one per metric.
///
/// The defaults are long-standing tuning values (two sessions a day for a
/// week, an hour per session, ten lessons, a perfect score, five pieces of
/// feedback) and can be overridden through configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizationRanges {
    pub sessions_count: MetricRange,
    pub average_session_duration_minutes: MetricRange,
    pub completed_lessons_count: MetricRange,
    pub average_score: MetricRange,
    pub feedback_count: MetricRange,
}

impl Default for NormalizationRanges {
    fn default() -> Self {
        Self {
            sessions_count: MetricRange::new(0.0, 14.0),
            average_session_duration_minutes: MetricRange::new(0.0, 60.0),
            completed_lessons_count: MetricRange::new(0.0, 10.0),
            average_score: MetricRange::new(0.0, 100.0),
            feedback_count: MetricRange::new(0.0, 5.0),
        }
    }
}

impl NormalizationRanges {
    #[must_use]
    pub fn range(&self, metric: MetricName) -> MetricRange {
        match metric {
            MetricName::SessionsCount => self.sessions_count,
            MetricName::AverageSessionDurationMinutes => self.average_session_duration_minutes,
            MetricName::CompletedLessonsCount => self.completed_lessons_count,
            MetricName::AverageScore => self.average_score,
            MetricName::FeedbackCount => self.feedback_count,
        }
    }

    /// Rescale `value` into `[0, 1]` using the domain configured for `metric`.
    #[must_use]
    pub fn normalize(&self, metric: MetricName, value: f64) -> f64 {
        self.range(metric).normalize(value)
    }

    /// String-keyed variant of [`NormalizationRanges::normalize`].
    ///
    /// # Panics
    ///
    /// Panics if `key` does not name one of the configured metrics. Callers
    /// pass keys from code, so an unknown key is a defect rather than input.
    #[must_use]
    pub fn normalize_key(&self, key: &str, value: f64) -> f64 {
        let Some(metric) = MetricName::from_key(key) else {
            panic!("unknown engagement metric: {key}");
        };
        self.normalize(metric, value)
    }

    /// Check that every domain is non-empty.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRange` for the first range with `max <= min`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        MetricName::ALL
            .into_iter()
            .try_for_each(|metric| self.range(metric).validate(metric))
    }
}
