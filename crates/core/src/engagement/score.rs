use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::engagement::normalize::{MetricName, NormalizationRanges};

/// Tolerance applied when checking that weights add up to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

//
// ─── WEIGHTS ───────────────────────────────────────────────────────────────────
//

/// Contribution of each normalized metric to the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    pub sessions_count: f64,
    pub average_session_duration_minutes: f64,
    pub completed_lessons_count: f64,
    pub average_score: f64,
    pub feedback_count: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            sessions_count: 0.3,
            average_session_duration_minutes: 0.2,
            completed_lessons_count: 0.3,
            average_score: 0.1,
            feedback_count: 0.1,
        }
    }
}

impl ScoreWeights {
    #[must_use]
    pub fn weight(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::SessionsCount => self.sessions_count,
            MetricName::AverageSessionDurationMinutes => self.average_session_duration_minutes,
            MetricName::CompletedLessonsCount => self.completed_lessons_count,
            MetricName::AverageScore => self.average_score,
            MetricName::FeedbackCount => self.feedback_count,
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        MetricName::ALL.into_iter().map(|m| self.weight(m)).sum()
    }

    /// Check that weights are non-negative and add up to one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidWeight` or `ConfigError::WeightSum`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for metric in MetricName::ALL {
            let value = self.weight(metric);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    metric: metric.key(),
                    value,
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

/// The five raw sub-metrics the scorer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricValues {
    pub sessions_count: f64,
    pub average_session_duration_minutes: f64,
    pub completed_lessons_count: f64,
    pub average_score: f64,
    pub feedback_count: f64,
}

impl MetricValues {
    #[must_use]
    pub fn get(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::SessionsCount => self.sessions_count,
            MetricName::AverageSessionDurationMinutes => self.average_session_duration_minutes,
            MetricName::CompletedLessonsCount => self.completed_lessons_count,
            MetricName::AverageScore => self.average_score,
            MetricName::FeedbackCount => self.feedback_count,
        }
    }
}

//
// ─── SCORER ────────────────────────────────────────────────────────────────────
//

/// Weighted sum of normalized sub-metrics.
///
/// Holds only validated configuration, so scoring is a pure function of its
/// input.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementScorer {
    weights: ScoreWeights,
    ranges: NormalizationRanges,
}

impl Default for EngagementScorer {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            ranges: NormalizationRanges::default(),
        }
    }
}

impl EngagementScorer {
    /// Build a scorer from explicit weights and domains.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the weights or ranges are invalid.
    pub fn new(weights: ScoreWeights, ranges: NormalizationRanges) -> Result<Self, ConfigError> {
        weights.validate()?;
        ranges.validate()?;
        Ok(Self { weights, ranges })
    }

    #[must_use]
    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    #[must_use]
    pub fn ranges(&self) -> &NormalizationRanges {
        &self.ranges
    }

    /// Composite engagement score in `[0, 1]`.
    #[must_use]
    pub fn score(&self, values: &MetricValues) -> f64 {
        let total: f64 = MetricName::ALL
            .into_iter()
            .map(|m| self.weights.weight(m) * self.ranges.normalize(m, values.get(m)))
            .sum();
        // Guards against the sum drifting a few ulps past 1.0.
        total.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_weights_sum_to_one() {
        let weights = ScoreWeights::default();
        assert_eq!(weights.sum(), 1.0);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let weights = ScoreWeights {
            feedback_count: 0.2,
            ..ScoreWeights::default()
        };
        assert!(matches!(weights.validate(), Err(ConfigError::WeightSum { .. })));
    }

    #[test]
    fn rejects_negative_weight() {
        let weights = ScoreWeights {
            sessions_count: -0.1,
            average_score: 0.5,
            ..ScoreWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::InvalidWeight {
                metric: "sessions_count",
                ..
            })
        ));
    }

    #[test]
    fn scores_worked_example() {
        let scorer = EngagementScorer::default();
        let values = MetricValues {
            sessions_count: 1.0,
            average_session_duration_minutes: 30.0,
            completed_lessons_count: 2.0,
            average_score: 67.5,
            feedback_count: 0.0,
        };
        let expected = 0.3 * (1.0 / 14.0) + 0.2 * 0.5 + 0.3 * 0.2 + 0.1 * 0.675;
        assert!(approx(scorer.score(&values), expected));
        assert!(approx(scorer.score(&values), 0.248_928_571_428_571_4));
    }

    #[test]
    fn zero_activity_scores_zero() {
        assert_eq!(EngagementScorer::default().score(&MetricValues::default()), 0.0);
    }

    #[test]
    fn saturated_activity_scores_one() {
        let values = MetricValues {
            sessions_count: 40.0,
            average_session_duration_minutes: 500.0,
            completed_lessons_count: 25.0,
            average_score: 100.0,
            feedback_count: 9.0,
        };
        assert!(approx(EngagementScorer::default().score(&values), 1.0));
    }

    #[test]
    fn score_is_bounded_and_deterministic() {
        let scorer = EngagementScorer::default();
        let samples = [
            MetricValues {
                sessions_count: 3.0,
                average_session_duration_minutes: 12.5,
                completed_lessons_count: 4.0,
                average_score: 88.0,
                feedback_count: 1.0,
            },
            MetricValues {
                sessions_count: -2.0,
                average_session_duration_minutes: f64::NAN,
                completed_lessons_count: 1e9,
                average_score: 0.0,
                feedback_count: 2.0,
            },
        ];
        for values in samples {
            let first = scorer.score(&values);
            assert!((0.0..=1.0).contains(&first));
            assert_eq!(first.to_bits(), scorer.score(&values).to_bits());
        }
    }

    #[test]
    fn custom_configuration_is_validated() {
        let ranges = NormalizationRanges {
            sessions_count: crate::engagement::MetricRange::new(3.0, 1.0),
            ..NormalizationRanges::default()
        };
        assert!(EngagementScorer::new(ScoreWeights::default(), ranges).is_err());
    }
}
