use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engagement::{NormalizationRanges, ScoreWeights};
use crate::model::MAX_SCORE;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("window must span at least one day")]
    ZeroWindowDays,

    #[error("insight days must be > 0")]
    ZeroInsightDays,

    #[error("milestone step must be > 0")]
    ZeroMilestoneStep,

    #[error("{name} must be <= 100, got {value}")]
    InvalidThreshold { name: &'static str, value: u8 },

    #[error("study time bonus must be finite and non-negative, got {0}")]
    InvalidStudyBonus(f64),

    #[error("weight for {metric} must be finite and non-negative, got {value}")]
    InvalidWeight { metric: &'static str, value: f64 },

    #[error("score weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },

    #[error("range for {metric} must satisfy min < max, got [{min}, {max}]")]
    InvalidRange {
        metric: &'static str,
        min: f64,
        max: f64,
    },
}

//
// ─── DEFAULTS ──────────────────────────────────────────────────────────────────
//

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_WEAK_SCORE_THRESHOLD: u8 = 70;
pub const DEFAULT_WEAK_AREA_CAP: usize = 3;
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;
pub const DEFAULT_LEVEL: u32 = 1;
pub const DEFAULT_INSIGHT_DAYS: usize = 7;
pub const DEFAULT_STRENGTH_THRESHOLD: u8 = 85;
pub const DEFAULT_WEAKNESS_THRESHOLD: u8 = 60;
pub const DEFAULT_REVIEW_INTERVAL_HOURS: u32 = 24;
pub const DEFAULT_STUDY_TIME_BONUS_MINUTES: f64 = 5.0;
pub const DEFAULT_MILESTONE_STEP: u32 = 5;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Tunable knobs of the engagement and recommendation engine.
///
/// All values default to the figures the product has always shipped with.
/// Missing keys in a config file fall back to those defaults; unknown keys
/// are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngagementConfig {
    /// Length of the trailing window used for engagement metrics.
    pub window_days: u32,
    pub weights: ScoreWeights,
    pub ranges: NormalizationRanges,
    /// Attempts scoring below this are weak areas and review candidates.
    pub weak_score_threshold: u8,
    pub weak_area_cap: usize,
    pub recommendation_limit: usize,
    /// Level assumed for learners without an adaptive profile.
    pub default_level: u32,
    /// Number of most recent active days reported in weekly insights.
    pub insight_days: usize,
    /// Attempts at or above this mark their lesson category as a strength.
    pub strength_threshold: u8,
    /// Attempts below this mark their lesson category as a weakness.
    pub weakness_threshold: u8,
    pub review_interval_hours: u32,
    pub study_time_bonus_minutes: f64,
    pub milestone_step: u32,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            weights: ScoreWeights::default(),
            ranges: NormalizationRanges::default(),
            weak_score_threshold: DEFAULT_WEAK_SCORE_THRESHOLD,
            weak_area_cap: DEFAULT_WEAK_AREA_CAP,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
            default_level: DEFAULT_LEVEL,
            insight_days: DEFAULT_INSIGHT_DAYS,
            strength_threshold: DEFAULT_STRENGTH_THRESHOLD,
            weakness_threshold: DEFAULT_WEAKNESS_THRESHOLD,
            review_interval_hours: DEFAULT_REVIEW_INTERVAL_HOURS,
            study_time_bonus_minutes: DEFAULT_STUDY_TIME_BONUS_MINUTES,
            milestone_step: DEFAULT_MILESTONE_STEP,
        }
    }
}

impl EngagementConfig {
    /// Check every knob.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::ZeroWindowDays);
        }
        if self.insight_days == 0 {
            return Err(ConfigError::ZeroInsightDays);
        }
        if self.milestone_step == 0 {
            return Err(ConfigError::ZeroMilestoneStep);
        }
        for (name, value) in [
            ("weak_score_threshold", self.weak_score_threshold),
            ("strength_threshold", self.strength_threshold),
            ("weakness_threshold", self.weakness_threshold),
        ] {
            if value > MAX_SCORE {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if !self.study_time_bonus_minutes.is_finite() || self.study_time_bonus_minutes < 0.0 {
            return Err(ConfigError::InvalidStudyBonus(self.study_time_bonus_minutes));
        }
        self.weights.validate()?;
        self.ranges.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngagementConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: EngagementConfig = toml::from_str(
            r"
                window_days = 14

                [weights]
                sessions_count = 0.4
                average_session_duration_minutes = 0.1

                [ranges.feedback_count]
                min = 0.0
                max = 10.0
            ",
        )
        .unwrap();

        assert_eq!(config.window_days, 14);
        assert_eq!(config.weights.sessions_count, 0.4);
        assert_eq!(config.weights.completed_lessons_count, 0.3);
        assert_eq!(config.ranges.feedback_count.max, 10.0);
        assert_eq!(config.ranges.sessions_count.max, 14.0);
        assert_eq!(config.weak_score_threshold, DEFAULT_WEAK_SCORE_THRESHOLD);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: Result<EngagementConfig, _> = toml::from_str("streak_bonus = 2");
        assert!(parsed.is_err());

        let parsed: Result<EngagementConfig, _> = toml::from_str("[weights]\nstreak_days = 0.1");
        assert!(parsed.is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = EngagementConfig {
            window_days: 0,
            ..EngagementConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWindowDays));

        let config = EngagementConfig {
            strength_threshold: 101,
            ..EngagementConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidThreshold {
                name: "strength_threshold",
                value: 101
            })
        );

        let config = EngagementConfig {
            study_time_bonus_minutes: f64::NAN,
            ..EngagementConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidStudyBonus(_))));
    }
}
