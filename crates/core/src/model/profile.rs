use serde::{Deserialize, Serialize};

use crate::model::UserId;

/// Daily study goal used when a learner never set one.
pub const DEFAULT_DAILY_GOAL_MINUTES: u32 = 30;

/// Learner-chosen study preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningPreferences {
    pub preferred_time: Option<String>,
    pub daily_goal_minutes: u32,
    /// Lesson languages the learner wants to study (e.g. `"en"`, `"rw"`).
    pub topic_preferences: Vec<String>,
}

impl Default for LearningPreferences {
    fn default() -> Self {
        Self {
            preferred_time: None,
            daily_goal_minutes: DEFAULT_DAILY_GOAL_MINUTES,
            topic_preferences: Vec::new(),
        }
    }
}

/// Per-learner adaptive-learning state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptiveProfile {
    pub user_id: UserId,
    pub current_level: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub preferences: LearningPreferences,
}

impl AdaptiveProfile {
    /// Profile used for learners that have no adaptive record yet.
    #[must_use]
    pub fn fallback(user_id: UserId, level: u32) -> Self {
        Self {
            user_id,
            current_level: level,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            preferences: LearningPreferences::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_profile_is_empty() {
        let profile = AdaptiveProfile::fallback(UserId::new(4), 1);
        assert_eq!(profile.current_level, 1);
        assert!(profile.weaknesses.is_empty());
        assert!(profile.preferences.topic_preferences.is_empty());
        assert_eq!(profile.preferences.daily_goal_minutes, DEFAULT_DAILY_GOAL_MINUTES);
    }
}
