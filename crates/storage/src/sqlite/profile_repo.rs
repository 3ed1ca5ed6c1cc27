use engage_core::model::{AdaptiveProfile, UserId};

use super::{
    SqliteRepository,
    mapping::{conn, id_i64, list_to_json, map_profile_row},
};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<AdaptiveProfile>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    user_id, current_level, strengths, weaknesses,
                    preferred_time, daily_goal_minutes, topic_preferences
                FROM adaptive_profiles
                WHERE user_id = ?1
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn upsert_profile(&self, profile: &AdaptiveProfile) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO adaptive_profiles (
                    user_id, current_level, strengths, weaknesses,
                    preferred_time, daily_goal_minutes, topic_preferences
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(user_id) DO UPDATE SET
                    current_level = excluded.current_level,
                    strengths = excluded.strengths,
                    weaknesses = excluded.weaknesses,
                    preferred_time = excluded.preferred_time,
                    daily_goal_minutes = excluded.daily_goal_minutes,
                    topic_preferences = excluded.topic_preferences
            ",
        )
        .bind(id_i64("user_id", profile.user_id.value())?)
        .bind(i64::from(profile.current_level))
        .bind(list_to_json(&profile.strengths)?)
        .bind(list_to_json(&profile.weaknesses)?)
        .bind(profile.preferences.preferred_time.as_deref())
        .bind(i64::from(profile.preferences.daily_goal_minutes))
        .bind(list_to_json(&profile.preferences.topic_preferences)?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
