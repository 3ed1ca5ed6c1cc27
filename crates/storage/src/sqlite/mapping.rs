use chrono::{DateTime, Utc};
use engage_core::model::{
    AdaptiveProfile, Difficulty, FeedbackRecord, ItemId, LearningPreferences, LessonId, LessonRef,
    ProgressRecord, UserId,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    Ok(UserId::new(i64_to_u64("user_id", v)?))
}

pub(crate) fn lesson_id_from_i64(v: i64) -> Result<LessonId, StorageError> {
    Ok(LessonId::new(i64_to_u64("lesson_id", v)?))
}

pub(crate) fn item_id_from_i64(v: i64) -> Result<ItemId, StorageError> {
    Ok(ItemId::new(i64_to_u64("item_id", v)?))
}

pub(crate) fn u32_from_row(
    row: &sqlx::sqlite::SqliteRow,
    field: &'static str,
) -> Result<u32, StorageError> {
    let raw: i64 = row.try_get(field).map_err(ser)?;
    i64_to_u32(field, raw)
}

pub(crate) fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> Result<ProgressRecord, StorageError> {
    let completed_at: DateTime<Utc> = row.try_get("completed_at").map_err(ser)?;
    ProgressRecord::new(
        user_id_from_i64(row.try_get("user_id").map_err(ser)?)?,
        lesson_id_from_i64(row.try_get("lesson_id").map_err(ser)?)?,
        u32_from_row(row, "score")?,
        completed_at,
        u32_from_row(row, "time_spent_seconds")?,
        u32_from_row(row, "mistakes")?,
    )
    .map_err(ser)
}

pub(crate) fn map_feedback_row(row: &sqlx::sqlite::SqliteRow) -> Result<FeedbackRecord, StorageError> {
    let rating_raw: i64 = row.try_get("rating").map_err(ser)?;
    let rating = u8::try_from(rating_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid rating: {rating_raw}")))?;
    let difficulty_raw: String = row.try_get("difficulty").map_err(ser)?;
    let difficulty = Difficulty::parse(&difficulty_raw).map_err(ser)?;

    FeedbackRecord::new(
        user_id_from_i64(row.try_get("user_id").map_err(ser)?)?,
        lesson_id_from_i64(row.try_get("lesson_id").map_err(ser)?)?,
        rating,
        difficulty,
        row.try_get::<Option<String>, _>("comments").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_lesson_row(row: &sqlx::sqlite::SqliteRow) -> Result<LessonRef, StorageError> {
    Ok(LessonRef {
        id: lesson_id_from_i64(row.try_get("id").map_err(ser)?)?,
        title: row.try_get("title").map_err(ser)?,
        language: row.try_get("language").map_err(ser)?,
        age_group: u32_from_row(row, "age_group")?,
        category: row.try_get("category").map_err(ser)?,
    })
}

/// Profile string lists are stored as JSON arrays.
pub(crate) fn list_to_json(values: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(values).map_err(ser)
}

fn list_from_json(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_profile_row(row: &sqlx::sqlite::SqliteRow) -> Result<AdaptiveProfile, StorageError> {
    let strengths: String = row.try_get("strengths").map_err(ser)?;
    let weaknesses: String = row.try_get("weaknesses").map_err(ser)?;
    let topics: String = row.try_get("topic_preferences").map_err(ser)?;

    Ok(AdaptiveProfile {
        user_id: user_id_from_i64(row.try_get("user_id").map_err(ser)?)?,
        current_level: u32_from_row(row, "current_level")?,
        strengths: list_from_json(&strengths)?,
        weaknesses: list_from_json(&weaknesses)?,
        preferences: LearningPreferences {
            preferred_time: row.try_get("preferred_time").map_err(ser)?,
            daily_goal_minutes: u32_from_row(row, "daily_goal_minutes")?,
            topic_preferences: list_from_json(&topics)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_are_rejected() {
        assert!(matches!(
            user_id_from_i64(-1),
            Err(StorageError::Serialization(_))
        ));
        assert_eq!(lesson_id_from_i64(12).unwrap(), LessonId::new(12));
    }

    #[test]
    fn ids_beyond_i64_are_rejected() {
        assert!(id_i64("user_id", u64::MAX).is_err());
        assert_eq!(id_i64("user_id", 5).unwrap(), 5);
    }

    #[test]
    fn string_lists_round_trip_as_json() {
        let values = vec!["grammar".to_string(), "numbers".to_string()];
        let raw = list_to_json(&values).unwrap();
        assert_eq!(raw, r#"["grammar","numbers"]"#);
        assert_eq!(list_from_json(&raw).unwrap(), values);
        assert!(list_from_json("not json").is_err());
    }
}
