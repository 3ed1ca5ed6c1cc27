use chrono::{DateTime, Utc};
use engage_core::model::{FeedbackRecord, UserId};

use super::{
    SqliteRepository,
    mapping::{conn, id_i64, map_feedback_row},
};
use crate::repository::{FeedbackRepository, StorageError};

#[async_trait::async_trait]
impl FeedbackRepository for SqliteRepository {
    async fn fetch_feedback(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<FeedbackRecord>, StorageError> {
        let user = id_i64("user_id", user_id.value())?;

        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, lesson_id, rating, difficulty, comments, created_at
                FROM feedback
                WHERE user_id = ?1 AND (?2 IS NULL OR created_at >= ?2)
                ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_feedback_row(&row)?);
        }
        Ok(out)
    }

    async fn append_feedback(&self, record: &FeedbackRecord) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO feedback (
                    user_id, lesson_id, rating, difficulty, comments, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(id_i64("user_id", record.user_id().value())?)
        .bind(id_i64("lesson_id", record.lesson_id().value())?)
        .bind(i64::from(record.rating()))
        .bind(record.difficulty().as_str())
        .bind(record.comments())
        .bind(record.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }
}
