use chrono::{DateTime, Utc};
use engage_core::model::{ProgressRecord, UserId};

use super::{
    SqliteRepository,
    mapping::{conn, id_i64, map_progress_row},
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn fetch_progress(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let user = id_i64("user_id", user_id.value())?;

        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, lesson_id, score, completed_at, time_spent_seconds, mistakes
                FROM progress
                WHERE user_id = ?1 AND (?2 IS NULL OR completed_at >= ?2)
                ORDER BY completed_at ASC, id ASC
            ",
        )
        .bind(user)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_progress_row(&row)?);
        }
        Ok(out)
    }

    async fn append_progress(&self, record: &ProgressRecord) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO progress (
                    user_id, lesson_id, score, completed_at, time_spent_seconds, mistakes
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(id_i64("user_id", record.user_id().value())?)
        .bind(id_i64("lesson_id", record.lesson_id().value())?)
        .bind(i64::from(record.score()))
        .bind(record.completed_at())
        .bind(i64::from(record.time_spent_seconds()))
        .bind(i64::from(record.mistakes()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }
}
