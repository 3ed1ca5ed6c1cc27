use chrono::{DateTime, Utc};
use engage_core::model::{Activity, ActivityKind, SessionRecord, UserId};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{conn, id_i64, item_id_from_i64, ser, u32_from_row},
};
use crate::repository::{SessionRepository, StorageError};

/// Session header plus the activities collected for it so far.
struct PendingSession {
    id: i64,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    activities: Vec<Activity>,
}

impl PendingSession {
    fn finish(self, user_id: UserId) -> Result<SessionRecord, StorageError> {
        SessionRecord::new(user_id, self.started_at, self.ended_at, self.activities).map_err(ser)
    }
}

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn fetch_sessions(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let user = id_i64("user_id", user_id.value())?;

        let rows = sqlx::query(
            r"
                SELECT
                    s.id, s.started_at, s.ended_at,
                    a.kind, a.item_id, a.duration_seconds, a.completed
                FROM sessions s
                LEFT JOIN session_activities a ON a.session_id = s.id
                WHERE s.user_id = ?1 AND (?2 IS NULL OR s.started_at >= ?2)
                ORDER BY s.started_at ASC, s.id ASC, a.position ASC
            ",
        )
        .bind(user)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::new();
        let mut pending: Option<PendingSession> = None;
        for row in rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            if pending.as_ref().is_none_or(|p| p.id != id) {
                if let Some(done) = pending.take() {
                    out.push(done.finish(user_id)?);
                }
                pending = Some(PendingSession {
                    id,
                    started_at: row.try_get("started_at").map_err(ser)?,
                    ended_at: row.try_get("ended_at").map_err(ser)?,
                    activities: Vec::new(),
                });
            }

            let kind: Option<String> = row.try_get("kind").map_err(ser)?;
            let (Some(kind), Some(current)) = (kind, pending.as_mut()) else {
                continue;
            };
            let completed: i64 = row.try_get("completed").map_err(ser)?;
            current.activities.push(Activity::new(
                ActivityKind::parse(&kind).map_err(ser)?,
                item_id_from_i64(row.try_get("item_id").map_err(ser)?)?,
                u32_from_row(&row, "duration_seconds")?,
                completed != 0,
            ));
        }
        if let Some(done) = pending {
            out.push(done.finish(user_id)?);
        }
        Ok(out)
    }

    async fn append_session(&self, session: &SessionRecord) -> Result<i64, StorageError> {
        let user = id_i64("user_id", session.user_id().value())?;

        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                INSERT INTO sessions (user_id, started_at, ended_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(user)
        .bind(session.started_at())
        .bind(session.ended_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
        let session_id = res.last_insert_rowid();

        for (position, activity) in session.activities().iter().enumerate() {
            let position = id_i64("position", position as u64)?;
            sqlx::query(
                r"
                    INSERT INTO session_activities (
                        session_id, position, kind, item_id, duration_seconds, completed
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(session_id)
            .bind(position)
            .bind(activity.kind.as_str())
            .bind(id_i64("item_id", activity.item_id.value())?)
            .bind(i64::from(activity.duration_seconds))
            .bind(activity.completed)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(session_id)
    }
}
