use engage_core::model::{LessonId, LessonRef};
use engage_core::recommend::CatalogFilter;
use sqlx::{QueryBuilder, Sqlite};

use super::{
    SqliteRepository,
    mapping::{conn, id_i64, map_lesson_row},
};
use crate::repository::{CatalogRepository, StorageError};

const LESSON_COLUMNS: &str = "SELECT id, title, language, age_group, category FROM lessons";

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn fetch_catalog(
        &self,
        filter: &CatalogFilter,
        limit: usize,
    ) -> Result<Vec<LessonRef>, StorageError> {
        let excluded = filter
            .exclude_ids
            .iter()
            .map(|id| id_i64("lesson_id", id.value()))
            .collect::<Result<Vec<_>, _>>()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut qb = QueryBuilder::<Sqlite>::new(LESSON_COLUMNS);
        qb.push(" WHERE age_group <= ");
        qb.push_bind(i64::from(filter.max_age_group));

        if !filter.languages.is_empty() {
            qb.push(" AND language IN (");
            let mut langs = qb.separated(", ");
            for language in &filter.languages {
                langs.push_bind(language.clone());
            }
            langs.push_unseparated(")");
        }

        if !excluded.is_empty() {
            qb.push(" AND id NOT IN (");
            let mut ids = qb.separated(", ");
            for id in excluded {
                ids.push_bind(id);
            }
            ids.push_unseparated(")");
        }

        qb.push(" ORDER BY id ASC LIMIT ");
        qb.push_bind(limit);

        let rows = qb.build().fetch_all(&self.pool).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_lesson_row(&row)?);
        }
        Ok(out)
    }

    async fn fetch_lessons(&self, ids: &[LessonId]) -> Result<Vec<LessonRef>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = ids
            .iter()
            .map(|id| id_i64("lesson_id", id.value()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut qb = QueryBuilder::<Sqlite>::new(LESSON_COLUMNS);
        qb.push(" WHERE id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(id);
        }
        sep.push_unseparated(") ORDER BY id ASC");

        let rows = qb.build().fetch_all(&self.pool).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_lesson_row(&row)?);
        }
        Ok(out)
    }

    async fn upsert_lesson(&self, lesson: &LessonRef) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO lessons (id, title, language, age_group, category)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    language = excluded.language,
                    age_group = excluded.age_group,
                    category = excluded.category
            ",
        )
        .bind(id_i64("lesson_id", lesson.id.value())?)
        .bind(lesson.title.as_str())
        .bind(lesson.language.as_str())
        .bind(i64::from(lesson.age_group))
        .bind(lesson.category.as_deref())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
