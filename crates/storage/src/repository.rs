use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engage_core::model::{
    AdaptiveProfile, FeedbackRecord, LessonId, LessonRef, ProgressRecord, SessionRecord, UserId,
};
use engage_core::recommend::CatalogFilter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

fn lock_error<T>(_: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Connection("in-memory store lock poisoned".into())
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Read/append access to session records.
///
/// `since = None` reads the whole history. Results are ordered by
/// `started_at`, oldest first.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Sessions of `user_id` that started at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn fetch_sessions(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SessionRecord>, StorageError>;

    /// Append a session with its activities.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn append_session(&self, session: &SessionRecord) -> Result<i64, StorageError>;
}

/// Read/append access to lesson attempts, oldest first.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Attempts of `user_id` completed at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn fetch_progress(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ProgressRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_progress(&self, record: &ProgressRecord) -> Result<i64, StorageError>;
}

/// Read/append access to lesson feedback, oldest first.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Feedback of `user_id` created at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn fetch_feedback(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<FeedbackRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the feedback cannot be stored.
    async fn append_feedback(&self, record: &FeedbackRecord) -> Result<i64, StorageError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the adaptive profile, if the learner has one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<AdaptiveProfile>, StorageError>;

    /// Insert or replace the learner's profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_profile(&self, profile: &AdaptiveProfile) -> Result<(), StorageError>;
}

/// Lesson catalog. Catalog order is ascending lesson id.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// First `limit` lessons matching `filter`, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn fetch_catalog(
        &self,
        filter: &CatalogFilter,
        limit: usize,
    ) -> Result<Vec<LessonRef>, StorageError>;

    /// Lessons with the given ids; unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn fetch_lessons(&self, ids: &[LessonId]) -> Result<Vec<LessonRef>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn upsert_lesson(&self, lesson: &LessonRef) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<Vec<SessionRecord>>>,
    progress: Arc<Mutex<Vec<ProgressRecord>>>,
    feedback: Arc<Mutex<Vec<FeedbackRecord>>>,
    profiles: Arc<Mutex<HashMap<UserId, AdaptiveProfile>>>,
    lessons: Arc<Mutex<Vec<LessonRef>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_window(at: DateTime<Utc>, since: Option<DateTime<Utc>>) -> bool {
    since.is_none_or(|since| at >= since)
}

fn row_id(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn fetch_sessions(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let guard = self.sessions.lock().map_err(lock_error)?;
        let mut found: Vec<SessionRecord> = guard
            .iter()
            .filter(|s| s.user_id() == user_id && in_window(s.started_at(), since))
            .cloned()
            .collect();
        found.sort_by_key(SessionRecord::started_at);
        Ok(found)
    }

    async fn append_session(&self, session: &SessionRecord) -> Result<i64, StorageError> {
        let mut guard = self.sessions.lock().map_err(lock_error)?;
        guard.push(session.clone());
        Ok(row_id(guard.len()))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn fetch_progress(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(lock_error)?;
        let mut found: Vec<ProgressRecord> = guard
            .iter()
            .filter(|p| p.user_id() == user_id && in_window(p.completed_at(), since))
            .cloned()
            .collect();
        found.sort_by_key(ProgressRecord::completed_at);
        Ok(found)
    }

    async fn append_progress(&self, record: &ProgressRecord) -> Result<i64, StorageError> {
        let mut guard = self.progress.lock().map_err(lock_error)?;
        guard.push(record.clone());
        Ok(row_id(guard.len()))
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryRepository {
    async fn fetch_feedback(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<FeedbackRecord>, StorageError> {
        let guard = self.feedback.lock().map_err(lock_error)?;
        let mut found: Vec<FeedbackRecord> = guard
            .iter()
            .filter(|f| f.user_id() == user_id && in_window(f.created_at(), since))
            .cloned()
            .collect();
        found.sort_by_key(FeedbackRecord::created_at);
        Ok(found)
    }

    async fn append_feedback(&self, record: &FeedbackRecord) -> Result<i64, StorageError> {
        let mut guard = self.feedback.lock().map_err(lock_error)?;
        guard.push(record.clone());
        Ok(row_id(guard.len()))
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<AdaptiveProfile>, StorageError> {
        let guard = self.profiles.lock().map_err(lock_error)?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &AdaptiveProfile) -> Result<(), StorageError> {
        let mut guard = self.profiles.lock().map_err(lock_error)?;
        guard.insert(profile.user_id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn fetch_catalog(
        &self,
        filter: &CatalogFilter,
        limit: usize,
    ) -> Result<Vec<LessonRef>, StorageError> {
        let guard = self.lessons.lock().map_err(lock_error)?;
        Ok(engage_core::recommend::select_next_lessons(
            guard.iter().cloned(),
            filter,
            limit,
        ))
    }

    async fn fetch_lessons(&self, ids: &[LessonId]) -> Result<Vec<LessonRef>, StorageError> {
        let guard = self.lessons.lock().map_err(lock_error)?;
        Ok(guard.iter().filter(|l| ids.contains(&l.id)).cloned().collect())
    }

    async fn upsert_lesson(&self, lesson: &LessonRef) -> Result<(), StorageError> {
        let mut guard = self.lessons.lock().map_err(lock_error)?;
        match guard.binary_search_by_key(&lesson.id, |l| l.id) {
            Ok(pos) => guard[pos] = lesson.clone(),
            Err(pos) => guard.insert(pos, lesson.clone()),
        }
        Ok(())
    }
}

/// Aggregates the record repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Wire every repository slot to clones of one backend.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: SessionRepository
            + ProgressRepository
            + FeedbackRepository
            + ProfileRepository
            + CatalogRepository
            + Clone
            + 'static,
    {
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let feedback: Arc<dyn FeedbackRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo);
        Self {
            sessions,
            progress,
            feedback,
            profiles,
            catalog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use engage_core::model::{Activity, ActivityKind, Difficulty, ItemId};
    use engage_core::time::fixed_now;

    fn session(user: u64, hours_ago: i64) -> SessionRecord {
        let start = fixed_now() - Duration::hours(hours_ago);
        SessionRecord::new(
            UserId::new(user),
            start,
            Some(start + Duration::minutes(20)),
            vec![Activity::new(ActivityKind::Chat, ItemId::new(1), 600, true)],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sessions_are_filtered_by_user_and_window() {
        let repo = InMemoryRepository::new();
        repo.append_session(&session(1, 2)).await.unwrap();
        repo.append_session(&session(1, 24 * 10)).await.unwrap();
        repo.append_session(&session(2, 1)).await.unwrap();

        let since = fixed_now() - Duration::days(7);
        let recent = repo.fetch_sessions(UserId::new(1), Some(since)).await.unwrap();
        assert_eq!(recent.len(), 1);

        let all = repo.fetch_sessions(UserId::new(1), None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].started_at() < all[1].started_at());
    }

    #[tokio::test]
    async fn window_start_is_inclusive() {
        let repo = InMemoryRepository::new();
        let at = fixed_now() - Duration::days(7);
        let record =
            ProgressRecord::new(UserId::new(1), LessonId::new(1), 50, at, 60, 0).unwrap();
        repo.append_progress(&record).await.unwrap();

        let found = repo.fetch_progress(UserId::new(1), Some(at)).await.unwrap();
        assert_eq!(found, vec![record]);
    }

    #[tokio::test]
    async fn feedback_round_trips() {
        let repo = InMemoryRepository::new();
        let record = FeedbackRecord::new(
            UserId::new(3),
            LessonId::new(2),
            5,
            Difficulty::TooEasy,
            Some("fun".into()),
            fixed_now(),
        )
        .unwrap();
        repo.append_feedback(&record).await.unwrap();
        assert_eq!(
            repo.fetch_feedback(UserId::new(3), None).await.unwrap(),
            vec![record]
        );
        assert!(repo.fetch_feedback(UserId::new(4), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn catalog_keeps_id_order_and_replaces_on_upsert() {
        let repo = InMemoryRepository::new();
        for id in [3, 1, 2] {
            repo.upsert_lesson(&LessonRef::new(LessonId::new(id), "old", "en", 1))
                .await
                .unwrap();
        }
        repo.upsert_lesson(&LessonRef::new(LessonId::new(2), "new", "en", 1))
            .await
            .unwrap();

        let profile = AdaptiveProfile::fallback(UserId::new(1), 1);
        let filter = CatalogFilter::for_profile(&profile, Vec::new());
        let lessons = repo.fetch_catalog(&filter, 10).await.unwrap();
        let ids: Vec<_> = lessons.iter().map(|l| l.id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(lessons[1].title, "new");

        let picked = repo
            .fetch_lessons(&[LessonId::new(3), LessonId::new(9)])
            .await
            .unwrap();
        assert_eq!(picked.len(), 1);
    }

    #[tokio::test]
    async fn profile_upsert_replaces() {
        let repo = InMemoryRepository::new();
        assert!(repo.fetch_profile(UserId::new(1)).await.unwrap().is_none());

        let mut profile = AdaptiveProfile::fallback(UserId::new(1), 1);
        repo.upsert_profile(&profile).await.unwrap();
        profile.current_level = 4;
        repo.upsert_profile(&profile).await.unwrap();

        let stored = repo.fetch_profile(UserId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.current_level, 4);
    }
}
