//! Shared error types for the services crate.

use thiserror::Error;

use engage_core::ConfigError;
use engage_core::model::{FeedbackError, ProgressError, SessionRecordError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `EngagementService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngagementError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RecommendationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecommendationError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `InsightsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InsightsError {
    #[error(transparent)]
    Engagement(#[from] EngagementError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TrackingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackingError {
    #[error(transparent)]
    Session(#[from] SessionRecordError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
