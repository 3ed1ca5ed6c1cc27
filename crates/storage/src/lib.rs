#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    CatalogRepository, FeedbackRepository, InMemoryRepository, ProfileRepository,
    ProgressRepository, SessionRepository, Storage, StorageError,
};
