#![forbid(unsafe_code)]

pub mod app_services;
pub mod engagement_service;
pub mod error;
pub mod insights_service;
pub mod profile_service;
pub mod recommendation_service;
pub mod tracking_service;

pub use engage_core::Clock;

pub use app_services::AppServices;
pub use engagement_service::EngagementService;
pub use error::{
    AppServicesError, EngagementError, InsightsError, ProfileServiceError, RecommendationError,
    TrackingError,
};
pub use insights_service::{InsightsService, PersonalizedContent, PersonalizedInsights};
pub use profile_service::{LearningPath, ProfileService};
pub use recommendation_service::RecommendationService;
pub use tracking_service::{LessonAttempt, TrackingService};
