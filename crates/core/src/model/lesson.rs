use serde::{Deserialize, Serialize};

use crate::model::LessonId;

/// Catalog entry as seen by the recommender.
///
/// Lesson bodies live with the content service; only the fields needed for
/// filtering and grouping are carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRef {
    pub id: LessonId,
    pub title: String,
    pub language: String,
    pub age_group: u32,
    pub category: Option<String>,
}

impl LessonRef {
    #[must_use]
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        language: impl Into<String>,
        age_group: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            language: language.into(),
            age_group,
            category: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
