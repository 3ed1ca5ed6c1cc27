use chrono::Duration;
use engage_core::model::{
    Activity, ActivityKind, AdaptiveProfile, Difficulty, FeedbackRecord, ItemId, LessonId,
    LessonRef, ProgressRecord, SessionRecord, UserId,
};
use engage_core::recommend::CatalogFilter;
use engage_core::time::fixed_now;
use storage::repository::{
    CatalogRepository, FeedbackRepository, ProfileRepository, ProgressRepository,
    SessionRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn lesson(id: u64, language: &str, age_group: u32) -> LessonRef {
    LessonRef::new(LessonId::new(id), format!("Lesson {id}"), language, age_group)
}

#[tokio::test]
async fn sessions_keep_activities_in_order() {
    let repo = connect("memdb_sessions").await;
    let user = UserId::new(1);
    let start = fixed_now() - Duration::hours(3);

    let session = SessionRecord::new(
        user,
        start,
        Some(start + Duration::minutes(25)),
        vec![
            Activity::new(ActivityKind::Lesson, ItemId::new(4), 600, true),
            Activity::new(ActivityKind::Chat, ItemId::new(9), 300, false),
            Activity::new(ActivityKind::Practice, ItemId::new(2), 500, true),
        ],
    )
    .unwrap();
    let open = SessionRecord::new(user, fixed_now(), None, Vec::new()).unwrap();
    let old = SessionRecord::new(user, fixed_now() - Duration::days(30), None, Vec::new()).unwrap();

    repo.append_session(&open).await.unwrap();
    repo.append_session(&session).await.unwrap();
    repo.append_session(&old).await.unwrap();

    let recent = repo
        .fetch_sessions(user, Some(fixed_now() - Duration::days(7)))
        .await
        .unwrap();
    assert_eq!(recent, vec![session.clone(), open.clone()]);
    assert!(!recent[1].is_terminated());

    let all = repo.fetch_sessions(user, None).await.unwrap();
    assert_eq!(all, vec![old, session, open]);
    assert!(repo.fetch_sessions(UserId::new(2), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn progress_and_feedback_round_trip() {
    let repo = connect("memdb_records").await;
    let user = UserId::new(7);

    let first =
        ProgressRecord::new(user, LessonId::new(1), 65, fixed_now() - Duration::days(2), 420, 3)
            .unwrap();
    let second =
        ProgressRecord::new(user, LessonId::new(2), 100, fixed_now() - Duration::days(1), 180, 0)
            .unwrap();
    repo.append_progress(&second).await.unwrap();
    repo.append_progress(&first).await.unwrap();
    assert_eq!(
        repo.fetch_progress(user, None).await.unwrap(),
        vec![first.clone(), second.clone()]
    );

    let window_start = fixed_now() - Duration::days(1);
    assert_eq!(
        repo.fetch_progress(user, Some(window_start)).await.unwrap(),
        vec![second]
    );

    let feedback = FeedbackRecord::new(
        user,
        LessonId::new(1),
        2,
        Difficulty::TooHard,
        Some("too fast".into()),
        fixed_now(),
    )
    .unwrap();
    repo.append_feedback(&feedback).await.unwrap();
    assert_eq!(repo.fetch_feedback(user, None).await.unwrap(), vec![feedback]);
}

#[tokio::test]
async fn profiles_upsert_and_miss() {
    let repo = connect("memdb_profiles").await;
    let user = UserId::new(3);
    assert!(repo.fetch_profile(user).await.unwrap().is_none());

    let mut profile = AdaptiveProfile::fallback(user, 2);
    profile.weaknesses = vec!["grammar".into()];
    profile.preferences.topic_preferences = vec!["rw".into(), "en".into()];
    repo.upsert_profile(&profile).await.unwrap();
    assert_eq!(repo.fetch_profile(user).await.unwrap(), Some(profile.clone()));

    profile.current_level = 3;
    profile.strengths = vec!["vocabulary".into()];
    profile.preferences.preferred_time = Some("morning".into());
    repo.upsert_profile(&profile).await.unwrap();
    assert_eq!(repo.fetch_profile(user).await.unwrap(), Some(profile));
}

#[tokio::test]
async fn catalog_query_applies_filter_in_id_order() {
    let repo = connect("memdb_catalog").await;
    for l in [
        lesson(6, "rw", 1),
        lesson(1, "rw", 1),
        lesson(2, "en", 1),
        lesson(3, "rw", 3),
        lesson(4, "rw", 2).with_category("grammar"),
        lesson(5, "fr", 1),
    ] {
        repo.upsert_lesson(&l).await.unwrap();
    }

    let filter = CatalogFilter {
        exclude_ids: [LessonId::new(6)].into_iter().collect(),
        max_age_group: 2,
        languages: vec!["rw".into(), "en".into()],
    };
    let ids: Vec<u64> = repo
        .fetch_catalog(&filter, 5)
        .await
        .unwrap()
        .iter()
        .map(|l| l.id.value())
        .collect();
    assert_eq!(ids, vec![1, 2, 4]);

    let capped = repo.fetch_catalog(&filter, 2).await.unwrap();
    assert_eq!(capped.len(), 2);

    let any_language = CatalogFilter {
        exclude_ids: Default::default(),
        max_age_group: 1,
        languages: Vec::new(),
    };
    let ids: Vec<u64> = repo
        .fetch_catalog(&any_language, 10)
        .await
        .unwrap()
        .iter()
        .map(|l| l.id.value())
        .collect();
    assert_eq!(ids, vec![1, 2, 5, 6]);

    let picked = repo
        .fetch_lessons(&[LessonId::new(4), LessonId::new(99)])
        .await
        .unwrap();
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].category.as_deref(), Some("grammar"));
}
