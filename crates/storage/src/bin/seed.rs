//! Populate a database with a small demo catalog and one learner's history.
//!
//! ```text
//! cargo run -p storage --bin seed -- --db sqlite:dev.sqlite3 --user 1
//! ```

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use engage_core::model::{
    Activity, ActivityKind, AdaptiveProfile, Difficulty, FeedbackRecord, ItemId,
    LearningPreferences, LessonId, LessonRef, ProgressRecord, SessionRecord, UserId,
};
use storage::repository::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Seed a demo catalog and learner history")]
struct Args {
    /// `SQLite` URL to write to.
    #[arg(long, env = "ENGAGE_DB_URL", default_value = "sqlite:dev.sqlite3?mode=rwc")]
    db: String,

    /// Learner to generate history for.
    #[arg(long, default_value_t = 1)]
    user: u64,

    /// Number of daily sessions to append, ending at `--now`.
    #[arg(long, default_value_t = 5)]
    sessions: u32,

    /// Reference time (RFC 3339). Defaults to the current time.
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

fn demo_catalog() -> Vec<LessonRef> {
    [
        (1, "Greetings", "rw", 1, "vocabulary"),
        (2, "Numbers", "rw", 1, "vocabulary"),
        (3, "Colours", "en", 1, "vocabulary"),
        (4, "Simple verbs", "rw", 2, "grammar"),
        (5, "Market talk", "rw", 2, "conversation"),
        (6, "Past tense", "en", 3, "grammar"),
        (7, "Story time", "rw", 3, "reading"),
    ]
    .into_iter()
    .map(|(id, title, language, age_group, category)| {
        LessonRef::new(LessonId::new(id), title, language, age_group).with_category(category)
    })
    .collect()
}

fn demo_session(
    user: UserId,
    started_at: DateTime<Utc>,
    index: u32,
) -> anyhow::Result<SessionRecord> {
    let minutes = 10 + i64::from(index % 3) * 5;
    let ended_at = started_at + Duration::minutes(minutes);
    let activities = vec![
        Activity::new(ActivityKind::Lesson, ItemId::new(u64::from(index % 7) + 1), 420, true),
        Activity::new(ActivityKind::Practice, ItemId::new(100 + u64::from(index)), 180, index % 2 == 0),
    ];
    SessionRecord::new(user, started_at, Some(ended_at), activities).context("build session")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let now = args.now.unwrap_or_else(Utc::now);
    let user = UserId::new(args.user);

    let storage = Storage::sqlite(&args.db)
        .await
        .with_context(|| format!("open {}", args.db))?;

    let catalog = demo_catalog();
    for lesson in &catalog {
        storage.catalog.upsert_lesson(lesson).await?;
    }
    info!(lessons = catalog.len(), "catalog seeded");

    for index in 0..args.sessions {
        let started_at = now - Duration::days(i64::from(args.sessions - index)) + Duration::hours(18);
        let session = demo_session(user, started_at, index)?;
        storage.sessions.append_session(&session).await?;
    }
    info!(count = args.sessions, "sessions appended");

    let attempts = [(1, 92), (2, 64), (3, 55), (4, 81)];
    for (offset, (lesson, score)) in (1_i64..).zip(attempts) {
        let record = ProgressRecord::new(
            user,
            LessonId::new(lesson),
            score,
            now - Duration::days(offset),
            300,
            100_u32.saturating_sub(score) / 10,
        )?;
        storage.progress.append_progress(&record).await?;
    }

    let feedback = FeedbackRecord::new(
        user,
        LessonId::new(2),
        4,
        Difficulty::JustRight,
        Some("Numbers were fun".to_owned()),
        now - Duration::days(2),
    )?;
    storage.feedback.append_feedback(&feedback).await?;

    let profile = AdaptiveProfile {
        user_id: user,
        current_level: 2,
        strengths: Vec::new(),
        weaknesses: vec!["grammar".to_owned()],
        preferences: LearningPreferences {
            preferred_time: Some("evening".to_owned()),
            topic_preferences: vec!["rw".to_owned()],
            ..LearningPreferences::default()
        },
    };
    storage.profiles.upsert_profile(&profile).await?;

    info!(user = %user, db = %args.db, "seed complete");
    Ok(())
}
