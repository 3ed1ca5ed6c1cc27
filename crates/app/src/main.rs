//! `engage`: compute engagement metrics and recommendations for a learner.

mod config;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use engage_core::model::{Difficulty, LessonId, UserId};
use serde::Serialize;
use services::{AppServices, Clock, LearningPath};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "engage", version, about = "Learner engagement metrics and recommendations")]
struct Cli {
    /// `SQLite` database URL.
    #[arg(long, env = "ENGAGE_DB_URL", default_value = "sqlite:dev.sqlite3?mode=rwc")]
    db: String,

    /// TOML file overriding engagement tuning values.
    #[arg(long, env = "ENGAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Evaluate as if the current time were this RFC 3339 timestamp.
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Engagement metrics over the trailing window.
    Metrics {
        #[arg(long)]
        user: u64,
    },
    /// Next lessons, review lessons and suggested topics.
    Recommend {
        #[arg(long)]
        user: u64,
    },
    /// Per-day activity for the most recent active days.
    Weekly {
        #[arg(long)]
        user: u64,
    },
    /// Weekly activity, engagement and study advice.
    Insights {
        #[arg(long)]
        user: u64,
    },
    /// Recommendations with insights and the next review time.
    Content {
        #[arg(long)]
        user: u64,
    },
    /// Submit lesson feedback and refresh strengths.
    Feedback {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        lesson: u64,
        /// Rating from 1 to 5.
        #[arg(long)]
        rating: u8,
        /// One of `too_easy`, `just_right`, `too_hard`.
        #[arg(long, default_value = "just_right")]
        difficulty: String,
        #[arg(long)]
        comments: Option<String>,
    },
    /// Re-derive strengths and weaknesses from all attempts.
    RefreshStrengths {
        #[arg(long)]
        user: u64,
    },
    /// Replace the learning path with the JSON document at `--file`.
    LearningPath {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        file: PathBuf,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("encode output")?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;
    let clock = cli.now.map_or_else(Clock::default_clock, Clock::fixed);
    debug!(db = %cli.db, fixed_clock = clock.is_fixed(), "starting");

    let app = AppServices::new_sqlite(&cli.db, clock, &config)
        .await
        .with_context(|| format!("open {}", cli.db))?;

    match cli.command {
        Command::Metrics { user } => {
            let metrics = app
                .engagement()
                .get_engagement_metrics(UserId::new(user))
                .await?;
            print_json(&metrics)
        }
        Command::Recommend { user } => {
            let set = app
                .recommendations()
                .get_recommendations(UserId::new(user))
                .await?;
            print_json(&set)
        }
        Command::Weekly { user } => {
            let weekly = app.insights().weekly_activity(UserId::new(user)).await?;
            print_json(&weekly)
        }
        Command::Insights { user } => {
            let insights = app
                .insights()
                .personalized_insights(UserId::new(user))
                .await?;
            print_json(&insights)
        }
        Command::Content { user } => {
            let content = app
                .insights()
                .personalized_content(UserId::new(user))
                .await?;
            print_json(&content)
        }
        Command::Feedback {
            user,
            lesson,
            rating,
            difficulty,
            comments,
        } => {
            let difficulty = Difficulty::parse(&difficulty)?;
            let record = app
                .profiles()
                .submit_feedback(
                    UserId::new(user),
                    LessonId::new(lesson),
                    rating,
                    difficulty,
                    comments,
                )
                .await?;
            print_json(&record)
        }
        Command::RefreshStrengths { user } => {
            let profile = app.profiles().refresh_strengths(UserId::new(user)).await?;
            print_json(&profile)
        }
        Command::LearningPath { user, file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let path: LearningPath = serde_json::from_str(&raw)
                .with_context(|| format!("parse learning path {}", file.display()))?;
            let profile = app
                .profiles()
                .update_learning_path(UserId::new(user), path)
                .await?;
            print_json(&profile)
        }
    }
}
