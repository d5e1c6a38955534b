// ABOUTME: Liftoff CLI - operator tool for the ranking and progression engine
// ABOUTME: Seeds the achievement catalog, recomputes progression and prints rankings as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness
//!
//! Usage:
//! ```bash
//! # Seed the reference achievement catalog
//! liftoff-cli achievements seed
//!
//! # Run the progression pipeline after a workout was logged
//! liftoff-cli workout changed --user <uuid> --workout <uuid> --kind created
//!
//! # Show a user's ranking breakdown
//! liftoff-cli ranking show --user <uuid>
//!
//! # Second page of the chest leaderboard, including the viewer's standing
//! liftoff-cli ranking leaderboard --scope Chest --page 2 --viewer <uuid>
//!
//! # Recompute one challenge for a user
//! liftoff-cli challenges progress --user <uuid> --challenge <uuid>
//! ```

mod commands;
mod helpers;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use liftoff_server::config::{ProgressionConfig, ServerConfig};
use liftoff_server::database::{Database, ProgressionStore};
use liftoff_server::logging::LoggingConfig;
use liftoff_server::models::{AchievementCategory, ParticipationStatus, RecordType};
use liftoff_server::realtime::BroadcastSync;
use liftoff_server::services::ProgressionService;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "liftoff-cli",
    about = "Liftoff progression engine CLI",
    long_about = "Operator tool for seeding, recomputing and inspecting Liftoff rankings, records, achievements and challenges."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Workout change pipeline
    Workout {
        #[command(subcommand)]
        action: WorkoutCommand,
    },

    /// Ranking queries and recomputation
    Ranking {
        #[command(subcommand)]
        action: RankingCommand,
    },

    /// Personal record queries
    Records {
        #[command(subcommand)]
        action: RecordsCommand,
    },

    /// Achievement catalog and unlocks
    Achievements {
        #[command(subcommand)]
        action: AchievementsCommand,
    },

    /// Challenge progress and listings
    Challenges {
        #[command(subcommand)]
        action: ChallengesCommand,
    },
}

/// Kind of workout change to replay
#[derive(Clone, Copy, ValueEnum)]
enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

#[derive(Subcommand)]
enum WorkoutCommand {
    /// Run the progression pipeline for a workout change
    Changed {
        /// Workout owner
        #[arg(long)]
        user: Uuid,

        /// Workout that changed
        #[arg(long)]
        workout: Uuid,

        /// What happened to the workout
        #[arg(long, value_enum, default_value = "created")]
        kind: ChangeKind,
    },
}

#[derive(Subcommand)]
enum RankingCommand {
    /// Recompute and store a user's ranking rows
    Recompute {
        #[arg(long)]
        user: Uuid,
    },

    /// Show a freshly computed breakdown and the stored rows
    Show {
        #[arg(long)]
        user: Uuid,
    },

    /// Show the legacy MMR and tier
    Legacy {
        #[arg(long)]
        user: Uuid,
    },

    /// Show one page of a leaderboard
    Leaderboard {
        /// "overall" or a muscle group name
        #[arg(long, default_value = "overall")]
        scope: String,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "50")]
        per_page: u32,

        /// Include this user's standing
        #[arg(long)]
        viewer: Option<Uuid>,
    },

    /// Show a user and their friends ranked in one scope
    Friends {
        #[arg(long)]
        user: Uuid,

        #[arg(long, default_value = "overall")]
        scope: String,
    },
}

#[derive(Subcommand)]
enum RecordsCommand {
    /// List a user's personal records, newest first
    List {
        #[arg(long)]
        user: Uuid,

        /// Only this exercise
        #[arg(long)]
        exercise: Option<Uuid>,

        /// Only this record type (max_weight, max_volume, max_reps)
        #[arg(long)]
        record_type: Option<RecordType>,
    },

    /// Latest records per exercise grouped by muscle group
    Summary {
        #[arg(long)]
        user: Uuid,
    },
}

#[derive(Subcommand)]
enum AchievementsCommand {
    /// Insert the reference catalog, skipping existing names
    Seed,

    /// List achievements with the user's status and progress
    List {
        #[arg(long)]
        user: Uuid,

        #[arg(long)]
        category: Option<AchievementCategory>,

        #[arg(long)]
        unlocked_only: bool,
    },

    /// Evaluate the catalog and unlock what the user has earned
    Evaluate {
        #[arg(long)]
        user: Uuid,
    },

    /// Locked achievements the user is close to
    Near {
        #[arg(long)]
        user: Uuid,
    },
}

#[derive(Subcommand)]
enum ChallengesCommand {
    /// Joinable challenges
    List {
        /// Include challenges outside their window
        #[arg(long)]
        all: bool,
    },

    /// Recompute a user's challenge progress
    Progress {
        #[arg(long)]
        user: Uuid,

        /// Only this challenge, even when it is no longer running
        #[arg(long)]
        challenge: Option<Uuid>,
    },

    /// A user's participations
    Mine {
        #[arg(long)]
        user: Uuid,

        /// active, completed or all
        #[arg(long, default_value = "active")]
        status: ParticipationStatus,
    },

    /// Participants of a challenge by progress
    Leaderboard {
        #[arg(long)]
        challenge: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    let logging = if cli.verbose {
        logging.with_level("debug")
    } else {
        logging
    };
    logging.init()?;

    let mut server = ServerConfig::from_env()?;
    if let Some(url) = cli.database_url {
        server.database_url = url;
    }

    info!(database.url = %server.database_url, "Connecting to database");
    let database = Database::new(&server.database_url).await?;
    let store: Arc<dyn ProgressionStore> = Arc::new(database);
    let config = Arc::new(ProgressionConfig::global().clone());

    let mut service = ProgressionService::new(store, config);
    if server.realtime_sync {
        service = service.with_sync(Arc::new(BroadcastSync::new(server.sync_channel_size)));
    }

    match cli.command {
        Command::Workout { action } => match action {
            WorkoutCommand::Changed {
                user,
                workout,
                kind,
            } => commands::pipeline::workout_changed(&service, user, workout, kind).await?,
        },
        Command::Ranking { action } => match action {
            RankingCommand::Recompute { user } => {
                commands::ranking::recompute(&service, user).await?;
            }
            RankingCommand::Show { user } => commands::ranking::show(&service, user).await?,
            RankingCommand::Legacy { user } => commands::ranking::legacy(&service, user).await?,
            RankingCommand::Leaderboard {
                scope,
                page,
                per_page,
                viewer,
            } => {
                commands::ranking::leaderboard(&service, &scope, page, per_page, viewer).await?;
            }
            RankingCommand::Friends { user, scope } => {
                commands::ranking::friends(&service, user, &scope).await?;
            }
        },
        Command::Records { action } => match action {
            RecordsCommand::List {
                user,
                exercise,
                record_type,
            } => commands::records::list(&service, user, exercise, record_type).await?,
            RecordsCommand::Summary { user } => commands::records::summary(&service, user).await?,
        },
        Command::Achievements { action } => match action {
            AchievementsCommand::Seed => commands::achievements::seed(&service).await?,
            AchievementsCommand::List {
                user,
                category,
                unlocked_only,
            } => commands::achievements::list(&service, user, category, unlocked_only).await?,
            AchievementsCommand::Evaluate { user } => {
                commands::achievements::evaluate(&service, user).await?;
            }
            AchievementsCommand::Near { user } => {
                commands::achievements::near(&service, user).await?;
            }
        },
        Command::Challenges { action } => match action {
            ChallengesCommand::List { all } => commands::challenges::list(&service, all).await?,
            ChallengesCommand::Progress { user, challenge } => {
                commands::challenges::progress(&service, user, challenge).await?;
            }
            ChallengesCommand::Mine { user, status } => {
                commands::challenges::mine(&service, user, status).await?;
            }
            ChallengesCommand::Leaderboard { challenge } => {
                commands::challenges::leaderboard(&service, challenge).await?;
            }
        },
    }

    Ok(())
}
