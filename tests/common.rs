// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides store constructors, catalog fixtures and workout builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `liftoff_server`

use std::env;
use std::sync::{Arc, Once};

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use liftoff_server::config::ProgressionConfig;
use liftoff_server::database::{
    Database, InMemoryStore, ProgressionStore, SocialRepository, WorkoutRepository,
};
use liftoff_server::models::{
    ChallengeCategory, ChallengeDefinition, ChallengeType, Difficulty, ExerciseDefinition,
    Friendship, PerformedExercise, WorkoutRecord,
};
use liftoff_server::services::{ProgressionService, WorkoutService};
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fixed reference instant so date arithmetic in tests is deterministic
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 18, 0, 0).unwrap()
}

/// Fresh in-memory store
pub fn create_memory_store() -> Arc<dyn ProgressionStore> {
    init_test_logging();
    Arc::new(InMemoryStore::new())
}

/// Fresh `SQLite` in-memory database with the schema applied
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    Ok(Arc::new(database))
}

/// Progression service over a store with default scoring
pub fn create_progression_service(store: &Arc<dyn ProgressionStore>) -> ProgressionService {
    ProgressionService::new(Arc::clone(store), Arc::new(ProgressionConfig::default()))
}

/// Workout service over a store with default scoring
pub fn create_workout_service(store: &Arc<dyn ProgressionStore>) -> WorkoutService {
    WorkoutService::new(create_progression_service(store))
}

/// Catalog used across tests
pub struct Catalog {
    pub bench_press: ExerciseDefinition,
    pub barbell_row: ExerciseDefinition,
    pub squat: ExerciseDefinition,
    pub pull_up: ExerciseDefinition,
}

/// Insert the shared catalog
pub async fn seed_catalog(store: &Arc<dyn ProgressionStore>) -> Result<Catalog> {
    let catalog = Catalog {
        bench_press: ExerciseDefinition::new("Bench Press", "Chest", true),
        barbell_row: ExerciseDefinition::new("Barbell Row", "Back", true),
        squat: ExerciseDefinition::new("Back Squat", "Legs", true),
        pull_up: ExerciseDefinition::new("Pull Up", "Back", true),
    };
    for exercise in [
        &catalog.bench_press,
        &catalog.barbell_row,
        &catalog.squat,
        &catalog.pull_up,
    ] {
        store.insert_exercise(exercise).await?;
    }
    Ok(catalog)
}

/// Performed entry
pub fn entry(
    exercise: &ExerciseDefinition,
    sets: u32,
    reps: u32,
    weight: Option<f64>,
) -> PerformedExercise {
    PerformedExercise::from_definition(exercise, sets, reps, weight)
}

/// Workout at an explicit instant
pub fn workout_at(
    user_id: Uuid,
    performed_at: DateTime<Utc>,
    exercises: Vec<PerformedExercise>,
) -> WorkoutRecord {
    WorkoutRecord::new(user_id, "Test session", performed_at, exercises)
}

/// Store one workout per day offset (days before `now`)
pub async fn log_workouts_on_days(
    store: &Arc<dyn ProgressionStore>,
    user_id: Uuid,
    now: DateTime<Utc>,
    days_ago: &[i64],
    exercise: &ExerciseDefinition,
) -> Result<Vec<WorkoutRecord>> {
    let mut logged = Vec::with_capacity(days_ago.len());
    for days in days_ago {
        let workout = workout_at(
            user_id,
            now - Duration::days(*days),
            vec![entry(exercise, 3, 10, Some(50.0))],
        );
        store.insert_workout(&workout).await?;
        logged.push(workout);
    }
    Ok(logged)
}

/// Accepted friendship between two users
pub async fn befriend(store: &Arc<dyn ProgressionStore>, a: Uuid, b: Uuid) -> Result<()> {
    store.insert_friendship(&Friendship::accepted(a, b)).await?;
    Ok(())
}

/// Active global community challenge over `[start, end]`
pub fn community_challenge(
    category: ChallengeCategory,
    target_value: u64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> ChallengeDefinition {
    ChallengeDefinition {
        id: Uuid::new_v4(),
        name: "Community push".to_owned(),
        description: "Train together".to_owned(),
        challenge_type: ChallengeType::Community,
        category,
        target_value,
        target_unit: Some("workouts".to_owned()),
        points_reward: 100,
        difficulty: Difficulty::Medium,
        start_date,
        end_date,
        is_active: true,
        is_global: true,
        max_participants: None,
        creator_id: None,
        invited_user_ids: Vec::new(),
        created_at: start_date,
    }
}
