// ABOUTME: Test utilities for building exercises, workouts and challenges consistently
// ABOUTME: Also wires an in-memory progression service with default scoring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use liftoff_core::errors::AppResult;
use liftoff_core::models::{
    ChallengeCategory, ChallengeDefinition, ChallengeType, Difficulty, ExerciseDefinition,
    PerformedExercise, WorkoutRecord,
};
use uuid::Uuid;

use crate::config::ProgressionConfig;
use crate::database::{InMemoryStore, ProgressionStore, WorkoutRepository};
use crate::services::ProgressionService;

/// Exercises seeded by [`seed_test_exercises`]: name, muscle group, compound
pub const TEST_EXERCISES: [(&str, &str, bool); 4] = [
    ("Bench Press", "Chest", true),
    ("Barbell Row", "Back", true),
    ("Back Squat", "Legs", true),
    ("Bicep Curl", "Arms", false),
];

/// Create a catalog exercise
#[must_use]
pub fn create_test_exercise(
    name: &str,
    muscle_group: &str,
    is_compound: bool,
) -> ExerciseDefinition {
    ExerciseDefinition::new(name, muscle_group, is_compound)
}

/// Create a performed entry for an exercise
#[must_use]
pub fn create_test_entry(
    exercise: &ExerciseDefinition,
    sets: u32,
    reps: u32,
    weight: Option<f64>,
) -> PerformedExercise {
    PerformedExercise::from_definition(exercise, sets, reps, weight)
}

/// Create a workout performed `days_ago` days before `now`
#[must_use]
pub fn create_test_workout(
    user_id: Uuid,
    now: DateTime<Utc>,
    days_ago: i64,
    exercises: Vec<PerformedExercise>,
) -> WorkoutRecord {
    WorkoutRecord::new(
        user_id,
        format!("Session -{days_ago}d"),
        now - Duration::days(days_ago),
        exercises,
    )
}

/// Create an active global challenge over `[start, end]`
#[must_use]
pub fn create_test_challenge(
    category: ChallengeCategory,
    target_value: u64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> ChallengeDefinition {
    ChallengeDefinition {
        id: Uuid::new_v4(),
        name: format!("Test {category} challenge"),
        description: "Test challenge".to_owned(),
        challenge_type: ChallengeType::Community,
        category,
        target_value,
        target_unit: None,
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

/// Insert [`TEST_EXERCISES`] into a store
///
/// # Errors
///
/// Returns an error if an exercise name already exists
pub async fn seed_test_exercises(store: &dyn WorkoutRepository) -> AppResult<Vec<ExerciseDefinition>> {
    let mut seeded = Vec::with_capacity(TEST_EXERCISES.len());
    for (name, muscle_group, is_compound) in TEST_EXERCISES {
        let exercise = create_test_exercise(name, muscle_group, is_compound);
        store.insert_exercise(&exercise).await?;
        seeded.push(exercise);
    }
    Ok(seeded)
}

/// In-memory store plus a progression service using default scoring
#[must_use]
pub fn create_test_progression_service() -> (Arc<InMemoryStore>, ProgressionService) {
    let store = Arc::new(InMemoryStore::new());
    let service = ProgressionService::new(
        Arc::clone(&store) as Arc<dyn ProgressionStore>,
        Arc::new(ProgressionConfig::default()),
    );
    (store, service)
}
