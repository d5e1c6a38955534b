// ABOUTME: Workout create, update and delete with input validation
// ABOUTME: Every successful mutation runs the progression pipeline for the owner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::sync::Arc;

use chrono::Utc;
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{
    ExerciseEntry, NamedExerciseEntry, NewWorkout, PerformedExercise, WorkoutRecord,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::progression::{ProgressionService, WorkoutChange, WorkoutChangeOutcome};
use crate::database::ProgressionStore;

/// A stored workout and the progression it triggered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutMutation {
    /// Workout as stored
    pub workout: WorkoutRecord,
    /// Pipeline results
    pub outcome: WorkoutChangeOutcome,
}

/// Result of mapping exercise names onto catalog ids
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseMapping {
    /// Entries whose name matched a catalog exercise
    pub mapped: Vec<ExerciseEntry>,
    /// Names with no catalog match, in input order
    pub missing: Vec<String>,
}

fn validate_entry(index: usize, entry: &ExerciseEntry) -> AppResult<()> {
    if entry.sets < 1 {
        return Err(AppError::invalid_input(format!(
            "exercises[{index}].sets must be at least 1"
        )));
    }
    if entry.reps < 1 {
        return Err(AppError::invalid_input(format!(
            "exercises[{index}].reps must be at least 1"
        )));
    }
    if let Some(weight) = entry.weight {
        if !weight.is_finite() || weight < 0.0 {
            return Err(AppError::invalid_input(format!(
                "exercises[{index}].weight must be a non-negative number"
            )));
        }
    }
    Ok(())
}

/// Validates and stores workouts, then runs the progression pipeline
#[derive(Clone)]
pub struct WorkoutService {
    store: Arc<dyn ProgressionStore>,
    progression: ProgressionService,
}

impl WorkoutService {
    /// Create the service
    #[must_use]
    pub fn new(progression: ProgressionService) -> Self {
        Self {
            store: Arc::clone(progression.store()),
            progression,
        }
    }

    /// Pipeline coordinator
    #[must_use]
    pub const fn progression(&self) -> &ProgressionService {
        &self.progression
    }

    async fn resolve(&self, input: &NewWorkout) -> AppResult<Vec<PerformedExercise>> {
        if input.name.trim().is_empty() {
            return Err(AppError::missing_field("name"));
        }
        let mut performed = Vec::with_capacity(input.exercises.len());
        for (index, entry) in input.exercises.iter().enumerate() {
            validate_entry(index, entry)?;
            let exercise = self
                .store
                .exercise_by_id(entry.exercise_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Exercise {}", entry.exercise_id)))?;
            performed.push(PerformedExercise::from_definition(
                &exercise,
                entry.sets,
                entry.reps,
                entry.weight,
            ));
        }
        Ok(performed)
    }

    async fn owned_workout(&self, user_id: Uuid, workout_id: Uuid) -> AppResult<WorkoutRecord> {
        self.store
            .workout_by_id(workout_id)
            .await?
            .filter(|w| w.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("Workout {workout_id}")))
    }

    /// Log a workout
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` for an empty name
    /// - `InvalidInput` for sets or reps below 1 or a negative weight
    /// - `ResourceNotFound` for an unknown exercise id
    pub async fn create_workout(&self, user_id: Uuid, input: NewWorkout) -> AppResult<WorkoutMutation> {
        let exercises = self.resolve(&input).await?;
        let mut workout = WorkoutRecord::new(user_id, input.name.trim(), input.performed_at, exercises);
        workout.duration_minutes = input.duration_minutes;
        workout.notes = input.notes;

        self.store.insert_workout(&workout).await?;
        info!(user.id = %user_id, workout.id = %workout.id, "Workout created");

        let outcome = self
            .progression
            .on_workout_changed(user_id, WorkoutChange::Created(workout.id))
            .await?;
        Ok(WorkoutMutation { workout, outcome })
    }

    /// Replace a workout's fields and exercise entries
    ///
    /// # Errors
    ///
    /// Same validation as [`Self::create_workout`], plus `ResourceNotFound` when
    /// the workout does not exist or belongs to someone else
    pub async fn update_workout(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        input: NewWorkout,
    ) -> AppResult<WorkoutMutation> {
        let existing = self.owned_workout(user_id, workout_id).await?;
        let exercises = self.resolve(&input).await?;

        let workout = WorkoutRecord {
            name: input.name.trim().to_owned(),
            performed_at: input.performed_at,
            duration_minutes: input.duration_minutes,
            notes: input.notes,
            exercises,
            updated_at: Utc::now(),
            ..existing
        };
        self.store.replace_workout(&workout).await?;
        info!(user.id = %user_id, workout.id = %workout_id, "Workout updated");

        let outcome = self
            .progression
            .on_workout_changed(user_id, WorkoutChange::Updated(workout_id))
            .await?;
        Ok(WorkoutMutation { workout, outcome })
    }

    /// Delete a workout
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the workout does not exist or belongs to someone else
    pub async fn delete_workout(&self, user_id: Uuid, workout_id: Uuid) -> AppResult<WorkoutChangeOutcome> {
        self.owned_workout(user_id, workout_id).await?;
        if !self.store.delete_workout(workout_id).await? {
            return Err(AppError::not_found(format!("Workout {workout_id}")));
        }
        info!(user.id = %user_id, workout.id = %workout_id, "Workout deleted");

        self.progression
            .on_workout_changed(user_id, WorkoutChange::Deleted(workout_id))
            .await
    }

    /// Map exercise names to catalog ids, ignoring case
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn map_exercise_names(&self, entries: &[NamedExerciseEntry]) -> AppResult<ExerciseMapping> {
        let mut mapping = ExerciseMapping::default();
        for entry in entries {
            match self.store.exercise_by_name(&entry.name).await? {
                Some(exercise) => mapping.mapped.push(ExerciseEntry {
                    exercise_id: exercise.id,
                    sets: entry.sets,
                    reps: entry.reps,
                    weight: entry.weight,
                }),
                None => mapping.missing.push(entry.name.clone()),
            }
        }
        Ok(mapping)
    }
}
