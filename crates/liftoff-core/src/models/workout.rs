// ABOUTME: Workout and exercise catalog models
// ABOUTME: Workout records with their performed exercise entries and volume helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exercise reference data from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseDefinition {
    /// Unique exercise identifier
    pub id: Uuid,
    /// Display name, unique within the catalog
    pub name: String,
    /// Muscle group the exercise primarily trains (e.g. "Chest")
    pub muscle_group: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Whether the movement recruits several joints
    pub is_compound: bool,
}

impl ExerciseDefinition {
    /// Create a catalog entry with a fresh identifier
    #[must_use]
    pub fn new(name: impl Into<String>, muscle_group: impl Into<String>, is_compound: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            muscle_group: muscle_group.into(),
            description: None,
            is_compound,
        }
    }

    /// Case-insensitive name comparison used for import mapping
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// One exercise performed inside a workout
///
/// The exercise name and muscle group are denormalized from the catalog when the
/// workout is read so scoring can run without further lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformedExercise {
    /// Catalog exercise performed
    pub exercise_id: Uuid,
    /// Catalog name at read time
    pub exercise_name: String,
    /// Catalog muscle group at read time
    pub muscle_group: String,
    /// Number of sets
    pub sets: u32,
    /// Repetitions per set
    pub reps: u32,
    /// Load per repetition; bodyweight movements have none
    pub weight: Option<f64>,
}

impl PerformedExercise {
    /// Build an entry from a catalog definition
    #[must_use]
    pub fn from_definition(
        exercise: &ExerciseDefinition,
        sets: u32,
        reps: u32,
        weight: Option<f64>,
    ) -> Self {
        Self {
            exercise_id: exercise.id,
            exercise_name: exercise.name.clone(),
            muscle_group: exercise.muscle_group.clone(),
            sets,
            reps,
            weight,
        }
    }

    /// `sets * reps * weight`, with a missing weight counted as zero
    #[must_use]
    pub fn volume(&self) -> f64 {
        f64::from(self.sets) * f64::from(self.reps) * self.weight.unwrap_or(0.0)
    }

    /// Total repetitions across all sets
    #[must_use]
    pub fn total_reps(&self) -> u64 {
        u64::from(self.sets) * u64::from(self.reps)
    }

    /// Sets, reps and weight when all three are present and non-zero
    ///
    /// Entries lacking any of them are not eligible for personal records.
    #[must_use]
    pub fn complete_metrics(&self) -> Option<(u32, u32, f64)> {
        match self.weight {
            Some(weight) if weight > 0.0 && self.sets > 0 && self.reps > 0 => {
                Some((self.sets, self.reps, weight))
            }
            _ => None,
        }
    }
}

/// A logged training session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    /// Unique workout identifier
    pub id: Uuid,
    /// Owner of the workout
    pub user_id: Uuid,
    /// User-facing workout name
    pub name: String,
    /// When the workout took place
    pub performed_at: DateTime<Utc>,
    /// Session length in minutes
    pub duration_minutes: Option<u32>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Exercises in the order they were performed
    pub exercises: Vec<PerformedExercise>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl WorkoutRecord {
    /// Create a workout with a fresh identifier
    #[must_use]
    pub fn new(
        user_id: Uuid,
        name: impl Into<String>,
        performed_at: DateTime<Utc>,
        exercises: Vec<PerformedExercise>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            performed_at,
            duration_minutes: None,
            notes: None,
            exercises,
            created_at: now,
            updated_at: now,
        }
    }

    /// Calendar date of the workout
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.performed_at.date_naive()
    }

    /// Whether any performed exercise belongs to `muscle_group`
    #[must_use]
    pub fn touches_muscle_group(&self, muscle_group: &str) -> bool {
        self.exercises
            .iter()
            .any(|exercise| exercise.muscle_group == muscle_group)
    }

    /// Volume summed over every performed exercise
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.exercises.iter().map(PerformedExercise::volume).sum()
    }

    /// Volume summed over the exercises of one muscle group
    #[must_use]
    pub fn muscle_group_volume(&self, muscle_group: &str) -> f64 {
        self.exercises
            .iter()
            .filter(|exercise| exercise.muscle_group == muscle_group)
            .map(PerformedExercise::volume)
            .sum()
    }
}

/// Exercise entry as submitted by a client, before catalog resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseEntry {
    /// Catalog exercise identifier
    pub exercise_id: Uuid,
    /// Number of sets
    pub sets: u32,
    /// Repetitions per set
    pub reps: u32,
    /// Optional load
    pub weight: Option<f64>,
}

/// Workout payload for create and update operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewWorkout {
    /// User-facing workout name
    pub name: String,
    /// When the workout took place
    pub performed_at: DateTime<Utc>,
    /// Session length in minutes
    pub duration_minutes: Option<u32>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Exercises in performed order
    pub exercises: Vec<ExerciseEntry>,
}

/// Exercise entry referring to the catalog by name, as produced by imports
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedExerciseEntry {
    /// Exercise name, matched case-insensitively
    pub name: String,
    /// Number of sets
    pub sets: u32,
    /// Repetitions per set
    pub reps: u32,
    /// Optional load
    pub weight: Option<f64>,
}
