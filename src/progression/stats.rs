// ABOUTME: Raw per-user workout statistics derived from the stored workout history
// ABOUTME: Also holds the coarse legacy consistency measure used by the MMR formula
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::collections::HashSet;
use std::sync::Arc;

use liftoff_core::constants::scoring::LEGACY_CONSISTENCY_MULTIPLIER;
use liftoff_core::errors::AppResult;
use liftoff_core::models::{UserStats, WorkoutRecord};
use tracing::debug;
use uuid::Uuid;

use crate::database::ProgressionStore;

/// Legacy consistency: workouts per week scaled by 20, capped at 100
///
/// Weeks are `workout_days / 7` with a floor of one week, so short histories
/// are not inflated.
#[must_use]
pub fn legacy_consistency(total_workouts: u32, workout_days: u32) -> u32 {
    let weeks = (f64::from(workout_days) / 7.0).max(1.0);
    let score = (f64::from(total_workouts) / weeks * LEGACY_CONSISTENCY_MULTIPLIER).round();
    (score as u32).min(100)
}

/// Aggregate statistics over a full workout history
///
/// An empty history is all zeros, including `personal_records`, since stored
/// records outlive the workouts they came from. `total_exercises` counts distinct exercise names ignoring case, and
/// `workout_days` is the inclusive calendar span between the first and last workout.
#[must_use]
pub fn aggregate_stats(workouts: &[WorkoutRecord], personal_records: u32) -> UserStats {
    if workouts.is_empty() {
        return UserStats::default();
    }

    let total_workouts = u32::try_from(workouts.len()).unwrap_or(u32::MAX);
    let exercise_names: HashSet<String> = workouts
        .iter()
        .flat_map(|w| &w.exercises)
        .map(|e| e.exercise_name.to_lowercase())
        .collect();

    let first = workouts.iter().map(WorkoutRecord::date).min();
    let last = workouts.iter().map(WorkoutRecord::date).max();
    let workout_days = match (first, last) {
        (Some(first), Some(last)) => {
            u32::try_from((last - first).num_days() + 1).unwrap_or(u32::MAX)
        }
        _ => 0,
    };

    UserStats {
        total_workouts,
        total_exercises: u32::try_from(exercise_names.len()).unwrap_or(u32::MAX),
        workout_days,
        personal_records,
        consistency_score: legacy_consistency(total_workouts, workout_days),
    }
}

/// Loads a user's history and derives [`UserStats`]
#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn ProgressionStore>,
}

impl StatsAggregator {
    /// Create an aggregator over a store
    #[must_use]
    pub fn new(store: Arc<dyn ProgressionStore>) -> Self {
        Self { store }
    }

    /// Statistics for one user; all zeros when they have no workouts
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn user_stats(&self, user_id: Uuid) -> AppResult<UserStats> {
        let workouts = self.store.workouts_for(user_id, None, None).await?;
        let personal_records = self.store.count_personal_records(user_id).await?;
        let stats = aggregate_stats(&workouts, personal_records);
        debug!(
            user.id = %user_id,
            total_workouts = stats.total_workouts,
            workout_days = stats.workout_days,
            "Aggregated user stats"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use liftoff_core::models::{ExerciseDefinition, PerformedExercise};

    fn workout_on(day: i64, exercise: &str) -> WorkoutRecord {
        let def = ExerciseDefinition::new(exercise, "Chest", true);
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap() + Duration::days(day);
        WorkoutRecord::new(
            Uuid::nil(),
            "Session",
            at,
            vec![PerformedExercise::from_definition(&def, 3, 5, Some(100.0))],
        )
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        assert_eq!(aggregate_stats(&[], 0), UserStats::default());
        assert_eq!(aggregate_stats(&[], 3), UserStats::default());
    }

    #[test]
    fn test_distinct_names_ignore_case() {
        let workouts = vec![workout_on(0, "Bench Press"), workout_on(1, "bench press")];
        let stats = aggregate_stats(&workouts, 2);
        assert_eq!(stats.total_exercises, 1);
        assert_eq!(stats.personal_records, 2);
    }

    #[test]
    fn test_workout_days_inclusive() {
        let workouts = vec![workout_on(0, "Squat"), workout_on(13, "Squat")];
        let stats = aggregate_stats(&workouts, 0);
        assert_eq!(stats.workout_days, 14);
        assert_eq!(stats.total_workouts, 2);
    }

    #[test]
    fn test_legacy_consistency() {
        // Under a week counts as one week
        assert_eq!(legacy_consistency(1, 1), 20);
        assert_eq!(legacy_consistency(3, 3), 60);
        assert_eq!(legacy_consistency(10, 7), 100);
        // 4 workouts over two weeks
        assert_eq!(legacy_consistency(4, 14), 40);
        // 3 workouts over 10 days: 3 / (10/7) * 20 = 42
        assert_eq!(legacy_consistency(3, 10), 42);
        assert_eq!(legacy_consistency(0, 0), 0);
    }
}
