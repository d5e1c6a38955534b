// ABOUTME: Personal-record detection for logged workouts and PR history queries
// ABOUTME: Each new best is appended to the log together with the value it beat
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use liftoff_core::errors::AppResult;
use liftoff_core::models::{
    ExerciseDefinition, PersonalRecordEntry, PersonalRecordFilter, PersonalRecordSummary,
    PersonalRecordView, RecordType, WorkoutRecord,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::ProgressionStore;

const UNKNOWN_EXERCISE: &str = "Unknown";

/// Whether `candidate` beats the stored best; a missing best always counts as a record
#[must_use]
pub fn is_new_record(candidate: f64, current_best: Option<f64>) -> bool {
    current_best.is_none_or(|best| candidate > best)
}

/// Detects and stores personal records
#[derive(Clone)]
pub struct PersonalRecordTracker {
    store: Arc<dyn ProgressionStore>,
}

impl PersonalRecordTracker {
    /// Create a tracker
    #[must_use]
    pub fn new(store: Arc<dyn ProgressionStore>) -> Self {
        Self { store }
    }

    /// Check every eligible entry of a workout against the user's bests
    ///
    /// Entries without sets, reps and a positive weight are skipped. Record
    /// types are checked in the order weight, volume, reps; entries are written
    /// as they are found, so a repeated exercise competes against the earlier
    /// entry of the same workout.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn scan_workout(
        &self,
        workout: &WorkoutRecord,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<PersonalRecordEntry>> {
        let mut created = Vec::new();

        for exercise in &workout.exercises {
            let Some((sets, reps, weight)) = exercise.complete_metrics() else {
                continue;
            };

            for record_type in RecordType::CHECK_ORDER {
                let candidate = record_type.candidate_value(sets, reps, weight);
                let best = self
                    .store
                    .personal_record_best(workout.user_id, exercise.exercise_id, record_type)
                    .await?;
                if !is_new_record(candidate, best) {
                    continue;
                }

                let entry = PersonalRecordEntry {
                    id: Uuid::new_v4(),
                    user_id: workout.user_id,
                    exercise_id: exercise.exercise_id,
                    record_type,
                    record_value: candidate,
                    sets,
                    reps,
                    weight,
                    workout_id: workout.id,
                    previous_record: best.unwrap_or(0.0),
                    achieved_at: now,
                };
                self.store.insert_personal_record(&entry).await?;
                debug!(
                    user.id = %workout.user_id,
                    exercise = %exercise.exercise_name,
                    record_type = %record_type,
                    value = candidate,
                    "New personal record"
                );
                created.push(entry);
            }
        }

        if !created.is_empty() {
            info!(
                user.id = %workout.user_id,
                workout.id = %workout.id,
                records = created.len(),
                "Personal records set"
            );
        }
        Ok(created)
    }

    /// A user's PR log, newest first, with exercise names attached
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn personal_records(
        &self,
        user_id: Uuid,
        filter: PersonalRecordFilter,
    ) -> AppResult<Vec<PersonalRecordView>> {
        let entries = self.store.personal_records_for(user_id, filter).await?;
        self.attach_exercises(entries).await
    }

    /// Latest PR entries per exercise, grouped by muscle group
    ///
    /// Entries sharing an exercise's latest timestamp are all kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn personal_record_summary(&self, user_id: Uuid) -> AppResult<PersonalRecordSummary> {
        let entries = self
            .store
            .personal_records_for(user_id, PersonalRecordFilter::default())
            .await?;

        let mut latest: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
        for entry in &entries {
            latest
                .entry(entry.exercise_id)
                .and_modify(|at| *at = (*at).max(entry.achieved_at))
                .or_insert(entry.achieved_at);
        }

        let newest: Vec<PersonalRecordEntry> = entries
            .into_iter()
            .filter(|e| latest.get(&e.exercise_id) == Some(&e.achieved_at))
            .collect();
        let views = self.attach_exercises(newest).await?;

        let mut by_muscle_group: BTreeMap<String, Vec<PersonalRecordView>> = BTreeMap::new();
        for view in views {
            by_muscle_group
                .entry(view.muscle_group.clone())
                .or_default()
                .push(view);
        }

        Ok(PersonalRecordSummary {
            by_muscle_group,
            total_exercises_with_prs: u32::try_from(latest.len()).unwrap_or(u32::MAX),
        })
    }

    async fn attach_exercises(
        &self,
        entries: Vec<PersonalRecordEntry>,
    ) -> AppResult<Vec<PersonalRecordView>> {
        let mut exercises: HashMap<Uuid, Option<ExerciseDefinition>> = HashMap::new();
        let mut views = Vec::with_capacity(entries.len());

        for entry in entries {
            let exercise = match exercises.entry(entry.exercise_id) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => {
                    let found = self.store.exercise_by_id(entry.exercise_id).await?;
                    slot.insert(found)
                }
            };
            let (exercise_name, muscle_group) = exercise.as_ref().map_or_else(
                || (UNKNOWN_EXERCISE.to_owned(), UNKNOWN_EXERCISE.to_owned()),
                |def| (def.name.clone(), def.muscle_group.clone()),
            );
            views.push(PersonalRecordView {
                entry,
                exercise_name,
                muscle_group,
            });
        }
        Ok(views)
    }
}
