// ABOUTME: Workout change command for liftoff-cli
// ABOUTME: Replays the progression pipeline for a workout that changed outside the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use anyhow::Result;
use liftoff_server::services::{ProgressionService, WorkoutChange};
use tracing::info;
use uuid::Uuid;

use crate::helpers::display::print_json;
use crate::ChangeKind;

/// Run the pipeline and print its outcome
pub async fn workout_changed(
    service: &ProgressionService,
    user_id: Uuid,
    workout_id: Uuid,
    kind: ChangeKind,
) -> Result<()> {
    let change = match kind {
        ChangeKind::Created => WorkoutChange::Created(workout_id),
        ChangeKind::Updated => WorkoutChange::Updated(workout_id),
        ChangeKind::Deleted => WorkoutChange::Deleted(workout_id),
    };
    let outcome = service.on_workout_changed(user_id, change).await?;
    info!(
        user.id = %user_id,
        records = outcome.new_personal_records.len(),
        achievements = outcome.newly_unlocked_achievements.len(),
        challenges = outcome.newly_completed_challenges.len(),
        "Pipeline finished"
    );
    print_json(&outcome)
}
