// ABOUTME: Challenge commands for liftoff-cli
// ABOUTME: Listings, progress recomputation, participations and challenge leaderboards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use anyhow::Result;
use chrono::Utc;
use liftoff_server::models::{ChallengeQuery, ParticipationStatus};
use liftoff_server::services::ProgressionService;
use uuid::Uuid;

use crate::helpers::display::print_json;

/// Joinable global challenges
pub async fn list(service: &ProgressionService, include_inactive: bool) -> Result<()> {
    let query = ChallengeQuery {
        active_only: !include_inactive,
        ..ChallengeQuery::default()
    };
    let listings = service
        .challenges()
        .available_challenges(query, Utc::now())
        .await?;
    print_json(&listings)
}

/// Recompute progress and print completions
pub async fn progress(
    service: &ProgressionService,
    user_id: Uuid,
    challenge_id: Option<Uuid>,
) -> Result<()> {
    let completed = service
        .challenges()
        .recompute_progress(user_id, challenge_id, Utc::now())
        .await?;
    print_json(&completed)
}

/// A user's participations by status
pub async fn mine(
    service: &ProgressionService,
    user_id: Uuid,
    status: ParticipationStatus,
) -> Result<()> {
    let overview = service
        .challenges()
        .user_challenges(user_id, status, Utc::now())
        .await?;
    print_json(&overview)
}

/// Participants ranked by progress
pub async fn leaderboard(service: &ProgressionService, challenge_id: Uuid) -> Result<()> {
    let entries = service
        .challenges()
        .challenge_leaderboard(challenge_id)
        .await?;
    print_json(&entries)
}
