// ABOUTME: Achievement commands for liftoff-cli
// ABOUTME: Catalog seeding, per-user listing, evaluation and near-completion queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use anyhow::Result;
use chrono::Utc;
use liftoff_server::models::AchievementCategory;
use liftoff_server::services::ProgressionService;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::helpers::display::print_json;

/// Insert the reference catalog
pub async fn seed(service: &ProgressionService) -> Result<()> {
    let inserted = service.achievements().seed_catalog().await?;
    info!(inserted, "Achievement catalog seeded");
    print_json(&json!({ "inserted": inserted }))
}

/// Achievements with the user's status
pub async fn list(
    service: &ProgressionService,
    user_id: Uuid,
    category: Option<AchievementCategory>,
    unlocked_only: bool,
) -> Result<()> {
    let overview = service
        .achievements()
        .achievements_for_user(user_id, category, unlocked_only, Utc::now())
        .await?;
    print_json(&overview)
}

/// Unlock everything the user currently satisfies
pub async fn evaluate(service: &ProgressionService, user_id: Uuid) -> Result<()> {
    let unlocked = service
        .achievements()
        .evaluate_and_unlock(user_id, Utc::now())
        .await?;
    print_json(&unlocked)
}

/// Locked achievements close to completion
pub async fn near(service: &ProgressionService, user_id: Uuid) -> Result<()> {
    let near = service
        .achievements()
        .near_completion(user_id, Utc::now())
        .await?;
    print_json(&near)
}
