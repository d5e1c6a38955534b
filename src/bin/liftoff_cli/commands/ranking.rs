// ABOUTME: Ranking commands for liftoff-cli
// ABOUTME: Recompute, breakdown, legacy MMR, paginated and friends leaderboards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use anyhow::Result;
use chrono::Utc;
use liftoff_server::models::RankingScope;
use liftoff_server::pagination::PageRequest;
use liftoff_server::services::ProgressionService;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::display::print_json;

/// Recompute and persist a user's ranking rows
pub async fn recompute(service: &ProgressionService, user_id: Uuid) -> Result<()> {
    let update = service
        .ranking()
        .recompute_and_persist(user_id, Utc::now())
        .await?;
    print_json(&update)
}

/// Breakdown computed now alongside the rows last stored
pub async fn show(service: &ProgressionService, user_id: Uuid) -> Result<()> {
    let ranking = service.ranking();
    let breakdown = ranking.ranking_breakdown(user_id, Utc::now()).await?;
    let stored = ranking.get_ranking(user_id).await?;
    print_json(&json!({
        "user_id": user_id,
        "breakdown": breakdown,
        "stored": stored,
    }))
}

/// Legacy MMR and tier
pub async fn legacy(service: &ProgressionService, user_id: Uuid) -> Result<()> {
    let legacy = service.ranking().legacy_mmr(user_id).await?;
    print_json(&legacy)
}

/// One leaderboard page
pub async fn leaderboard(
    service: &ProgressionService,
    scope: &str,
    page: u32,
    per_page: u32,
    viewer: Option<Uuid>,
) -> Result<()> {
    let board = service
        .ranking()
        .leaderboard(
            &RankingScope::from_key(scope),
            PageRequest::new(page, per_page),
            viewer,
        )
        .await?;
    print_json(&board)
}

/// User and accepted friends ranked in one scope
pub async fn friends(service: &ProgressionService, user_id: Uuid, scope: &str) -> Result<()> {
    let entries = service
        .ranking()
        .friends_leaderboard(user_id, &RankingScope::from_key(scope))
        .await?;
    print_json(&entries)
}
