// ABOUTME: Integration tests for the ranking engine
// ABOUTME: Covers Liftoff points, muscle-group scopes, leaderboards and legacy MMR
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use chrono::Duration;
use liftoff_server::config::{ProgressionConfig, RankingConfig};
use liftoff_server::database::{ProgressionStore, RankingRepository, WorkoutRepository};
use liftoff_server::models::{LegacyTier, RankTier, RankingScope, UserRankingRow};
use liftoff_server::pagination::PageRequest;
use liftoff_server::progression::{liftoff_points, RankingEngine};
use uuid::Uuid;

use common::{
    befriend, create_memory_store, create_test_database, entry, log_workouts_on_days,
    reference_now, seed_catalog, workout_at,
};

fn engine(store: &Arc<dyn ProgressionStore>) -> RankingEngine {
    RankingEngine::new(Arc::clone(store), Arc::new(ProgressionConfig::default()))
}

async fn rank_user(store: &Arc<dyn ProgressionStore>, scope: RankingScope, points: u32) -> Uuid {
    let user_id = Uuid::new_v4();
    store
        .upsert_ranking(&UserRankingRow {
            user_id,
            scope,
            points,
            tier: RankingConfig::default().tiers.tier_for(points),
            updated_at: reference_now(),
        })
        .await
        .unwrap();
    user_id
}

#[test]
fn test_fifty_points_is_silver() {
    let points = liftoff_points(20, 10, &RankingConfig::default());
    assert_eq!(points.workout_points, 40);
    assert_eq!(points.total_points, 50);
    assert_eq!(points.tier, RankTier::Silver);
}

async fn assert_recompute_is_stable(store: Arc<dyn ProgressionStore>) {
    let catalog = seed_catalog(&store).await.unwrap();
    let user = Uuid::new_v4();
    let now = reference_now();
    log_workouts_on_days(&store, user, now, &[0, 2, 5], &catalog.squat)
        .await
        .unwrap();
    store
        .insert_workout(&workout_at(
            user,
            now - Duration::days(1),
            vec![entry(&catalog.bench_press, 3, 8, Some(60.0))],
        ))
        .await
        .unwrap();

    let ranking = engine(&store);
    let first_update = ranking.recompute_and_persist(user, now).await.unwrap();
    let first_rows = store.rankings_for(user).await.unwrap();
    let second_update = ranking.recompute_and_persist(user, now).await.unwrap();
    let second_rows = store.rankings_for(user).await.unwrap();

    assert_eq!(first_update, second_update);
    assert_eq!(first_rows.len(), 3);
    assert_eq!(first_rows, second_rows);
    assert_eq!(store.count_ranked(&RankingScope::Overall).await.unwrap(), 1);
}

#[tokio::test]
async fn test_recompute_twice_is_stable_in_memory() {
    assert_recompute_is_stable(create_memory_store()).await;
}

#[tokio::test]
async fn test_recompute_twice_is_stable_on_sqlite() {
    let database = create_test_database().await.unwrap();
    assert_recompute_is_stable(database).await;
}

#[tokio::test]
async fn test_recompute_persists_overall_and_trained_groups() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let user = Uuid::new_v4();
    let now = reference_now();
    log_workouts_on_days(&store, user, now, &[0, 1, 2], &catalog.bench_press)
        .await
        .unwrap();

    let update = engine(&store).recompute_and_persist(user, now).await.unwrap();

    // 3 workouts * 2 + consistency 100 (three consecutive days)
    assert_eq!(update.overall.consistency_points, 100);
    assert_eq!(update.overall.total_points, 106);
    assert_eq!(update.overall.tier, RankTier::Silver);

    assert_eq!(update.muscle_groups.len(), 1);
    let chest = &update.muscle_groups[0];
    assert_eq!(chest.muscle_group, "Chest");
    assert_eq!(chest.workout_points, 6);
    assert_eq!(chest.volume_points, 450);
    assert_eq!(chest.tier, RankTier::Platinum);

    let rows = store.rankings_for(user).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].scope, RankingScope::Overall);
    assert_eq!(rows[0].points, 106);
    assert_eq!(rows[1].scope, RankingScope::MuscleGroup("Chest".to_owned()));
}

#[tokio::test]
async fn test_recompute_leaves_untrained_scopes_alone() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let user = Uuid::new_v4();
    let now = reference_now();

    store
        .upsert_ranking(&UserRankingRow {
            user_id: user,
            scope: RankingScope::MuscleGroup("Legs".to_owned()),
            points: 77,
            tier: RankTier::Silver,
            updated_at: now - Duration::days(30),
        })
        .await
        .unwrap();
    log_workouts_on_days(&store, user, now, &[0], &catalog.barbell_row)
        .await
        .unwrap();

    engine(&store).recompute_and_persist(user, now).await.unwrap();

    let legs = store
        .ranking_row(user, &RankingScope::MuscleGroup("Legs".to_owned()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(legs.points, 77);
}

#[tokio::test]
async fn test_muscle_group_volume_counts_only_that_group() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let user = Uuid::new_v4();
    let now = reference_now();

    let mixed = workout_at(
        user,
        now,
        vec![
            entry(&catalog.bench_press, 1, 10, Some(100.0)),
            entry(&catalog.squat, 5, 5, Some(200.0)),
            entry(&catalog.pull_up, 3, 8, None),
        ],
    );
    store.insert_workout(&mixed).await.unwrap();

    let update = engine(&store).recompute_and_persist(user, now).await.unwrap();
    let groups: Vec<(&str, u32)> = update
        .muscle_groups
        .iter()
        .map(|g| (g.muscle_group.as_str(), g.volume_points))
        .collect();

    assert_eq!(groups, vec![("Back", 0), ("Chest", 100), ("Legs", 500)]);
}

#[tokio::test]
async fn test_leaderboard_pages_and_viewer_standing() {
    let store = create_memory_store();
    let mut users = Vec::new();
    for points in [10, 20, 30, 40, 50] {
        users.push(rank_user(&store, RankingScope::Overall, points).await);
    }
    let lowest = users[0];

    let board = engine(&store)
        .leaderboard(&RankingScope::Overall, PageRequest::new(2, 2), Some(lowest))
        .await
        .unwrap();

    let page: Vec<(u32, u32)> = board
        .entries
        .items
        .iter()
        .map(|e| (e.rank, e.points))
        .collect();
    assert_eq!(page, vec![(3, 30), (4, 20)]);
    assert_eq!(board.entries.total, 5);
    assert!(board.entries.has_more);

    let viewer = board.viewer.unwrap();
    assert_eq!(viewer.rank, 5);
    assert_eq!(viewer.points, 10);
    assert_eq!(viewer.tier, RankTier::Bronze);
}

#[tokio::test]
async fn test_viewer_without_row_has_no_standing() {
    let store = create_memory_store();
    rank_user(&store, RankingScope::Overall, 10).await;

    let board = engine(&store)
        .leaderboard(
            &RankingScope::Overall,
            PageRequest::default(),
            Some(Uuid::new_v4()),
        )
        .await
        .unwrap();
    assert!(board.viewer.is_none());
    assert!(!board.entries.has_more);
}

#[tokio::test]
async fn test_tied_users_share_rank() {
    let store = create_memory_store();
    rank_user(&store, RankingScope::Overall, 80).await;
    let tied = rank_user(&store, RankingScope::Overall, 40).await;
    rank_user(&store, RankingScope::Overall, 40).await;

    let board = engine(&store)
        .leaderboard(&RankingScope::Overall, PageRequest::default(), Some(tied))
        .await
        .unwrap();
    assert_eq!(board.viewer.unwrap().rank, 2);
}

#[tokio::test]
async fn test_friends_leaderboard_excludes_strangers() {
    let store = create_memory_store();
    let scope = RankingScope::MuscleGroup("Back".to_owned());
    let me = rank_user(&store, scope.clone(), 30).await;
    let friend = rank_user(&store, scope.clone(), 60).await;
    let stranger = rank_user(&store, scope.clone(), 90).await;
    befriend(&store, friend, me).await.unwrap();

    let entries = engine(&store).friends_leaderboard(me, &scope).await.unwrap();
    let ranked: Vec<(u32, Uuid)> = entries.iter().map(|e| (e.rank, e.user_id)).collect();

    assert_eq!(ranked, vec![(1, friend), (2, me)]);
    assert!(entries.iter().all(|e| e.user_id != stranger));
}

#[tokio::test]
async fn test_breakdown_reports_distance_to_next_tier() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let user = Uuid::new_v4();
    let now = reference_now();
    log_workouts_on_days(&store, user, now, &[0], &catalog.squat)
        .await
        .unwrap();

    let breakdown = engine(&store).ranking_breakdown(user, now).await.unwrap();

    // 1 workout * 2 + 10 for a single training day
    assert_eq!(breakdown.overall.total_points, 12);
    assert_eq!(breakdown.tier_color, "#CD7F32");
    assert_eq!(breakdown.progress.next_tier, Some(RankTier::Silver));
    assert_eq!(breakdown.progress.points_needed, 38);
    assert!(store.rankings_for(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_legacy_mmr_is_computed_from_raw_stats() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let user = Uuid::new_v4();
    let now = reference_now();
    log_workouts_on_days(&store, user, now, &[0, 1, 2], &catalog.bench_press)
        .await
        .unwrap();

    let legacy = engine(&store).legacy_mmr(user).await.unwrap();

    assert_eq!(legacy.stats.total_workouts, 3);
    assert_eq!(legacy.stats.workout_days, 3);
    assert_eq!(legacy.stats.consistency_score, 60);
    assert_eq!(legacy.mmr, 66);
    assert_eq!(legacy.tier, LegacyTier::BronzeFighter);
    assert!(store.rankings_for(user).await.unwrap().is_empty());
}
