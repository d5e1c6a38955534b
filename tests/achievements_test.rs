// ABOUTME: Integration tests for achievement evaluation, unlocking and queries
// ABOUTME: Checks once-only unlocks, every criterion kind, hidden entries and near completion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use liftoff_server::config::ProgressionConfig;
use liftoff_server::database::{AchievementRepository, ProgressionStore};
use liftoff_server::errors::ErrorCode;
use liftoff_server::models::{
    AchievementCategory, AchievementDefinition, RankTier, Rarity, UnlockCriterion,
};
use liftoff_server::progression::achievements::longest_consecutive_run;
use liftoff_server::progression::AchievementEngine;
use uuid::Uuid;

use common::{befriend, create_memory_store, log_workouts_on_days, reference_now, seed_catalog};

fn engine(store: &Arc<dyn ProgressionStore>) -> AchievementEngine {
    AchievementEngine::new(Arc::clone(store), Arc::new(ProgressionConfig::default()))
}

async fn add_achievement(
    store: &Arc<dyn ProgressionStore>,
    name: &str,
    criterion: UnlockCriterion,
) -> AchievementDefinition {
    let achievement = AchievementDefinition::new(
        name,
        format!("{name} description"),
        AchievementCategory::Workout,
        Rarity::Common,
        10,
        criterion,
    );
    store.insert_achievement(&achievement).await.unwrap();
    achievement
}

#[test]
fn test_streak_with_one_missing_day() {
    let dates: Vec<NaiveDate> = [1, 2, 3, 5, 6, 7]
        .iter()
        .map(|d| NaiveDate::from_ymd_opt(2025, 6, *d).unwrap())
        .collect();

    assert_eq!(longest_consecutive_run(&dates, None), 3);
    assert_eq!(longest_consecutive_run(&dates, Some(2)), 2);
    assert_eq!(longest_consecutive_run(&[], None), 0);
}

#[tokio::test]
async fn test_achievement_unlocks_once() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let engine = engine(&store);
    assert!(engine.seed_catalog().await.unwrap() > 0);
    assert_eq!(engine.seed_catalog().await.unwrap(), 0);

    let user = Uuid::new_v4();
    let now = reference_now();
    log_workouts_on_days(&store, user, now, &[0], &catalog.bench_press)
        .await
        .unwrap();

    let first = engine.evaluate_and_unlock(user, now).await.unwrap();
    let names: Vec<&str> = first.iter().map(|u| u.achievement.name.as_str()).collect();
    assert_eq!(names, vec!["First Steps"]);
    assert_eq!(first[0].unlock.snapshot.workout_count, 1);
    assert_eq!(first[0].unlock.snapshot.tier, Some(RankTier::Bronze));

    let second = engine.evaluate_and_unlock(user, now).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(store.unlocks_for(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_consecutive_days_criterion() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let three = add_achievement(
        &store,
        "Three Straight",
        UnlockCriterion::ConsecutiveDays { target: 3 },
    )
    .await;
    let four = add_achievement(
        &store,
        "Four Straight",
        UnlockCriterion::ConsecutiveDays { target: 4 },
    )
    .await;

    let user = Uuid::new_v4();
    let now = reference_now();
    log_workouts_on_days(&store, user, now, &[6, 5, 4, 2, 1, 0], &catalog.squat)
        .await
        .unwrap();

    let unlocked = engine(&store).evaluate_and_unlock(user, now).await.unwrap();
    let ids: Vec<Uuid> = unlocked.iter().map(|u| u.achievement.id).collect();

    assert!(ids.contains(&three.id));
    assert!(!ids.contains(&four.id));
}

#[tokio::test]
async fn test_social_and_tier_criteria() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let social = add_achievement(
        &store,
        "First Friend",
        UnlockCriterion::FriendsCount { target: 1 },
    )
    .await;
    let silver = add_achievement(
        &store,
        "Silver Reached",
        UnlockCriterion::RankTier {
            target: RankTier::Silver,
        },
    )
    .await;

    let user = Uuid::new_v4();
    let now = reference_now();
    // Three consecutive days: 6 workout points + 100 consistency
    log_workouts_on_days(&store, user, now, &[2, 1, 0], &catalog.barbell_row)
        .await
        .unwrap();

    let engine = engine(&store);
    let before = engine.evaluate_and_unlock(user, now).await.unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].achievement.id, silver.id);

    befriend(&store, user, Uuid::new_v4()).await.unwrap();
    let after = engine.evaluate_and_unlock(user, now).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].achievement.id, social.id);
}

#[tokio::test]
async fn test_muscle_group_and_volume_criteria() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let back = add_achievement(
        &store,
        "Back Twice",
        UnlockCriterion::MuscleGroupWorkout {
            muscle_group: "Back".to_owned(),
            target: 2,
        },
    )
    .await;
    let volume = add_achievement(
        &store,
        "Ton Mover",
        UnlockCriterion::VolumeMilestone { target: 3000.0 },
    )
    .await;

    let user = Uuid::new_v4();
    let now = reference_now();
    // Each workout is 3 x 10 x 50 = 1500 volume
    log_workouts_on_days(&store, user, now, &[1], &catalog.pull_up)
        .await
        .unwrap();
    let engine = engine(&store);
    assert!(engine.evaluate_and_unlock(user, now).await.unwrap().is_empty());
    assert!((engine.progress_for(user, back.id, now).await.unwrap() - 0.5).abs() < f64::EPSILON);
    assert!(engine.progress_for(user, volume.id, now).await.unwrap().abs() < f64::EPSILON);

    log_workouts_on_days(&store, user, now, &[0], &catalog.barbell_row)
        .await
        .unwrap();
    let unlocked = engine.evaluate_and_unlock(user, now).await.unwrap();
    assert_eq!(unlocked.len(), 2);
    assert!((engine.progress_for(user, back.id, now).await.unwrap() - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_hidden_achievements_and_user_overview() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let engine = engine(&store);
    engine.seed_catalog().await.unwrap();

    let visible = engine.catalog(None, false).await.unwrap();
    let everything = engine.catalog(None, true).await.unwrap();
    assert_eq!(everything.len(), visible.len() + 1);
    assert!(!visible.iter().any(|a| a.name == "Iron Streak"));

    let social = engine
        .catalog(Some(AchievementCategory::Social), false)
        .await
        .unwrap();
    assert_eq!(social.len(), 2);

    let user = Uuid::new_v4();
    let now = reference_now();
    log_workouts_on_days(&store, user, now, &[0], &catalog.bench_press)
        .await
        .unwrap();
    engine.evaluate_and_unlock(user, now).await.unwrap();

    let overview = engine
        .achievements_for_user(user, None, false, now)
        .await
        .unwrap();
    assert_eq!(overview.stats.total, 20);
    assert_eq!(overview.stats.unlocked, 1);
    assert_eq!(overview.stats.points_earned, 10);
    assert!((overview.stats.completion_percentage - 5.0).abs() < 1e-9);
    assert_eq!(overview.recent.len(), 1);
    assert!(overview.achievements.iter().any(|s| s.achievement.is_hidden));

    let unlocked_only = engine
        .achievements_for_user(user, None, true, now)
        .await
        .unwrap();
    assert_eq!(unlocked_only.achievements.len(), 1);
    assert_eq!(unlocked_only.stats.total, 20);
}

#[tokio::test]
async fn test_near_completion_threshold_and_order() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    add_achievement(&store, "Eight Sessions", UnlockCriterion::WorkoutCount { target: 8 }).await;
    add_achievement(&store, "Ten Sessions", UnlockCriterion::WorkoutCount { target: 10 }).await;
    add_achievement(&store, "Twenty Sessions", UnlockCriterion::WorkoutCount { target: 20 }).await;

    let user = Uuid::new_v4();
    let now = reference_now();
    log_workouts_on_days(&store, user, now, &[10, 8, 6, 4, 2, 0], &catalog.squat)
        .await
        .unwrap();

    let near = engine(&store).near_completion(user, now).await.unwrap();
    let names: Vec<&str> = near
        .achievements
        .iter()
        .map(|s| s.achievement.name.as_str())
        .collect();

    assert_eq!(names, vec!["Eight Sessions", "Ten Sessions"]);
    assert_eq!(near.total_in_progress, 2);
}

#[tokio::test]
async fn test_manual_unlock_rules() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let two = add_achievement(
        &store,
        "Two Sessions",
        UnlockCriterion::WorkoutCount { target: 2 },
    )
    .await;
    let engine = engine(&store);
    let user = Uuid::new_v4();
    let now = reference_now();

    let missing = engine.manual_unlock(user, Uuid::new_v4(), now).await.unwrap_err();
    assert_eq!(missing.code, ErrorCode::ResourceNotFound);

    log_workouts_on_days(&store, user, now, &[0], &catalog.bench_press)
        .await
        .unwrap();
    let not_met = engine.manual_unlock(user, two.id, now).await.unwrap_err();
    assert_eq!(not_met.code, ErrorCode::InvalidInput);

    log_workouts_on_days(&store, user, now, &[1], &catalog.bench_press)
        .await
        .unwrap();
    let unlocked = engine.manual_unlock(user, two.id, now).await.unwrap();
    assert_eq!(unlocked.unlock.snapshot.workout_count, 2);

    let again = engine.manual_unlock(user, two.id, now).await.unwrap_err();
    assert_eq!(again.code, ErrorCode::ResourceAlreadyExists);
}
