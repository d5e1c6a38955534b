// ABOUTME: Integration tests for challenge joining, progress recomputation and friend battles
// ABOUTME: Covers late joins, join rejections, listings and per-category progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use liftoff_server::config::ProgressionConfig;
use liftoff_server::database::{ChallengeRepository, ProgressionStore};
use liftoff_server::errors::ErrorCode;
use liftoff_server::models::{
    ChallengeCategory, ChallengeDefinition, ChallengeQuery, ChallengeType, FriendBattleRequest,
    ParticipationStatus,
};
use liftoff_server::progression::{compute_progress, ChallengeEngine};
use uuid::Uuid;

use common::{
    befriend, community_challenge, create_memory_store, log_workouts_on_days, reference_now,
    seed_catalog,
};

fn engine(store: &Arc<dyn ProgressionStore>) -> ChallengeEngine {
    ChallengeEngine::new(Arc::clone(store), Arc::new(ProgressionConfig::default()))
}

/// Workout-count challenge running ten days either side of `now`
fn running_challenge(now: DateTime<Utc>, target: u64) -> ChallengeDefinition {
    community_challenge(
        ChallengeCategory::WorkoutCount,
        target,
        now - Duration::days(10),
        now + Duration::days(10),
    )
}

fn battle_request(friend_ids: Vec<Uuid>) -> FriendBattleRequest {
    FriendBattleRequest {
        name: "Push-off".to_owned(),
        description: None,
        category: ChallengeCategory::WorkoutCount,
        target_value: 3,
        target_unit: None,
        friend_ids,
        duration_days: None,
        points_reward: None,
        difficulty: None,
    }
}

#[tokio::test]
async fn test_late_join_credits_window_and_completes_on_recompute() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let engine = engine(&store);
    let now = reference_now();
    let user = Uuid::new_v4();

    let challenge = running_challenge(now, 5);
    engine.create_challenge(&challenge).await.unwrap();

    // Five inside the window, three before it opened
    log_workouts_on_days(&store, user, now, &[0, 1, 2, 3, 4], &catalog.squat)
        .await
        .unwrap();
    log_workouts_on_days(&store, user, now, &[20, 21, 22], &catalog.squat)
        .await
        .unwrap();

    let joined = engine.join(user, challenge.id, now).await.unwrap();
    assert_eq!(joined.current_progress, 5);
    assert!(!joined.completed);
    assert_eq!(joined.progress_history.len(), 1);

    let completed = engine.recompute_progress(user, None, now).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].final_progress, 5);
    assert_eq!(completed[0].participation.completed_at, Some(now));

    assert!(engine
        .recompute_progress(user, None, now)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_progress_history_records_changes_only() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let engine = engine(&store);
    let now = reference_now();
    let user = Uuid::new_v4();

    let challenge = running_challenge(now, 10);
    engine.create_challenge(&challenge).await.unwrap();
    engine.join(user, challenge.id, now).await.unwrap();

    // Joining with no workouts leaves progress at zero and the history empty
    let fresh = store.participation_get(user, challenge.id).await.unwrap().unwrap();
    assert!(fresh.progress_history.is_empty());

    log_workouts_on_days(&store, user, now, &[1, 0], &catalog.bench_press)
        .await
        .unwrap();
    engine.recompute_progress(user, None, now).await.unwrap();
    engine.recompute_progress(user, None, now).await.unwrap();

    let stored = store.participation_get(user, challenge.id).await.unwrap().unwrap();
    assert_eq!(stored.current_progress, 2);
    assert_eq!(stored.progress_history.len(), 1);
    assert_eq!(stored.progress_history.latest().unwrap().delta, 2);
    assert!(!stored.completed);
}

#[tokio::test]
async fn test_join_rejections() {
    let store = create_memory_store();
    let engine = engine(&store);
    let now = reference_now();
    let user = Uuid::new_v4();

    let missing = engine.join(user, Uuid::new_v4(), now).await.unwrap_err();
    assert_eq!(missing.code, ErrorCode::ResourceNotFound);

    let upcoming = community_challenge(
        ChallengeCategory::WorkoutCount,
        5,
        now + Duration::days(1),
        now + Duration::days(8),
    );
    engine.create_challenge(&upcoming).await.unwrap();
    let err = engine.join(user, upcoming.id, now).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let ended = community_challenge(
        ChallengeCategory::WorkoutCount,
        5,
        now - Duration::days(8),
        now - Duration::days(1),
    );
    engine.create_challenge(&ended).await.unwrap();
    let err = engine.join(user, ended.id, now).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let mut paused = running_challenge(now, 5);
    paused.is_active = false;
    engine.create_challenge(&paused).await.unwrap();
    let err = engine.join(user, paused.id, now).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let mut small = running_challenge(now, 5);
    small.max_participants = Some(1);
    engine.create_challenge(&small).await.unwrap();
    engine.join(Uuid::new_v4(), small.id, now).await.unwrap();
    let err = engine.join(user, small.id, now).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let open = running_challenge(now, 5);
    engine.create_challenge(&open).await.unwrap();
    engine.join(user, open.id, now).await.unwrap();
    let err = engine.join(user, open.id, now).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_friend_only_challenge_requires_invite() {
    let store = create_memory_store();
    let engine = engine(&store);
    let now = reference_now();
    let invited = Uuid::new_v4();

    let mut private = running_challenge(now, 5);
    private.creator_id = Some(Uuid::new_v4());
    private.is_global = false;
    private.invited_user_ids = vec![invited];
    engine.create_challenge(&private).await.unwrap();

    let err = engine
        .join(Uuid::new_v4(), private.id, now)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    assert!(engine.join(invited, private.id, now).await.is_ok());
}

#[tokio::test]
async fn test_create_challenge_validation() {
    let store = create_memory_store();
    let engine = engine(&store);
    let now = reference_now();

    let mut unnamed = running_challenge(now, 5);
    unnamed.name = "  ".to_owned();
    let err = engine.create_challenge(&unnamed).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    let zero = running_challenge(now, 0);
    let err = engine.create_challenge(&zero).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let inverted = community_challenge(ChallengeCategory::Volume, 1000, now, now);
    let err = engine.create_challenge(&inverted).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    assert!(store.list_challenges().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_friend_battle_requires_accepted_friends() {
    let store = create_memory_store();
    let engine = engine(&store);
    let now = reference_now();
    let creator = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let err = engine
        .create_friend_battle(creator, battle_request(vec![stranger]), now)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    assert!(err.message.contains(&stranger.to_string()));
    assert!(store.list_challenges().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_friend_battle_flow() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let engine = engine(&store);
    let now = reference_now();
    let creator = Uuid::new_v4();
    let friend = Uuid::new_v4();
    befriend(&store, creator, friend).await.unwrap();

    let battle = engine
        .create_friend_battle(creator, battle_request(vec![friend]), now)
        .await
        .unwrap();
    assert_eq!(battle.challenge_type, ChallengeType::FriendBattle);
    assert_eq!(battle.end_date - battle.start_date, Duration::days(7));
    assert_eq!(battle.points_reward, 50);
    assert_eq!(battle.target_unit.as_deref(), Some("workouts"));
    assert!(!battle.is_global);

    // Creator is already in
    let err = engine.join(creator, battle.id, now).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);

    let later = now + Duration::days(1);
    log_workouts_on_days(&store, friend, later, &[0], &catalog.pull_up)
        .await
        .unwrap();
    engine.join(friend, battle.id, later).await.unwrap();

    let board = engine.challenge_leaderboard(battle.id).await.unwrap();
    let standings: Vec<(u32, Uuid, u64)> = board
        .iter()
        .map(|e| (e.rank, e.user_id, e.current_progress))
        .collect();
    assert_eq!(standings, vec![(1, friend, 1), (2, creator, 0)]);

    let views = engine.friend_battles(friend, later).await.unwrap();
    assert_eq!(views.len(), 1);
    assert!(!views[0].is_creator);
    assert!(views[0].has_joined);
    assert_eq!(views[0].current_progress, 1);
    assert_eq!(views[0].days_remaining, 6);
    assert_eq!(views[0].leaderboard.len(), 2);

    assert!(engine
        .friend_battles(Uuid::new_v4(), later)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_available_challenges_hide_battles_unless_requested() {
    let store = create_memory_store();
    let engine = engine(&store);
    let now = reference_now();
    let creator = Uuid::new_v4();
    let friend = Uuid::new_v4();
    befriend(&store, creator, friend).await.unwrap();

    let community = running_challenge(now, 5);
    engine.create_challenge(&community).await.unwrap();
    let expired = community_challenge(
        ChallengeCategory::Consistency,
        3,
        now - Duration::days(30),
        now - Duration::days(20),
    );
    engine.create_challenge(&expired).await.unwrap();
    engine
        .create_friend_battle(creator, battle_request(vec![friend]), now)
        .await
        .unwrap();

    let listed = engine
        .available_challenges(ChallengeQuery::default(), now)
        .await
        .unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|l| l.challenge.id).collect();
    assert_eq!(ids, vec![community.id]);
    assert_eq!(listed[0].days_remaining, 10);
    assert!(!listed[0].is_full);

    let everything = engine
        .available_challenges(
            ChallengeQuery {
                active_only: false,
                ..ChallengeQuery::default()
            },
            now,
        )
        .await
        .unwrap();
    assert_eq!(everything.len(), 2);

    let battles = engine
        .available_challenges(
            ChallengeQuery {
                challenge_type: Some(ChallengeType::FriendBattle),
                ..ChallengeQuery::default()
            },
            now,
        )
        .await
        .unwrap();
    assert_eq!(battles.len(), 1);
    assert_eq!(battles[0].participant_count, 1);
}

#[tokio::test]
async fn test_user_challenges_filter_by_status() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let engine = engine(&store);
    let now = reference_now();
    let user = Uuid::new_v4();

    let easy = running_challenge(now, 1);
    let hard = running_challenge(now, 50);
    engine.create_challenge(&easy).await.unwrap();
    engine.create_challenge(&hard).await.unwrap();
    engine.join(user, easy.id, now).await.unwrap();
    engine.join(user, hard.id, now).await.unwrap();

    log_workouts_on_days(&store, user, now, &[0], &catalog.barbell_row)
        .await
        .unwrap();
    engine.recompute_progress(user, None, now).await.unwrap();

    let active = engine
        .user_challenges(user, ParticipationStatus::Active, now)
        .await
        .unwrap();
    assert_eq!(active.challenges.len(), 1);
    assert_eq!(active.challenges[0].challenge.id, hard.id);
    assert!((active.challenges[0].progress_fraction - 0.02).abs() < 1e-9);
    assert_eq!(active.challenges[0].user_rank, Some(1));
    assert_eq!(active.total, 2);
    assert_eq!(active.active, 1);
    assert_eq!(active.completed, 1);

    let completed = engine
        .user_challenges(user, ParticipationStatus::Completed, now)
        .await
        .unwrap();
    assert_eq!(completed.challenges.len(), 1);
    assert_eq!(completed.challenges[0].challenge.id, easy.id);
    assert!((completed.challenges[0].progress_fraction - 1.0).abs() < f64::EPSILON);

    let all = engine
        .user_challenges(user, ParticipationStatus::All, now)
        .await
        .unwrap();
    assert_eq!(all.challenges.len(), 2);
}

#[tokio::test]
async fn test_progress_by_category() {
    let store = create_memory_store();
    let catalog = seed_catalog(&store).await.unwrap();
    let now = reference_now();
    let user = Uuid::new_v4();

    // Two workouts on the same day plus one on the day before
    let mut workouts = log_workouts_on_days(&store, user, now, &[0, 1], &catalog.squat)
        .await
        .unwrap();
    workouts.extend(
        log_workouts_on_days(&store, user, now - Duration::hours(2), &[0], &catalog.squat)
            .await
            .unwrap(),
    );

    let start = now - Duration::days(3);
    let end = now + Duration::days(3);
    let count = community_challenge(ChallengeCategory::WorkoutCount, 10, start, end);
    let volume = community_challenge(ChallengeCategory::Volume, 10_000, start, end);
    let days = community_challenge(ChallengeCategory::Consistency, 5, start, end);
    let other = community_challenge(ChallengeCategory::Other, 5, start, end);

    assert_eq!(compute_progress(&count, &workouts), 3);
    assert_eq!(compute_progress(&volume, &workouts), 4500);
    assert_eq!(compute_progress(&days, &workouts), 2);
    assert_eq!(compute_progress(&other, &workouts), 0);
}
