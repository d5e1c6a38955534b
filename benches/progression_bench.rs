// ABOUTME: Criterion benchmarks for the progression scoring functions and leaderboard queries
// ABOUTME: Measures consistency, stats aggregation, muscle-group points and ranking recompute
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! Criterion benchmarks for progression scoring.
//!
//! Pure scoring functions run over synthetic workout histories; the
//! recompute and leaderboard benchmarks drive the in-memory store.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use liftoff_server::config::{ConsistencyConfig, ProgressionConfig, RankingConfig};
use liftoff_server::database::{
    InMemoryStore, ProgressionStore, RankingRepository, WorkoutRepository,
};
use liftoff_server::models::{
    ChallengeCategory, ChallengeDefinition, ChallengeType, Difficulty, ExerciseDefinition,
    PerformedExercise, RankTier, RankingScope, UserRankingRow, WorkoutRecord,
};
use liftoff_server::pagination::PageRequest;
use liftoff_server::progression::consistency::distinct_dates;
use liftoff_server::progression::{
    aggregate_stats, compute_progress, consistency_score, muscle_group_points, RankingEngine,
};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// History sizes, roughly one week to three years of training
const HISTORY_SIZES: &[usize] = &[10, 100, 1000];

fn bench_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 18, 0, 0).unwrap()
}

fn bench_catalog() -> Vec<ExerciseDefinition> {
    vec![
        ExerciseDefinition::new("Bench Press", "Chest", true),
        ExerciseDefinition::new("Barbell Row", "Back", true),
        ExerciseDefinition::new("Back Squat", "Legs", true),
        ExerciseDefinition::new("Overhead Press", "Shoulders", true),
        ExerciseDefinition::new("Bicep Curl", "Arms", false),
    ]
}

/// Deterministic history with uneven gaps and rotating exercises
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_precision_loss)]
fn generate_history(user_id: Uuid, count: usize, catalog: &[ExerciseDefinition]) -> Vec<WorkoutRecord> {
    let now = bench_now();
    let mut days_ago = 0_i64;
    let mut workouts: Vec<WorkoutRecord> = (0..count)
        .map(|index| {
            days_ago += 1 + (index % 3) as i64;
            let exercises = (0..3)
                .map(|slot| {
                    let exercise = &catalog[(index + slot) % catalog.len()];
                    let weight = 40.0 + ((index * 7 + slot * 13) % 60) as f64;
                    PerformedExercise::from_definition(exercise, 3, 8 + (slot as u32), Some(weight))
                })
                .collect();
            WorkoutRecord::new(
                user_id,
                format!("Bench workout {index}"),
                now - Duration::days(days_ago),
                exercises,
            )
        })
        .collect();
    workouts.sort_by_key(|w| w.performed_at);
    workouts
}

fn bench_consistency(c: &mut Criterion) {
    let mut group = c.benchmark_group("consistency_score");
    let catalog = bench_catalog();
    let config = ConsistencyConfig::default();

    for &count in HISTORY_SIZES {
        let workouts = generate_history(Uuid::new_v4(), count, &catalog);
        let dates = distinct_dates(&workouts);
        group.throughput(Throughput::Elements(dates.len() as u64));
        group.bench_with_input(BenchmarkId::new("dates", count), &dates, |b, dates| {
            b.iter(|| consistency_score(black_box(dates), black_box(&config)));
        });
    }

    group.finish();
}

fn bench_stats_and_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    let catalog = bench_catalog();
    let config = RankingConfig::default();

    for &count in HISTORY_SIZES {
        let workouts = generate_history(Uuid::new_v4(), count, &catalog);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("aggregate_stats", count),
            &workouts,
            |b, workouts| b.iter(|| aggregate_stats(black_box(workouts), 12)),
        );

        group.bench_with_input(
            BenchmarkId::new("muscle_group_points", count),
            &workouts,
            |b, workouts| b.iter(|| muscle_group_points(black_box("Chest"), workouts, &config)),
        );
    }

    group.finish();
}

fn bench_challenge_progress(c: &mut Criterion) {
    let mut group = c.benchmark_group("challenge_progress");
    let catalog = bench_catalog();
    let now = bench_now();
    let workouts = generate_history(Uuid::new_v4(), 1000, &catalog);

    for category in [
        ChallengeCategory::WorkoutCount,
        ChallengeCategory::Volume,
        ChallengeCategory::Consistency,
    ] {
        let challenge = ChallengeDefinition {
            id: Uuid::new_v4(),
            name: "Quarter".to_owned(),
            description: String::new(),
            challenge_type: ChallengeType::Monthly,
            category,
            target_value: 100,
            target_unit: None,
            points_reward: 100,
            difficulty: Difficulty::Hard,
            start_date: now - Duration::days(90),
            end_date: now,
            is_active: true,
            is_global: true,
            max_participants: None,
            creator_id: None,
            invited_user_ids: Vec::new(),
            created_at: now - Duration::days(90),
        };
        group.bench_function(category.as_str(), |b| {
            b.iter(|| compute_progress(black_box(&challenge), black_box(&workouts)));
        });
    }

    group.finish();
}

fn bench_ranking_recompute(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("ranking_recompute");
    group.sample_size(50);
    let catalog = bench_catalog();

    for &count in HISTORY_SIZES {
        let store: Arc<dyn ProgressionStore> = Arc::new(InMemoryStore::new());
        let user = Uuid::new_v4();
        rt.block_on(async {
            for exercise in &catalog {
                store.insert_exercise(exercise).await.unwrap();
            }
            for workout in generate_history(user, count, &catalog) {
                store.insert_workout(&workout).await.unwrap();
            }
        });
        let engine = RankingEngine::new(Arc::clone(&store), Arc::new(ProgressionConfig::default()));

        group.bench_with_input(BenchmarkId::new("workouts", count), &user, |b, user| {
            b.iter(|| {
                rt.block_on(async {
                    engine
                        .recompute_and_persist(black_box(*user), bench_now())
                        .await
                        .unwrap()
                })
            });
        });
    }

    group.finish();
}

fn bench_leaderboard(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("leaderboard");

    let store: Arc<dyn ProgressionStore> = Arc::new(InMemoryStore::new());
    let viewer = Uuid::new_v4();
    rt.block_on(async {
        for index in 0..5000_u32 {
            let user_id = if index == 2500 { viewer } else { Uuid::new_v4() };
            store
                .upsert_ranking(&UserRankingRow {
                    user_id,
                    scope: RankingScope::Overall,
                    points: (index * 37) % 1200,
                    tier: RankTier::Bronze,
                    updated_at: bench_now(),
                })
                .await
                .unwrap();
        }
    });
    let engine = RankingEngine::new(Arc::clone(&store), Arc::new(ProgressionConfig::default()));

    for page in [1_u32, 50] {
        group.bench_with_input(BenchmarkId::new("page_with_viewer", page), &page, |b, page| {
            b.iter(|| {
                rt.block_on(async {
                    engine
                        .leaderboard(
                            &RankingScope::Overall,
                            PageRequest::new(*page, 50),
                            Some(viewer),
                        )
                        .await
                        .unwrap()
                })
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_consistency,
    bench_stats_and_points,
    bench_challenge_progress,
    bench_ranking_recompute,
    bench_leaderboard
);
criterion_main!(benches);
