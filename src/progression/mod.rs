// ABOUTME: Progression engines: stats, consistency, rankings, personal records, achievements, challenges
// ABOUTME: Each engine reads and writes through the ProgressionStore repository traits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

/// Achievement evaluation and queries
pub mod achievements;
/// Challenge participation and progress
pub mod challenges;
/// Consistency score
pub mod consistency;
/// Personal-record detection
pub mod personal_records;
/// Point formulas and leaderboards
pub mod ranking;
/// Raw workout statistics
pub mod stats;

pub use achievements::{AchievementContext, AchievementEngine};
pub use challenges::{compute_progress, ChallengeEngine};
pub use consistency::{consistency_score, ConsistencyScorer};
pub use personal_records::PersonalRecordTracker;
pub use ranking::{
    legacy_mmr_points, liftoff_points, muscle_group_points, Leaderboard, LeaderboardEntry,
    RankingBreakdown, RankingEngine, RankingUpdate, ViewerStanding,
};
pub use stats::{aggregate_stats, legacy_consistency, StatsAggregator};
