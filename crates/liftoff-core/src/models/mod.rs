// ABOUTME: Domain models shared by the progression engines and the storage layer
// ABOUTME: Re-exports workout, ranking, record, achievement, challenge and social types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! Domain models
//!
//! Plain data types with serde support. Scoring logic lives in the server
//! crate; the small helpers here only derive values from a single record.

/// Achievement definitions, unlock criteria and unlocks
pub mod achievement;
/// Challenges, participations and progress history
pub mod challenge;
/// Personal-record log entries
pub mod personal_record;
/// Rank tiers, scopes and ranking rows
pub mod ranking;
/// Friendships
pub mod social;
/// Workouts and the exercise catalog
pub mod workout;

pub use achievement::{
    default_achievement_catalog, AchievementCategory, AchievementDefinition, AchievementStats,
    AchievementStatus, NearCompletion, Rarity, UnlockCriterion, UnlockSnapshot,
    UnlockedAchievement, UserAchievementUnlock, UserAchievementsOverview,
};
pub use challenge::{
    ChallengeCategory, ChallengeDefinition, ChallengeLeaderboardEntry, ChallengeListing,
    ChallengeQuery, ChallengeType, CompletedChallenge, Difficulty, FriendBattleRequest,
    FriendBattleView, ParticipationStatus, ParticipationView, ProgressHistory,
    ProgressHistoryEntry, UserChallengeParticipation, UserChallengesOverview,
};
pub use personal_record::{
    PersonalRecordEntry, PersonalRecordFilter, PersonalRecordSummary, PersonalRecordView,
    RecordType,
};
pub use ranking::{
    LegacyRanking, LegacyTier, LegacyTierThresholds, LiftoffPoints, MuscleGroupPoints, RankTier,
    RankingScope, TierProgress, TierThresholds, UserRankingRow, UserStats, OVERALL_SCOPE_KEY,
};
pub use social::{FriendStatus, Friendship};
pub use workout::{
    ExerciseDefinition, ExerciseEntry, NamedExerciseEntry, NewWorkout, PerformedExercise,
    WorkoutRecord,
};
