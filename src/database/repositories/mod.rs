// ABOUTME: Repository traits the progression engines depend on, one per storage concern
// ABOUTME: ProgressionStore bundles them so engines can hold a single Arc<dyn ProgressionStore>
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! Storage abstraction
//!
//! Implementations must make [`RankingRepository::upsert_ranking`] an
//! upsert-by-key on (user, scope) and [`AchievementRepository::insert_unlock`]
//! an insert-if-absent on (user, achievement), so concurrent recomputes never
//! create duplicate rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use liftoff_core::errors::AppResult;
use liftoff_core::models::{
    AchievementDefinition, ChallengeDefinition, ExerciseDefinition, FriendStatus, Friendship,
    PersonalRecordEntry, PersonalRecordFilter, RankingScope, RecordType, UserAchievementUnlock,
    UserChallengeParticipation, UserRankingRow, WorkoutRecord,
};
use uuid::Uuid;

/// Workouts and the exercise catalog
#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    /// Add an exercise to the catalog
    async fn insert_exercise(&self, exercise: &ExerciseDefinition) -> AppResult<()>;

    /// Look up a catalog exercise by id
    async fn exercise_by_id(&self, exercise_id: Uuid) -> AppResult<Option<ExerciseDefinition>>;

    /// Look up a catalog exercise by name, ignoring ASCII case
    async fn exercise_by_name(&self, name: &str) -> AppResult<Option<ExerciseDefinition>>;

    /// Whole catalog ordered by name
    async fn list_exercises(&self) -> AppResult<Vec<ExerciseDefinition>>;

    /// Store a new workout with its exercise entries
    async fn insert_workout(&self, workout: &WorkoutRecord) -> AppResult<()>;

    /// Overwrite a workout, deleting and recreating its exercise entries
    async fn replace_workout(&self, workout: &WorkoutRecord) -> AppResult<()>;

    /// Delete a workout and its entries; returns whether it existed
    async fn delete_workout(&self, workout_id: Uuid) -> AppResult<bool>;

    /// Look up one workout
    async fn workout_by_id(&self, workout_id: Uuid) -> AppResult<Option<WorkoutRecord>>;

    /// A user's workouts performed in `[since, until]`, oldest first
    async fn workouts_for(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<WorkoutRecord>>;
}

/// Persisted ranking rows
#[async_trait]
pub trait RankingRepository: Send + Sync {
    /// Row for one (user, scope)
    async fn ranking_row(
        &self,
        user_id: Uuid,
        scope: &RankingScope,
    ) -> AppResult<Option<UserRankingRow>>;

    /// Insert or overwrite the row for (user, scope)
    async fn upsert_ranking(&self, row: &UserRankingRow) -> AppResult<()>;

    /// Every row of one user, overall first then muscle groups by name
    async fn rankings_for(&self, user_id: Uuid) -> AppResult<Vec<UserRankingRow>>;

    /// Rows of a scope by points descending, ties broken by user id
    async fn leaderboard_slice(
        &self,
        scope: &RankingScope,
        offset: u32,
        limit: u32,
    ) -> AppResult<Vec<UserRankingRow>>;

    /// Number of users ranked in a scope
    async fn count_ranked(&self, scope: &RankingScope) -> AppResult<u32>;

    /// Number of users in a scope with strictly more points
    async fn count_ranked_above(&self, scope: &RankingScope, points: u32) -> AppResult<u32>;

    /// Rows of a scope for the given users
    async fn rankings_for_users(
        &self,
        scope: &RankingScope,
        user_ids: &[Uuid],
    ) -> AppResult<Vec<UserRankingRow>>;
}

/// Append-only personal-record log
#[async_trait]
pub trait PersonalRecordRepository: Send + Sync {
    /// Highest recorded value for (user, exercise, type)
    async fn personal_record_best(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        record_type: RecordType,
    ) -> AppResult<Option<f64>>;

    /// Append a log entry
    async fn insert_personal_record(&self, entry: &PersonalRecordEntry) -> AppResult<()>;

    /// A user's entries, newest first
    async fn personal_records_for(
        &self,
        user_id: Uuid,
        filter: PersonalRecordFilter,
    ) -> AppResult<Vec<PersonalRecordEntry>>;

    /// Number of entries for a user
    async fn count_personal_records(&self, user_id: Uuid) -> AppResult<u32>;
}

/// Achievement catalog and unlocks
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Add a catalog entry
    async fn insert_achievement(&self, achievement: &AchievementDefinition) -> AppResult<()>;

    /// Whole catalog ordered by category then name
    async fn achievement_catalog(&self) -> AppResult<Vec<AchievementDefinition>>;

    /// Look up one achievement
    async fn achievement_by_id(
        &self,
        achievement_id: Uuid,
    ) -> AppResult<Option<AchievementDefinition>>;

    /// Whether the user already unlocked the achievement
    async fn user_unlock_exists(&self, user_id: Uuid, achievement_id: Uuid) -> AppResult<bool>;

    /// Insert unless an unlock for the pair exists; returns whether a row was written
    async fn insert_unlock(&self, unlock: &UserAchievementUnlock) -> AppResult<bool>;

    /// A user's unlocks, newest first
    async fn unlocks_for(&self, user_id: Uuid) -> AppResult<Vec<UserAchievementUnlock>>;
}

/// Challenges and participations
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Store a challenge
    async fn insert_challenge(&self, challenge: &ChallengeDefinition) -> AppResult<()>;

    /// Look up one challenge
    async fn challenge_by_id(&self, challenge_id: Uuid)
        -> AppResult<Option<ChallengeDefinition>>;

    /// Every challenge, newest first
    async fn list_challenges(&self) -> AppResult<Vec<ChallengeDefinition>>;

    /// Participation of one user in one challenge
    async fn participation_get(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> AppResult<Option<UserChallengeParticipation>>;

    /// Insert unless the user already joined; returns whether a row was written
    async fn participation_insert(&self, participation: &UserChallengeParticipation)
        -> AppResult<bool>;

    /// Persist progress, completion and history of an existing participation
    async fn participation_update(&self, participation: &UserChallengeParticipation)
        -> AppResult<()>;

    /// Every participation of a user
    async fn participations_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<UserChallengeParticipation>>;

    /// Every participation in a challenge, progress descending
    async fn participations_for_challenge(
        &self,
        challenge_id: Uuid,
    ) -> AppResult<Vec<UserChallengeParticipation>>;

    /// Number of participants in a challenge
    async fn participant_count(&self, challenge_id: Uuid) -> AppResult<u32>;
}

/// Friendships
#[async_trait]
pub trait SocialRepository: Send + Sync {
    /// Store a friendship
    async fn insert_friendship(&self, friendship: &Friendship) -> AppResult<()>;

    /// Change the status of a friendship
    async fn update_friendship_status(
        &self,
        friendship_id: Uuid,
        status: FriendStatus,
    ) -> AppResult<()>;

    /// Friendship between two users in either direction
    async fn friendship_between(&self, user_a: Uuid, user_b: Uuid)
        -> AppResult<Option<Friendship>>;

    /// Users with an accepted friendship with `user_id`
    async fn accepted_friend_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Number of accepted friendships of `user_id`
    async fn friends_count(&self, user_id: Uuid) -> AppResult<u32> {
        let friends = self.accepted_friend_ids(user_id).await?;
        Ok(u32::try_from(friends.len()).unwrap_or(u32::MAX))
    }
}

/// Everything the progression engines read and write
pub trait ProgressionStore:
    WorkoutRepository
    + RankingRepository
    + PersonalRecordRepository
    + AchievementRepository
    + ChallengeRepository
    + SocialRepository
{
}

impl<T> ProgressionStore for T where
    T: WorkoutRepository
        + RankingRepository
        + PersonalRecordRepository
        + AchievementRepository
        + ChallengeRepository
        + SocialRepository
{
}
