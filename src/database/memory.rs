// ABOUTME: In-memory progression store behind a tokio RwLock
// ABOUTME: Mirrors the SQLite repository semantics for tests, benches and embedded use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{
    AchievementDefinition, ChallengeDefinition, ExerciseDefinition, FriendStatus, Friendship,
    PersonalRecordEntry, PersonalRecordFilter, RankingScope, RecordType, UserAchievementUnlock,
    UserChallengeParticipation, UserRankingRow, WorkoutRecord,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repositories::{
    AchievementRepository, ChallengeRepository, PersonalRecordRepository, RankingRepository,
    SocialRepository, WorkoutRepository,
};

#[derive(Default)]
struct MemoryState {
    exercises: HashMap<Uuid, ExerciseDefinition>,
    workouts: HashMap<Uuid, WorkoutRecord>,
    rankings: HashMap<(Uuid, String), UserRankingRow>,
    personal_records: Vec<PersonalRecordEntry>,
    achievements: HashMap<Uuid, AchievementDefinition>,
    unlocks: Vec<UserAchievementUnlock>,
    challenges: HashMap<Uuid, ChallengeDefinition>,
    participations: HashMap<(Uuid, Uuid), UserChallengeParticipation>,
    friendships: Vec<Friendship>,
}

/// Progression store held entirely in memory
///
/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn sort_leaderboard(rows: &mut [UserRankingRow]) {
    rows.sort_by(|a, b| b.points.cmp(&a.points).then(a.user_id.cmp(&b.user_id)));
}

// ============================================================================
// Workouts
// ============================================================================

#[async_trait]
impl WorkoutRepository for InMemoryStore {
    async fn insert_exercise(&self, exercise: &ExerciseDefinition) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .exercises
            .values()
            .any(|existing| existing.matches_name(&exercise.name))
        {
            return Err(AppError::conflict(format!(
                "Exercise {} already exists",
                exercise.name
            )));
        }
        state.exercises.insert(exercise.id, exercise.clone());
        Ok(())
    }

    async fn exercise_by_id(&self, exercise_id: Uuid) -> AppResult<Option<ExerciseDefinition>> {
        Ok(self.state.read().await.exercises.get(&exercise_id).cloned())
    }

    async fn exercise_by_name(&self, name: &str) -> AppResult<Option<ExerciseDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .exercises
            .values()
            .find(|exercise| exercise.matches_name(name))
            .cloned())
    }

    async fn list_exercises(&self) -> AppResult<Vec<ExerciseDefinition>> {
        let mut exercises: Vec<_> = self.state.read().await.exercises.values().cloned().collect();
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exercises)
    }

    async fn insert_workout(&self, workout: &WorkoutRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.workouts.contains_key(&workout.id) {
            return Err(AppError::conflict(format!("Workout {} already exists", workout.id)));
        }
        state.workouts.insert(workout.id, workout.clone());
        Ok(())
    }

    async fn replace_workout(&self, workout: &WorkoutRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        match state.workouts.get_mut(&workout.id) {
            Some(existing) => {
                *existing = workout.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!("Workout {}", workout.id))),
        }
    }

    async fn delete_workout(&self, workout_id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.workouts.remove(&workout_id).is_some())
    }

    async fn workout_by_id(&self, workout_id: Uuid) -> AppResult<Option<WorkoutRecord>> {
        Ok(self.state.read().await.workouts.get(&workout_id).cloned())
    }

    async fn workouts_for(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<WorkoutRecord>> {
        let state = self.state.read().await;
        let mut workouts: Vec<_> = state
            .workouts
            .values()
            .filter(|w| w.user_id == user_id)
            .filter(|w| since.is_none_or(|s| w.performed_at >= s))
            .filter(|w| until.is_none_or(|u| w.performed_at <= u))
            .cloned()
            .collect();
        workouts.sort_by(|a, b| a.performed_at.cmp(&b.performed_at).then(a.id.cmp(&b.id)));
        Ok(workouts)
    }
}

// ============================================================================
// Rankings
// ============================================================================

#[async_trait]
impl RankingRepository for InMemoryStore {
    async fn ranking_row(
        &self,
        user_id: Uuid,
        scope: &RankingScope,
    ) -> AppResult<Option<UserRankingRow>> {
        let key = (user_id, scope.as_key().to_owned());
        Ok(self.state.read().await.rankings.get(&key).cloned())
    }

    async fn upsert_ranking(&self, row: &UserRankingRow) -> AppResult<()> {
        let key = (row.user_id, row.scope.as_key().to_owned());
        self.state.write().await.rankings.insert(key, row.clone());
        Ok(())
    }

    async fn rankings_for(&self, user_id: Uuid) -> AppResult<Vec<UserRankingRow>> {
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .rankings
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.scope
                .is_overall()
                .cmp(&a.scope.is_overall())
                .then_with(|| a.scope.as_key().cmp(b.scope.as_key()))
        });
        Ok(rows)
    }

    async fn leaderboard_slice(
        &self,
        scope: &RankingScope,
        offset: u32,
        limit: u32,
    ) -> AppResult<Vec<UserRankingRow>> {
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .rankings
            .values()
            .filter(|row| row.scope == *scope)
            .cloned()
            .collect();
        sort_leaderboard(&mut rows);
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_ranked(&self, scope: &RankingScope) -> AppResult<u32> {
        let state = self.state.read().await;
        Ok(count_u32(
            state.rankings.values().filter(|row| row.scope == *scope).count(),
        ))
    }

    async fn count_ranked_above(&self, scope: &RankingScope, points: u32) -> AppResult<u32> {
        let state = self.state.read().await;
        Ok(count_u32(
            state
                .rankings
                .values()
                .filter(|row| row.scope == *scope && row.points > points)
                .count(),
        ))
    }

    async fn rankings_for_users(
        &self,
        scope: &RankingScope,
        user_ids: &[Uuid],
    ) -> AppResult<Vec<UserRankingRow>> {
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .rankings
            .values()
            .filter(|row| row.scope == *scope && user_ids.contains(&row.user_id))
            .cloned()
            .collect();
        sort_leaderboard(&mut rows);
        Ok(rows)
    }
}

// ============================================================================
// Personal records
// ============================================================================

#[async_trait]
impl PersonalRecordRepository for InMemoryStore {
    async fn personal_record_best(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        record_type: RecordType,
    ) -> AppResult<Option<f64>> {
        let state = self.state.read().await;
        Ok(state
            .personal_records
            .iter()
            .filter(|entry| {
                entry.user_id == user_id
                    && entry.exercise_id == exercise_id
                    && entry.record_type == record_type
            })
            .map(|entry| entry.record_value)
            .reduce(f64::max))
    }

    async fn insert_personal_record(&self, entry: &PersonalRecordEntry) -> AppResult<()> {
        self.state.write().await.personal_records.push(entry.clone());
        Ok(())
    }

    async fn personal_records_for(
        &self,
        user_id: Uuid,
        filter: PersonalRecordFilter,
    ) -> AppResult<Vec<PersonalRecordEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<_> = state
            .personal_records
            .iter()
            .rev()
            .filter(|entry| entry.user_id == user_id)
            .filter(|entry| filter.exercise_id.is_none_or(|id| entry.exercise_id == id))
            .filter(|entry| filter.record_type.is_none_or(|t| entry.record_type == t))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.achieved_at.cmp(&a.achieved_at));
        Ok(entries)
    }

    async fn count_personal_records(&self, user_id: Uuid) -> AppResult<u32> {
        let state = self.state.read().await;
        Ok(count_u32(
            state
                .personal_records
                .iter()
                .filter(|entry| entry.user_id == user_id)
                .count(),
        ))
    }
}

// ============================================================================
// Achievements
// ============================================================================

#[async_trait]
impl AchievementRepository for InMemoryStore {
    async fn insert_achievement(&self, achievement: &AchievementDefinition) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .achievements
            .values()
            .any(|existing| existing.name == achievement.name)
        {
            return Err(AppError::conflict(format!(
                "Achievement {} already exists",
                achievement.name
            )));
        }
        state.achievements.insert(achievement.id, achievement.clone());
        Ok(())
    }

    async fn achievement_catalog(&self) -> AppResult<Vec<AchievementDefinition>> {
        let mut catalog: Vec<_> = self
            .state
            .read()
            .await
            .achievements
            .values()
            .cloned()
            .collect();
        catalog.sort_by(|a, b| {
            a.category
                .as_str()
                .cmp(b.category.as_str())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(catalog)
    }

    async fn achievement_by_id(
        &self,
        achievement_id: Uuid,
    ) -> AppResult<Option<AchievementDefinition>> {
        Ok(self
            .state
            .read()
            .await
            .achievements
            .get(&achievement_id)
            .cloned())
    }

    async fn user_unlock_exists(&self, user_id: Uuid, achievement_id: Uuid) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .unlocks
            .iter()
            .any(|u| u.user_id == user_id && u.achievement_id == achievement_id))
    }

    async fn insert_unlock(&self, unlock: &UserAchievementUnlock) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state
            .unlocks
            .iter()
            .any(|u| u.user_id == unlock.user_id && u.achievement_id == unlock.achievement_id)
        {
            return Ok(false);
        }
        state.unlocks.push(unlock.clone());
        Ok(true)
    }

    async fn unlocks_for(&self, user_id: Uuid) -> AppResult<Vec<UserAchievementUnlock>> {
        let state = self.state.read().await;
        let mut unlocks: Vec<_> = state
            .unlocks
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect();
        unlocks.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));
        Ok(unlocks)
    }
}

// ============================================================================
// Challenges
// ============================================================================

#[async_trait]
impl ChallengeRepository for InMemoryStore {
    async fn insert_challenge(&self, challenge: &ChallengeDefinition) -> AppResult<()> {
        self.state
            .write()
            .await
            .challenges
            .insert(challenge.id, challenge.clone());
        Ok(())
    }

    async fn challenge_by_id(
        &self,
        challenge_id: Uuid,
    ) -> AppResult<Option<ChallengeDefinition>> {
        Ok(self.state.read().await.challenges.get(&challenge_id).cloned())
    }

    async fn list_challenges(&self) -> AppResult<Vec<ChallengeDefinition>> {
        let mut challenges: Vec<_> = self
            .state
            .read()
            .await
            .challenges
            .values()
            .cloned()
            .collect();
        challenges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(challenges)
    }

    async fn participation_get(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> AppResult<Option<UserChallengeParticipation>> {
        Ok(self
            .state
            .read()
            .await
            .participations
            .get(&(user_id, challenge_id))
            .cloned())
    }

    async fn participation_insert(
        &self,
        participation: &UserChallengeParticipation,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let key = (participation.user_id, participation.challenge_id);
        if state.participations.contains_key(&key) {
            return Ok(false);
        }
        state.participations.insert(key, participation.clone());
        Ok(true)
    }

    async fn participation_update(
        &self,
        participation: &UserChallengeParticipation,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let key = (participation.user_id, participation.challenge_id);
        match state.participations.get_mut(&key) {
            Some(existing) if existing.id == participation.id => {
                *existing = participation.clone();
                Ok(())
            }
            _ => Err(AppError::not_found(format!(
                "Participation {}",
                participation.id
            ))),
        }
    }

    async fn participations_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<UserChallengeParticipation>> {
        let state = self.state.read().await;
        let mut participations: Vec<_> = state
            .participations
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        participations.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(participations)
    }

    async fn participations_for_challenge(
        &self,
        challenge_id: Uuid,
    ) -> AppResult<Vec<UserChallengeParticipation>> {
        let state = self.state.read().await;
        let mut participations: Vec<_> = state
            .participations
            .values()
            .filter(|p| p.challenge_id == challenge_id)
            .cloned()
            .collect();
        participations.sort_by(|a, b| {
            b.current_progress
                .cmp(&a.current_progress)
                .then(a.joined_at.cmp(&b.joined_at))
        });
        Ok(participations)
    }

    async fn participant_count(&self, challenge_id: Uuid) -> AppResult<u32> {
        let state = self.state.read().await;
        Ok(count_u32(
            state
                .participations
                .values()
                .filter(|p| p.challenge_id == challenge_id)
                .count(),
        ))
    }
}

// ============================================================================
// Friendships
// ============================================================================

#[async_trait]
impl SocialRepository for InMemoryStore {
    async fn insert_friendship(&self, friendship: &Friendship) -> AppResult<()> {
        self.state.write().await.friendships.push(friendship.clone());
        Ok(())
    }

    async fn update_friendship_status(
        &self,
        friendship_id: Uuid,
        status: FriendStatus,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let friendship = state
            .friendships
            .iter_mut()
            .find(|f| f.id == friendship_id)
            .ok_or_else(|| AppError::not_found(format!("Friendship {friendship_id}")))?;
        friendship.status = status;
        friendship.updated_at = Utc::now();
        Ok(())
    }

    async fn friendship_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> AppResult<Option<Friendship>> {
        let state = self.state.read().await;
        Ok(state
            .friendships
            .iter()
            .filter(|f| f.other_user(user_a) == Some(user_b))
            .max_by_key(|f| f.created_at)
            .cloned())
    }

    async fn accepted_friend_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let state = self.state.read().await;
        let mut friends: Vec<Uuid> = state
            .friendships
            .iter()
            .filter(|f| f.is_accepted())
            .filter_map(|f| f.other_user(user_id))
            .collect();
        friends.sort_unstable();
        friends.dedup();
        Ok(friends)
    }
}
