// ABOUTME: Challenge participation, progress recomputation and completion tracking
// ABOUTME: Also creates invite-only friend battles and serves challenge listings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! # Challenge Engine
//!
//! A participation moves from joined to completed and never back. Progress is
//! recomputed from scratch over the workouts inside the challenge window on
//! every call, so joining late still credits earlier qualifying workouts.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{
    ChallengeCategory, ChallengeDefinition, ChallengeLeaderboardEntry, ChallengeListing,
    ChallengeQuery, ChallengeType, CompletedChallenge, FriendBattleRequest, FriendBattleView,
    ParticipationStatus, ParticipationView, UserChallengeParticipation, UserChallengesOverview,
    WorkoutRecord,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ProgressionConfig;
use crate::database::ProgressionStore;

const DEFAULT_TARGET_UNIT: &str = "workouts";

/// Progress of a workout history against a challenge
///
/// Only workouts performed inside the window (both ends inclusive) count.
/// Volume is truncated to a whole number; unknown categories score 0.
#[must_use]
pub fn compute_progress(challenge: &ChallengeDefinition, workouts: &[WorkoutRecord]) -> u64 {
    let in_window = workouts
        .iter()
        .filter(|w| challenge.window_contains(w.performed_at));

    match challenge.category {
        ChallengeCategory::WorkoutCount => in_window.count() as u64,
        ChallengeCategory::Volume => {
            let volume: f64 = in_window.map(WorkoutRecord::volume).sum();
            volume.max(0.0) as u64
        }
        ChallengeCategory::Consistency => in_window
            .map(WorkoutRecord::date)
            .collect::<HashSet<_>>()
            .len() as u64,
        ChallengeCategory::Other => 0,
    }
}

/// Tracks challenge participation and serves challenge queries
#[derive(Clone)]
pub struct ChallengeEngine {
    store: Arc<dyn ProgressionStore>,
    config: Arc<ProgressionConfig>,
}

impl ChallengeEngine {
    /// Create a challenge engine
    #[must_use]
    pub fn new(store: Arc<dyn ProgressionStore>, config: Arc<ProgressionConfig>) -> Self {
        Self { store, config }
    }

    async fn require_challenge(&self, challenge_id: Uuid) -> AppResult<ChallengeDefinition> {
        self.store
            .challenge_by_id(challenge_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Challenge {challenge_id}")))
    }

    async fn progress_for(
        &self,
        user_id: Uuid,
        challenge: &ChallengeDefinition,
    ) -> AppResult<u64> {
        let workouts = self
            .store
            .workouts_for(user_id, Some(challenge.start_date), Some(challenge.end_date))
            .await?;
        Ok(compute_progress(challenge, &workouts))
    }

    /// Store a new challenge after checking its window and target
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty name, a zero target or an empty window
    pub async fn create_challenge(&self, challenge: &ChallengeDefinition) -> AppResult<()> {
        if challenge.name.trim().is_empty() {
            return Err(AppError::missing_field("name"));
        }
        if challenge.target_value == 0 {
            return Err(AppError::invalid_input("target_value must be positive"));
        }
        if challenge.end_date <= challenge.start_date {
            return Err(AppError::invalid_input("end_date must be after start_date"));
        }
        self.store.insert_challenge(challenge).await?;
        info!(challenge.id = %challenge.id, name = %challenge.name, "Challenge created");
        Ok(())
    }

    /// Join a challenge and compute the initial progress
    ///
    /// Completion is left to [`Self::recompute_progress`].
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if the challenge does not exist
    /// - `InvalidInput` if it is inactive, ended, not started or full
    /// - `ResourceAlreadyExists` if the user already joined
    /// - `PermissionDenied` for a friend-only challenge the user was not invited to
    pub async fn join(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<UserChallengeParticipation> {
        let challenge = self.require_challenge(challenge_id).await?;

        if !challenge.is_active || now > challenge.end_date {
            return Err(AppError::invalid_input("Challenge is not active"));
        }
        if now < challenge.start_date {
            return Err(AppError::invalid_input("Challenge has not started yet"));
        }
        if self.store.participation_get(user_id, challenge_id).await?.is_some() {
            return Err(AppError::conflict("Already joined this challenge").with_user_id(user_id));
        }
        if let Some(max) = challenge.max_participants {
            if self.store.participant_count(challenge_id).await? >= max {
                return Err(AppError::invalid_input("Challenge is full"));
            }
        }
        if challenge.is_friend_only() && !challenge.is_invited(user_id) {
            return Err(AppError::permission_denied("Not invited to this challenge")
                .with_user_id(user_id));
        }

        let mut participation = UserChallengeParticipation::new(user_id, challenge_id, now);
        let initial = self.progress_for(user_id, &challenge).await?;
        participation.record_progress(initial, now);

        if !self.store.participation_insert(&participation).await? {
            return Err(AppError::conflict("Already joined this challenge").with_user_id(user_id));
        }
        info!(
            user.id = %user_id,
            challenge.id = %challenge_id,
            progress = initial,
            "Joined challenge"
        );
        Ok(participation)
    }

    /// Recompute progress of the user's open participations
    ///
    /// With `challenge_id`, only that participation is considered; otherwise
    /// every open participation in a running challenge. Changes are appended
    /// to the progress history and reaching the target completes the
    /// participation. Returns the participations completed by this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn recompute_progress(
        &self,
        user_id: Uuid,
        challenge_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<CompletedChallenge>> {
        let participations = self.store.participations_for_user(user_id).await?;
        let mut completed = Vec::new();

        for mut participation in participations {
            if participation.completed {
                continue;
            }
            if challenge_id.is_some_and(|id| id != participation.challenge_id) {
                continue;
            }
            let Some(challenge) = self.store.challenge_by_id(participation.challenge_id).await?
            else {
                warn!(
                    challenge.id = %participation.challenge_id,
                    "Participation references a missing challenge"
                );
                continue;
            };
            if challenge_id.is_none() && !challenge.is_running(now) {
                continue;
            }

            let progress = self.progress_for(user_id, &challenge).await?;
            let changed = participation.record_progress(progress, now);
            let finished = participation.complete_if_reached(challenge.target_value, now);
            if !changed && !finished {
                continue;
            }

            self.store.participation_update(&participation).await?;
            debug!(
                user.id = %user_id,
                challenge.id = %challenge.id,
                progress,
                "Challenge progress updated"
            );

            if finished {
                info!(
                    user.id = %user_id,
                    challenge.id = %challenge.id,
                    progress,
                    "Challenge completed"
                );
                completed.push(CompletedChallenge {
                    challenge,
                    participation,
                    final_progress: progress,
                });
            }
        }
        Ok(completed)
    }

    /// Create an invite-only battle between the creator and accepted friends
    ///
    /// The creator joins immediately.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty name, zero target or zero duration
    /// - `PermissionDenied` naming the first invitee who is not an accepted friend
    pub async fn create_friend_battle(
        &self,
        creator_id: Uuid,
        request: FriendBattleRequest,
        now: DateTime<Utc>,
    ) -> AppResult<ChallengeDefinition> {
        if request.name.trim().is_empty() {
            return Err(AppError::missing_field("name"));
        }
        if request.target_value == 0 {
            return Err(AppError::invalid_input("target_value must be positive"));
        }
        let duration_days = request
            .duration_days
            .unwrap_or(self.config.challenges.friend_battle_default_days);
        if duration_days == 0 {
            return Err(AppError::invalid_input("duration_days must be positive"));
        }

        let friends: HashSet<Uuid> = self
            .store
            .accepted_friend_ids(creator_id)
            .await?
            .into_iter()
            .collect();
        if let Some(stranger) = request
            .friend_ids
            .iter()
            .find(|id| **id != creator_id && !friends.contains(*id))
        {
            return Err(AppError::permission_denied(format!("Not friends with user {stranger}"))
                .with_user_id(creator_id));
        }

        let challenge = ChallengeDefinition {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description.unwrap_or_default(),
            challenge_type: ChallengeType::FriendBattle,
            category: request.category,
            target_value: request.target_value,
            target_unit: Some(
                request
                    .target_unit
                    .unwrap_or_else(|| DEFAULT_TARGET_UNIT.to_owned()),
            ),
            points_reward: request
                .points_reward
                .unwrap_or(self.config.challenges.friend_battle_default_reward),
            difficulty: request.difficulty.unwrap_or_default(),
            start_date: now,
            end_date: now + Duration::days(i64::from(duration_days)),
            is_active: true,
            is_global: false,
            max_participants: None,
            creator_id: Some(creator_id),
            invited_user_ids: request.friend_ids,
            created_at: now,
        };
        self.store.insert_challenge(&challenge).await?;

        let mut creator = UserChallengeParticipation::new(creator_id, challenge.id, now);
        let initial = self.progress_for(creator_id, &challenge).await?;
        creator.record_progress(initial, now);
        self.store.participation_insert(&creator).await?;

        info!(
            user.id = %creator_id,
            challenge.id = %challenge.id,
            invited = challenge.invited_user_ids.len(),
            "Friend battle created"
        );
        Ok(challenge)
    }

    /// Joinable challenges, newest first
    ///
    /// Friend battles are only listed when the query asks for that type.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn available_challenges(
        &self,
        query: ChallengeQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ChallengeListing>> {
        let wants_battles = query.challenge_type == Some(ChallengeType::FriendBattle);
        let challenges = self.store.list_challenges().await?;
        let mut listings = Vec::new();

        for challenge in challenges {
            if query.active_only && !challenge.is_running(now) {
                continue;
            }
            if query
                .challenge_type
                .is_some_and(|t| t != challenge.challenge_type)
            {
                continue;
            }
            if query.category.is_some_and(|c| c != challenge.category) {
                continue;
            }
            if !wants_battles && !challenge.is_global {
                continue;
            }

            let participant_count = self.store.participant_count(challenge.id).await?;
            let is_full = challenge
                .max_participants
                .is_some_and(|max| participant_count >= max);
            let days_remaining = challenge.days_remaining(now);
            listings.push(ChallengeListing {
                challenge,
                participant_count,
                is_full,
                days_remaining,
            });
        }
        Ok(listings)
    }

    /// A user's participations filtered by status, with rank and progress fraction
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn user_challenges(
        &self,
        user_id: Uuid,
        status: ParticipationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<UserChallengesOverview> {
        let participations = self.store.participations_for_user(user_id).await?;

        let mut total = 0_u32;
        let mut active = 0_u32;
        let mut completed = 0_u32;
        let mut views = Vec::new();

        for participation in participations {
            let Some(challenge) = self.store.challenge_by_id(participation.challenge_id).await?
            else {
                continue;
            };
            let days_remaining = challenge.days_remaining(now);

            total += 1;
            if participation.completed {
                completed += 1;
            } else if days_remaining > 0 {
                active += 1;
            }

            let included = match status {
                ParticipationStatus::Active => {
                    !participation.completed && challenge.is_active && challenge.end_date >= now
                }
                ParticipationStatus::Completed => participation.completed,
                ParticipationStatus::All => true,
            };
            if !included {
                continue;
            }

            let standings = self.store.participations_for_challenge(challenge.id).await?;
            let user_rank = standings
                .iter()
                .position(|p| p.user_id == user_id)
                .and_then(|index| u32::try_from(index + 1).ok());

            views.push(ParticipationView {
                progress_fraction: challenge.progress_fraction(participation.current_progress),
                is_creator: challenge.creator_id == Some(user_id),
                days_remaining,
                user_rank,
                challenge,
                participation,
            });
        }

        match status {
            ParticipationStatus::Active => {
                views.sort_by(|a, b| a.challenge.end_date.cmp(&b.challenge.end_date));
            }
            ParticipationStatus::Completed => views.sort_by(|a, b| {
                b.participation
                    .completed_at
                    .cmp(&a.participation.completed_at)
            }),
            ParticipationStatus::All => {
                views.sort_by(|a, b| b.challenge.end_date.cmp(&a.challenge.end_date));
            }
        }

        Ok(UserChallengesOverview {
            challenges: views,
            total,
            active,
            completed,
        })
    }

    /// Participants of a challenge by progress, 1-based ranks
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown challenge, or a store error
    pub async fn challenge_leaderboard(
        &self,
        challenge_id: Uuid,
    ) -> AppResult<Vec<ChallengeLeaderboardEntry>> {
        self.require_challenge(challenge_id).await?;
        self.leaderboard_rows(challenge_id).await
    }

    async fn leaderboard_rows(&self, challenge_id: Uuid) -> AppResult<Vec<ChallengeLeaderboardEntry>> {
        let participations = self.store.participations_for_challenge(challenge_id).await?;
        Ok(participations
            .into_iter()
            .zip(1_u32..)
            .map(|(p, rank)| ChallengeLeaderboardEntry {
                rank,
                user_id: p.user_id,
                current_progress: p.current_progress,
                completed: p.completed,
                completed_at: p.completed_at,
                joined_at: p.joined_at,
            })
            .collect())
    }

    /// Active friend battles the user created or was invited to, latest start first
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn friend_battles(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<FriendBattleView>> {
        let challenges = self.store.list_challenges().await?;
        let mut battles = Vec::new();

        for challenge in challenges {
            if challenge.challenge_type != ChallengeType::FriendBattle
                || !challenge.is_active
                || !challenge.is_invited(user_id)
            {
                continue;
            }
            let participation = self.store.participation_get(user_id, challenge.id).await?;
            let leaderboard = self.leaderboard_rows(challenge.id).await?;
            battles.push(FriendBattleView {
                is_creator: challenge.creator_id == Some(user_id),
                has_joined: participation.is_some(),
                current_progress: participation.map_or(0, |p| p.current_progress),
                days_remaining: challenge.days_remaining(now),
                leaderboard,
                challenge,
            });
        }

        battles.sort_by(|a, b| b.challenge.start_date.cmp(&a.challenge.start_date));
        Ok(battles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use liftoff_core::models::{Difficulty, ExerciseDefinition, PerformedExercise};

    fn challenge(category: ChallengeCategory) -> ChallengeDefinition {
        let start = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        ChallengeDefinition {
            id: Uuid::new_v4(),
            name: "July Push".to_owned(),
            description: String::new(),
            challenge_type: ChallengeType::Weekly,
            category,
            target_value: 5,
            target_unit: None,
            points_reward: 100,
            difficulty: Difficulty::Medium,
            start_date: start,
            end_date: start + Duration::days(7),
            is_active: true,
            is_global: true,
            max_participants: None,
            creator_id: None,
            invited_user_ids: Vec::new(),
            created_at: start,
        }
    }

    fn workout_at(day: i64, hour: u32) -> WorkoutRecord {
        let squat = ExerciseDefinition::new("Squat", "Legs", true);
        let at = Utc.with_ymd_and_hms(2025, 7, 1, hour, 0, 0).unwrap() + Duration::days(day);
        WorkoutRecord::new(
            Uuid::nil(),
            "Legs",
            at,
            vec![PerformedExercise::from_definition(&squat, 3, 5, Some(60.5))],
        )
    }

    #[test]
    fn test_workout_count_ignores_outside_window() {
        let workouts = vec![
            workout_at(-2, 9),
            workout_at(0, 9),
            workout_at(2, 9),
            workout_at(9, 9),
        ];
        assert_eq!(compute_progress(&challenge(ChallengeCategory::WorkoutCount), &workouts), 2);
    }

    #[test]
    fn test_volume_truncates() {
        let workouts = vec![workout_at(1, 9), workout_at(2, 9)];
        // 2 * 3 * 5 * 60.5 = 1815
        assert_eq!(compute_progress(&challenge(ChallengeCategory::Volume), &workouts), 1815);
        let one = vec![workout_at(1, 9)];
        // 907.5
        assert_eq!(compute_progress(&challenge(ChallengeCategory::Volume), &one), 907);
    }

    #[test]
    fn test_consistency_counts_distinct_days() {
        let workouts = vec![workout_at(1, 7), workout_at(1, 18), workout_at(3, 7)];
        assert_eq!(compute_progress(&challenge(ChallengeCategory::Consistency), &workouts), 2);
        assert_eq!(compute_progress(&challenge(ChallengeCategory::Other), &workouts), 0);
    }
}
