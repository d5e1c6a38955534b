// ABOUTME: Achievement criteria evaluation, unlock recording and achievement queries
// ABOUTME: Unlocks are written insert-if-absent so each (user, achievement) unlocks once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{
    default_achievement_catalog, AchievementCategory, AchievementDefinition, AchievementStats,
    AchievementStatus, LiftoffPoints, NearCompletion, UnlockCriterion, UnlockSnapshot,
    UnlockedAchievement, UserAchievementUnlock, UserAchievementsOverview, WorkoutRecord,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::consistency::distinct_dates;
use super::ranking::RankingEngine;
use crate::config::ProgressionConfig;
use crate::database::ProgressionStore;

const RECENT_UNLOCK_DAYS: i64 = 7;

// ============================================================================
// Criterion evaluation
// ============================================================================

/// Longest run of calendar-consecutive dates in a sorted, distinct list
///
/// With `stop_at`, the scan returns as soon as a run of that length is seen.
#[must_use]
pub fn longest_consecutive_run(dates: &[NaiveDate], stop_at: Option<u32>) -> u32 {
    let Some(first) = dates.first() else {
        return 0;
    };
    let mut previous = *first;
    let mut run = 1_u32;
    let mut longest = 1_u32;
    if stop_at.is_some_and(|target| longest >= target) {
        return longest;
    }

    for date in dates.iter().skip(1) {
        if (*date - previous).num_days() == 1 {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
        if stop_at.is_some_and(|target| longest >= target) {
            return longest;
        }
        previous = *date;
    }
    longest
}

/// Distinct workouts containing at least one exercise of `muscle_group`
#[must_use]
pub fn muscle_group_workout_count(workouts: &[WorkoutRecord], muscle_group: &str) -> u32 {
    let count = workouts
        .iter()
        .filter(|w| w.touches_muscle_group(muscle_group))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Lifetime `sets * reps * weight` over every workout
#[must_use]
pub fn lifetime_volume(workouts: &[WorkoutRecord]) -> f64 {
    workouts.iter().map(WorkoutRecord::volume).sum()
}

fn fraction(value: u32, target: u32) -> f64 {
    if target == 0 {
        return 1.0;
    }
    (f64::from(value) / f64::from(target)).min(1.0)
}

/// Fresh user state every criterion is evaluated against
#[derive(Debug, Clone)]
pub struct AchievementContext {
    /// Whole workout history, oldest first
    pub workouts: Vec<WorkoutRecord>,
    /// Current overall Liftoff points
    pub points: LiftoffPoints,
    /// Accepted friendships
    pub friends_count: u32,
}

impl AchievementContext {
    /// Logged workouts
    #[must_use]
    pub fn workout_count(&self) -> u32 {
        u32::try_from(self.workouts.len()).unwrap_or(u32::MAX)
    }

    /// Whether the criterion is satisfied
    #[must_use]
    pub fn is_met(&self, criterion: &UnlockCriterion) -> bool {
        match criterion {
            UnlockCriterion::WorkoutCount { target } => self.workout_count() >= *target,
            UnlockCriterion::TotalPoints { target } => self.points.total_points >= *target,
            UnlockCriterion::RankTier { target } => self.points.tier.ordinal() >= target.ordinal(),
            UnlockCriterion::FriendsCount { target } => self.friends_count >= *target,
            UnlockCriterion::MuscleGroupWorkout {
                muscle_group,
                target,
            } => muscle_group_workout_count(&self.workouts, muscle_group) >= *target,
            UnlockCriterion::ConsecutiveDays { target } => {
                let dates = distinct_dates(&self.workouts);
                longest_consecutive_run(&dates, Some(*target)) >= *target
            }
            UnlockCriterion::VolumeMilestone { target } => lifetime_volume(&self.workouts) >= *target,
        }
    }

    /// Fractional progress in 0..=1
    ///
    /// Only count-like criteria report partial progress; the rest report 0.
    #[must_use]
    pub fn progress(&self, criterion: &UnlockCriterion) -> f64 {
        match criterion {
            UnlockCriterion::WorkoutCount { target } => fraction(self.workout_count(), *target),
            UnlockCriterion::TotalPoints { target } => fraction(self.points.total_points, *target),
            UnlockCriterion::MuscleGroupWorkout {
                muscle_group,
                target,
            } => fraction(
                muscle_group_workout_count(&self.workouts, muscle_group),
                *target,
            ),
            UnlockCriterion::RankTier { .. }
            | UnlockCriterion::FriendsCount { .. }
            | UnlockCriterion::ConsecutiveDays { .. }
            | UnlockCriterion::VolumeMilestone { .. } => 0.0,
        }
    }

    /// Stats recorded alongside an unlock
    #[must_use]
    pub fn snapshot(&self) -> UnlockSnapshot {
        UnlockSnapshot {
            workout_count: self.workout_count(),
            total_points: self.points.total_points,
            workout_points: self.points.workout_points,
            consistency_points: self.points.consistency_points,
            tier: Some(self.points.tier),
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Evaluates and records achievements and serves achievement queries
#[derive(Clone)]
pub struct AchievementEngine {
    store: Arc<dyn ProgressionStore>,
    config: Arc<ProgressionConfig>,
    ranking: RankingEngine,
}

impl AchievementEngine {
    /// Create an achievement engine
    #[must_use]
    pub fn new(store: Arc<dyn ProgressionStore>, config: Arc<ProgressionConfig>) -> Self {
        let ranking = RankingEngine::new(Arc::clone(&store), Arc::clone(&config));
        Self {
            store,
            config,
            ranking,
        }
    }

    /// Insert every entry of the reference catalog whose name is not stored yet
    ///
    /// Returns the number of entries inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn seed_catalog(&self) -> AppResult<usize> {
        let existing: HashSet<String> = self
            .store
            .achievement_catalog()
            .await?
            .into_iter()
            .map(|a| a.name)
            .collect();

        let mut inserted = 0;
        for achievement in default_achievement_catalog() {
            if existing.contains(&achievement.name) {
                continue;
            }
            self.store.insert_achievement(&achievement).await?;
            inserted += 1;
        }
        if inserted > 0 {
            info!(inserted, "Seeded achievement catalog");
        }
        Ok(inserted)
    }

    /// Load the state criteria are evaluated against
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn context(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<AchievementContext> {
        let workouts = self.store.workouts_for(user_id, None, None).await?;
        let points = self.ranking.overall_points(user_id, now).await?;
        let friends_count = self.store.friends_count(user_id).await?;
        Ok(AchievementContext {
            workouts,
            points,
            friends_count,
        })
    }

    /// Unlock every achievement whose criterion is now met
    ///
    /// Already-unlocked achievements are skipped, and a concurrent unlock of the
    /// same pair is absorbed by the store's insert-if-absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn evaluate_and_unlock(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UnlockedAchievement>> {
        let catalog = self.store.achievement_catalog().await?;
        let unlocked: HashSet<Uuid> = self
            .store
            .unlocks_for(user_id)
            .await?
            .into_iter()
            .map(|u| u.achievement_id)
            .collect();
        let context = self.context(user_id, now).await?;

        let mut newly_unlocked = Vec::new();
        for achievement in catalog {
            if unlocked.contains(&achievement.id) || !context.is_met(&achievement.criterion) {
                continue;
            }
            let unlock = UserAchievementUnlock::new(user_id, achievement.id, now, context.snapshot());
            if !self.store.insert_unlock(&unlock).await? {
                debug!(user.id = %user_id, achievement = %achievement.name, "Unlock already recorded");
                continue;
            }
            info!(
                user.id = %user_id,
                achievement = %achievement.name,
                criterion = achievement.criterion.kind(),
                "Achievement unlocked"
            );
            newly_unlocked.push(UnlockedAchievement {
                achievement,
                unlock,
            });
        }
        Ok(newly_unlocked)
    }

    /// Progress towards one achievement, 1.0 once unlocked
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown achievement, or a store error
    pub async fn progress_for(
        &self,
        user_id: Uuid,
        achievement_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<f64> {
        let achievement = self.require_achievement(achievement_id).await?;
        if self.store.user_unlock_exists(user_id, achievement_id).await? {
            return Ok(1.0);
        }
        let context = self.context(user_id, now).await?;
        Ok(context.progress(&achievement.criterion))
    }

    /// Catalog ordered by category then name
    ///
    /// Hidden achievements are left out unless `include_hidden` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn catalog(
        &self,
        category: Option<AchievementCategory>,
        include_hidden: bool,
    ) -> AppResult<Vec<AchievementDefinition>> {
        Ok(self
            .store
            .achievement_catalog()
            .await?
            .into_iter()
            .filter(|a| category.is_none_or(|c| a.category == c))
            .filter(|a| include_hidden || !a.is_hidden)
            .collect())
    }

    /// Every achievement with the user's status and progress, plus totals and recent unlocks
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn achievements_for_user(
        &self,
        user_id: Uuid,
        category: Option<AchievementCategory>,
        unlocked_only: bool,
        now: DateTime<Utc>,
    ) -> AppResult<UserAchievementsOverview> {
        let catalog = self.catalog(category, true).await?;
        let unlocks: HashMap<Uuid, UserAchievementUnlock> = self
            .store
            .unlocks_for(user_id)
            .await?
            .into_iter()
            .map(|u| (u.achievement_id, u))
            .collect();
        let context = self.context(user_id, now).await?;

        let statuses: Vec<AchievementStatus> = catalog
            .iter()
            .map(|achievement| {
                let unlock = unlocks.get(&achievement.id).cloned();
                let progress = if unlock.is_some() {
                    1.0
                } else {
                    context.progress(&achievement.criterion)
                };
                AchievementStatus {
                    achievement: achievement.clone(),
                    unlock,
                    progress,
                }
            })
            .collect();

        let unlocked = statuses.iter().filter(|s| s.is_unlocked()).count();
        let total = statuses.len();
        let points_earned = statuses
            .iter()
            .filter(|s| s.is_unlocked())
            .map(|s| s.achievement.points_reward)
            .sum();
        let completion_percentage = if total == 0 {
            0.0
        } else {
            unlocked as f64 / total as f64 * 100.0
        };

        let recent_cutoff = now - Duration::days(RECENT_UNLOCK_DAYS);
        let mut recent: Vec<UnlockedAchievement> = catalog
            .iter()
            .filter_map(|achievement| {
                unlocks
                    .get(&achievement.id)
                    .filter(|u| u.unlocked_at >= recent_cutoff)
                    .map(|u| UnlockedAchievement {
                        achievement: achievement.clone(),
                        unlock: u.clone(),
                    })
            })
            .collect();
        recent.sort_by(|a, b| b.unlock.unlocked_at.cmp(&a.unlock.unlocked_at));

        let achievements = if unlocked_only {
            statuses.into_iter().filter(AchievementStatus::is_unlocked).collect()
        } else {
            statuses
        };

        Ok(UserAchievementsOverview {
            achievements,
            stats: AchievementStats {
                unlocked: u32::try_from(unlocked).unwrap_or(u32::MAX),
                total: u32::try_from(total).unwrap_or(u32::MAX),
                completion_percentage,
                points_earned,
            },
            recent,
        })
    }

    /// Visible locked achievements above the configured progress threshold, closest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn near_completion(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<NearCompletion> {
        let catalog = self.catalog(None, false).await?;
        let unlocked: HashSet<Uuid> = self
            .store
            .unlocks_for(user_id)
            .await?
            .into_iter()
            .map(|u| u.achievement_id)
            .collect();
        let context = self.context(user_id, now).await?;
        let threshold = self.config.achievements.near_completion_threshold;

        let mut candidates: Vec<AchievementStatus> = catalog
            .into_iter()
            .filter(|a| !unlocked.contains(&a.id))
            .filter_map(|achievement| {
                let progress = context.progress(&achievement.criterion);
                (progress > threshold).then_some(AchievementStatus {
                    achievement,
                    unlock: None,
                    progress,
                })
            })
            .collect();
        candidates.sort_by(|a, b| b.progress.total_cmp(&a.progress));

        let total_in_progress = u32::try_from(candidates.len()).unwrap_or(u32::MAX);
        candidates.truncate(self.config.achievements.near_completion_limit);

        Ok(NearCompletion {
            achievements: candidates,
            total_in_progress,
        })
    }

    /// Unlock one achievement on request, after checking its criterion
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if the achievement does not exist
    /// - `ResourceAlreadyExists` if the user already unlocked it
    /// - `InvalidInput` if the criterion is not met
    pub async fn manual_unlock(
        &self,
        user_id: Uuid,
        achievement_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<UnlockedAchievement> {
        let achievement = self.require_achievement(achievement_id).await?;
        if self.store.user_unlock_exists(user_id, achievement_id).await? {
            return Err(AppError::conflict("Achievement already unlocked")
                .with_user_id(user_id)
                .with_resource_id(achievement_id.to_string()));
        }

        let context = self.context(user_id, now).await?;
        if !context.is_met(&achievement.criterion) {
            return Err(AppError::invalid_input("Achievement criteria not met")
                .with_user_id(user_id)
                .with_resource_id(achievement_id.to_string()));
        }

        let unlock = UserAchievementUnlock::new(user_id, achievement_id, now, context.snapshot());
        if !self.store.insert_unlock(&unlock).await? {
            return Err(AppError::conflict("Achievement already unlocked").with_user_id(user_id));
        }
        info!(user.id = %user_id, achievement = %achievement.name, "Achievement unlocked manually");
        Ok(UnlockedAchievement {
            achievement,
            unlock,
        })
    }

    async fn require_achievement(&self, achievement_id: Uuid) -> AppResult<AchievementDefinition> {
        self.store
            .achievement_by_id(achievement_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Achievement {achievement_id}")))
    }
}
