// ABOUTME: Point formulas, tier mapping and persisted per-scope ranking rows
// ABOUTME: Keeps the legacy MMR formula and the current Liftoff formula as separate operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! # Ranking Engine
//!
//! Two point formulas live side by side:
//!
//! - **Legacy MMR** (`legacy_mmr`) scores [`UserStats`] and maps onto the
//!   legacy tier names. It is a pure read and is never persisted.
//! - **Liftoff points** (`recompute_and_persist`) combine workout count with
//!   the consistency score for the `overall` scope, and workout count with
//!   lifted volume for each muscle-group scope. These rows back the
//!   leaderboards.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use liftoff_core::constants::scoring::{LEGACY_EXERCISE_DIVISOR, LEGACY_POINTS_PER_RECORD};
use liftoff_core::errors::AppResult;
use liftoff_core::models::{
    LegacyRanking, LiftoffPoints, MuscleGroupPoints, RankTier, RankingScope, TierProgress,
    UserRankingRow, UserStats, WorkoutRecord,
};
use liftoff_core::pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::consistency::ConsistencyScorer;
use super::stats::StatsAggregator;
use crate::config::{ProgressionConfig, RankingConfig};
use crate::database::ProgressionStore;

// ============================================================================
// Pure formulas
// ============================================================================

/// Legacy MMR (Formula A)
///
/// `workouts*2 + exercises/5 + legacy consistency + records*10 + days/7`,
/// using integer division.
#[must_use]
pub const fn legacy_mmr_points(stats: &UserStats) -> u32 {
    stats
        .total_workouts
        .saturating_mul(2)
        .saturating_add(stats.total_exercises / LEGACY_EXERCISE_DIVISOR)
        .saturating_add(stats.consistency_score)
        .saturating_add(stats.personal_records.saturating_mul(LEGACY_POINTS_PER_RECORD))
        .saturating_add(stats.workout_days / 7)
}

/// Liftoff points for the overall scope (Formula B)
#[must_use]
pub fn liftoff_points(workout_count: u32, consistency: u32, config: &RankingConfig) -> LiftoffPoints {
    let workout_points = workout_count.saturating_mul(config.workout_points);
    let total_points = workout_points.saturating_add(consistency);
    LiftoffPoints {
        workout_count,
        workout_points,
        consistency_points: consistency,
        total_points,
        tier: config.tiers.tier_for(total_points),
    }
}

/// Liftoff points for one muscle group
///
/// Only workouts touching the group count, and only that group's entries add volume.
#[must_use]
pub fn muscle_group_points(
    muscle_group: &str,
    workouts: &[WorkoutRecord],
    config: &RankingConfig,
) -> MuscleGroupPoints {
    let touching: Vec<&WorkoutRecord> = workouts
        .iter()
        .filter(|w| w.touches_muscle_group(muscle_group))
        .collect();
    let workout_count = u32::try_from(touching.len()).unwrap_or(u32::MAX);
    let total_volume: f64 = touching
        .iter()
        .map(|w| w.muscle_group_volume(muscle_group))
        .sum();

    let workout_points = workout_count.saturating_mul(config.workout_points);
    let volume_points = (total_volume * config.volume_points_factor).floor().max(0.0) as u32;
    let total_points = workout_points.saturating_add(volume_points);

    MuscleGroupPoints {
        muscle_group: muscle_group.to_owned(),
        workout_count,
        total_volume,
        workout_points,
        volume_points,
        total_points,
        tier: config.tiers.tier_for(total_points),
    }
}

/// Every muscle group appearing in the history, sorted by name
#[must_use]
pub fn trained_muscle_groups(workouts: &[WorkoutRecord]) -> BTreeSet<String> {
    workouts
        .iter()
        .flat_map(|w| &w.exercises)
        .filter(|e| !e.muscle_group.is_empty())
        .map(|e| e.muscle_group.clone())
        .collect()
}

// ============================================================================
// Query outputs
// ============================================================================

/// Rows written by one recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingUpdate {
    /// Overall Liftoff points
    pub overall: LiftoffPoints,
    /// Per-muscle-group points, by group name
    pub muscle_groups: Vec<MuscleGroupPoints>,
}

/// Detailed view of a user's current standing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingBreakdown {
    /// Overall Liftoff points
    pub overall: LiftoffPoints,
    /// Tier color of the overall tier
    pub tier_color: String,
    /// Per-muscle-group points, by group name
    pub muscle_groups: Vec<MuscleGroupPoints>,
    /// Distance to the next overall tier
    pub progress: TierProgress,
}

/// One leaderboard line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: u32,
    /// Ranked user
    pub user_id: Uuid,
    /// Points in the scope
    pub points: u32,
    /// Tier in the scope
    pub tier: RankTier,
}

/// Where the viewing user stands, even when off-page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerStanding {
    /// Number of users with more points, plus one
    pub rank: u32,
    /// Viewer's points
    pub points: u32,
    /// Viewer's tier
    pub tier: RankTier,
}

/// A page of a scope's leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    /// Scope ranked
    pub scope: RankingScope,
    /// Entries on this page
    pub entries: Page<LeaderboardEntry>,
    /// Viewer's own standing, when requested and ranked
    pub viewer: Option<ViewerStanding>,
}

// ============================================================================
// Engine
// ============================================================================

/// Computes and persists ranking rows and serves ranking queries
#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn ProgressionStore>,
    config: Arc<ProgressionConfig>,
    stats: StatsAggregator,
    consistency: ConsistencyScorer,
}

impl RankingEngine {
    /// Create a ranking engine
    #[must_use]
    pub fn new(store: Arc<dyn ProgressionStore>, config: Arc<ProgressionConfig>) -> Self {
        let stats = StatsAggregator::new(Arc::clone(&store));
        let consistency = ConsistencyScorer::new(Arc::clone(&store), config.consistency.clone());
        Self {
            store,
            config,
            stats,
            consistency,
        }
    }

    /// Consistency scorer used for the overall formula
    #[must_use]
    pub const fn consistency(&self) -> &ConsistencyScorer {
        &self.consistency
    }

    /// Overall Liftoff points as of `now`, without persisting
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn overall_points(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<LiftoffPoints> {
        let workouts = self.store.workouts_for(user_id, None, None).await?;
        let consistency = self.consistency.score(user_id, now).await?;
        let workout_count = u32::try_from(workouts.len()).unwrap_or(u32::MAX);
        Ok(liftoff_points(workout_count, consistency, &self.config.ranking))
    }

    async fn compute(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<(LiftoffPoints, Vec<MuscleGroupPoints>)> {
        let workouts = self.store.workouts_for(user_id, None, None).await?;
        let consistency = self.consistency.score(user_id, now).await?;
        let workout_count = u32::try_from(workouts.len()).unwrap_or(u32::MAX);
        let overall = liftoff_points(workout_count, consistency, &self.config.ranking);
        let groups = trained_muscle_groups(&workouts)
            .iter()
            .map(|group| muscle_group_points(group, &workouts, &self.config.ranking))
            .collect();
        Ok((overall, groups))
    }

    /// Recompute the overall row and one row per trained muscle group, then upsert them
    ///
    /// Rows for scopes not recomputed here are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn recompute_and_persist(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<RankingUpdate> {
        let (overall, muscle_groups) = self.compute(user_id, now).await?;

        self.store
            .upsert_ranking(&UserRankingRow {
                user_id,
                scope: RankingScope::Overall,
                points: overall.total_points,
                tier: overall.tier,
                updated_at: now,
            })
            .await?;

        for group in &muscle_groups {
            self.store
                .upsert_ranking(&UserRankingRow {
                    user_id,
                    scope: RankingScope::MuscleGroup(group.muscle_group.clone()),
                    points: group.total_points,
                    tier: group.tier,
                    updated_at: now,
                })
                .await?;
        }

        info!(
            user.id = %user_id,
            points = overall.total_points,
            tier = %overall.tier,
            muscle_groups = muscle_groups.len(),
            "Ranking recomputed"
        );

        Ok(RankingUpdate {
            overall,
            muscle_groups,
        })
    }

    /// Legacy MMR and tier; never persisted
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn legacy_mmr(&self, user_id: Uuid) -> AppResult<LegacyRanking> {
        let stats = self.stats.user_stats(user_id).await?;
        let mmr = legacy_mmr_points(&stats);
        let tier = self.config.ranking.legacy_tiers.tier_for(mmr);
        debug!(user.id = %user_id, mmr, tier = %tier, "Computed legacy MMR");
        Ok(LegacyRanking { stats, mmr, tier })
    }

    /// Every persisted ranking row of a user, overall first
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn get_ranking(&self, user_id: Uuid) -> AppResult<Vec<UserRankingRow>> {
        self.store.rankings_for(user_id).await
    }

    /// Freshly computed points with per-group detail and distance to the next tier
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn ranking_breakdown(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<RankingBreakdown> {
        let (overall, muscle_groups) = self.compute(user_id, now).await?;
        let progress = TierProgress::for_points(overall.total_points, &self.config.ranking.tiers);
        Ok(RankingBreakdown {
            tier_color: overall.tier.color().to_owned(),
            overall,
            muscle_groups,
            progress,
        })
    }

    /// One page of a scope's leaderboard plus the viewer's own standing
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn leaderboard(
        &self,
        scope: &RankingScope,
        request: PageRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<Leaderboard> {
        let rows = self
            .store
            .leaderboard_slice(scope, request.offset(), request.per_page)
            .await?;
        let total = self.store.count_ranked(scope).await?;

        let items = rows
            .into_iter()
            .zip(0_u32..)
            .map(|(row, index)| LeaderboardEntry {
                rank: request.rank_at(index),
                user_id: row.user_id,
                points: row.points,
                tier: row.tier,
            })
            .collect();

        let viewer = match viewer {
            Some(user_id) => self.viewer_standing(user_id, scope).await?,
            None => None,
        };

        Ok(Leaderboard {
            scope: scope.clone(),
            entries: Page::new(items, total, request),
            viewer,
        })
    }

    async fn viewer_standing(
        &self,
        user_id: Uuid,
        scope: &RankingScope,
    ) -> AppResult<Option<ViewerStanding>> {
        let Some(row) = self.store.ranking_row(user_id, scope).await? else {
            return Ok(None);
        };
        let above = self.store.count_ranked_above(scope, row.points).await?;
        Ok(Some(ViewerStanding {
            rank: above.saturating_add(1),
            points: row.points,
            tier: row.tier,
        }))
    }

    /// Leaderboard of a user and their accepted friends in one scope
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn friends_leaderboard(
        &self,
        user_id: Uuid,
        scope: &RankingScope,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let mut members = self.store.accepted_friend_ids(user_id).await?;
        members.push(user_id);
        let rows = self.store.rankings_for_users(scope, &members).await?;

        Ok(rows
            .into_iter()
            .zip(1_u32..)
            .map(|(row, rank)| LeaderboardEntry {
                rank,
                user_id: row.user_id,
                points: row.points,
                tier: row.tier,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use liftoff_core::models::{ExerciseDefinition, PerformedExercise};

    fn workout(entries: &[(&ExerciseDefinition, u32, u32, Option<f64>)]) -> WorkoutRecord {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let exercises = entries
            .iter()
            .map(|(def, sets, reps, weight)| {
                PerformedExercise::from_definition(def, *sets, *reps, *weight)
            })
            .collect();
        WorkoutRecord::new(Uuid::nil(), "Session", at, exercises)
    }

    #[test]
    fn test_legacy_formula() {
        let stats = UserStats {
            total_workouts: 10,
            total_exercises: 12,
            workout_days: 30,
            personal_records: 4,
            consistency_score: 47,
        };
        // 20 + 2 + 47 + 40 + 4
        assert_eq!(legacy_mmr_points(&stats), 113);
        assert_eq!(legacy_mmr_points(&UserStats::default()), 0);
    }

    #[test]
    fn test_liftoff_points_tiers() {
        let config = RankingConfig::default();
        let zero = liftoff_points(0, 0, &config);
        assert_eq!(zero.total_points, 0);
        assert_eq!(zero.tier, RankTier::Bronze);

        let silver = liftoff_points(20, 10, &config);
        assert_eq!(silver.workout_points, 40);
        assert_eq!(silver.total_points, 50);
        assert_eq!(silver.tier, RankTier::Silver);

        assert_eq!(liftoff_points(20, 9, &config).tier, RankTier::Bronze);
    }

    #[test]
    fn test_muscle_group_points_only_count_group_volume() {
        let config = RankingConfig::default();
        let bench = ExerciseDefinition::new("Bench Press", "Chest", true);
        let squat = ExerciseDefinition::new("Squat", "Legs", true);
        let workouts = vec![
            workout(&[(&bench, 3, 10, Some(60.0)), (&squat, 5, 5, Some(100.0))]),
            workout(&[(&squat, 3, 5, None)]),
            workout(&[(&bench, 2, 5, Some(55.5))]),
        ];

        let chest = muscle_group_points("Chest", &workouts, &config);
        assert_eq!(chest.workout_count, 2);
        assert!((chest.total_volume - 2355.0).abs() < f64::EPSILON);
        assert_eq!(chest.workout_points, 4);
        assert_eq!(chest.volume_points, 235);
        assert_eq!(chest.total_points, 239);
        assert_eq!(chest.tier, RankTier::Gold);

        let legs = muscle_group_points("Legs", &workouts, &config);
        assert_eq!(legs.workout_count, 2);
        assert_eq!(legs.volume_points, 250);

        let groups: Vec<_> = trained_muscle_groups(&workouts).into_iter().collect();
        assert_eq!(groups, vec!["Chest".to_owned(), "Legs".to_owned()]);
    }
}
