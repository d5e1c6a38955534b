// ABOUTME: Coordinates stats, ranking, personal records, achievements and challenges after a workout change
// ABOUTME: Publishes resulting events to the optional realtime sync target and swallows its failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::sync::Arc;

use chrono::{DateTime, Utc};
use liftoff_core::errors::AppResult;
use liftoff_core::models::{
    CompletedChallenge, PersonalRecordEntry, UnlockedAchievement, UserStats,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ProgressionConfig;
use crate::database::ProgressionStore;
use crate::progression::{
    AchievementEngine, ChallengeEngine, PersonalRecordTracker, RankingEngine, RankingUpdate,
    StatsAggregator,
};
use crate::realtime::{ProgressionEvent, RealtimeSync};

/// What happened to a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "workout_id", rename_all = "snake_case")]
pub enum WorkoutChange {
    /// A workout was logged
    Created(Uuid),
    /// A workout was edited
    Updated(Uuid),
    /// A workout was removed
    Deleted(Uuid),
}

impl WorkoutChange {
    /// Workout affected
    #[must_use]
    pub const fn workout_id(&self) -> Uuid {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Deleted(id) => *id,
        }
    }
}

/// Everything a workout change produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutChangeOutcome {
    /// Fresh raw stats
    pub stats: UserStats,
    /// Ranking rows written
    pub ranking: RankingUpdate,
    /// Personal records set by the workout
    pub new_personal_records: Vec<PersonalRecordEntry>,
    /// Achievements unlocked by this change
    pub newly_unlocked_achievements: Vec<UnlockedAchievement>,
    /// Challenges completed by this change
    pub newly_completed_challenges: Vec<CompletedChallenge>,
}

/// Runs the progression pipeline for one user
#[derive(Clone)]
pub struct ProgressionService {
    store: Arc<dyn ProgressionStore>,
    stats: StatsAggregator,
    ranking: RankingEngine,
    records: PersonalRecordTracker,
    achievements: AchievementEngine,
    challenges: ChallengeEngine,
    sync: Option<Arc<dyn RealtimeSync>>,
}

impl ProgressionService {
    /// Create a service without a realtime sync target
    #[must_use]
    pub fn new(store: Arc<dyn ProgressionStore>, config: Arc<ProgressionConfig>) -> Self {
        Self {
            stats: StatsAggregator::new(Arc::clone(&store)),
            ranking: RankingEngine::new(Arc::clone(&store), Arc::clone(&config)),
            records: PersonalRecordTracker::new(Arc::clone(&store)),
            achievements: AchievementEngine::new(Arc::clone(&store), Arc::clone(&config)),
            challenges: ChallengeEngine::new(Arc::clone(&store), config),
            store,
            sync: None,
        }
    }

    /// Attach a realtime sync target
    #[must_use]
    pub fn with_sync(mut self, sync: Arc<dyn RealtimeSync>) -> Self {
        self.sync = Some(sync);
        self
    }

    /// Underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ProgressionStore> {
        &self.store
    }

    /// Raw stats aggregator
    #[must_use]
    pub const fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    /// Ranking engine
    #[must_use]
    pub const fn ranking(&self) -> &RankingEngine {
        &self.ranking
    }

    /// Personal-record tracker
    #[must_use]
    pub const fn records(&self) -> &PersonalRecordTracker {
        &self.records
    }

    /// Achievement engine
    #[must_use]
    pub const fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }

    /// Challenge engine
    #[must_use]
    pub const fn challenges(&self) -> &ChallengeEngine {
        &self.challenges
    }

    /// Run the pipeline for a change as of now
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails; sync failures are only logged
    pub async fn on_workout_changed(
        &self,
        user_id: Uuid,
        change: WorkoutChange,
    ) -> AppResult<WorkoutChangeOutcome> {
        self.on_workout_changed_at(user_id, change, Utc::now()).await
    }

    /// Run the pipeline for a change as of `now`
    ///
    /// Order: stats, ranking, personal records (skipped for deletions),
    /// achievements, challenges.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails; sync failures are only logged
    pub async fn on_workout_changed_at(
        &self,
        user_id: Uuid,
        change: WorkoutChange,
        now: DateTime<Utc>,
    ) -> AppResult<WorkoutChangeOutcome> {
        let stats = self.stats.user_stats(user_id).await?;
        let ranking = self.ranking.recompute_and_persist(user_id, now).await?;

        let new_personal_records = match change {
            WorkoutChange::Created(id) | WorkoutChange::Updated(id) => {
                match self.store.workout_by_id(id).await? {
                    Some(workout) if workout.user_id == user_id => {
                        self.records.scan_workout(&workout, now).await?
                    }
                    _ => Vec::new(),
                }
            }
            WorkoutChange::Deleted(_) => Vec::new(),
        };

        let newly_unlocked_achievements =
            self.achievements.evaluate_and_unlock(user_id, now).await?;
        let newly_completed_challenges =
            self.challenges.recompute_progress(user_id, None, now).await?;

        info!(
            user.id = %user_id,
            workout.id = %change.workout_id(),
            points = ranking.overall.total_points,
            records = new_personal_records.len(),
            achievements = newly_unlocked_achievements.len(),
            challenges = newly_completed_challenges.len(),
            "Progression updated"
        );

        self.publish(&ProgressionEvent::ranking_updated(user_id, &ranking.overall, now)).await;
        for unlocked in &newly_unlocked_achievements {
            self.publish(&ProgressionEvent::achievement_unlocked(unlocked)).await;
        }
        for completed in &newly_completed_challenges {
            self.publish(&ProgressionEvent::challenge_completed(completed)).await;
        }

        Ok(WorkoutChangeOutcome {
            stats,
            ranking,
            new_personal_records,
            newly_unlocked_achievements,
            newly_completed_challenges,
        })
    }

    async fn publish(&self, event: &ProgressionEvent) {
        let Some(sync) = &self.sync else {
            return;
        };
        if let Err(e) = sync.publish(event).await {
            warn!(event = event.kind(), error = %e, "Realtime sync failed");
        }
    }
}
