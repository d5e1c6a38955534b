// ABOUTME: Optional realtime sync collaborator notified of progression events
// ABOUTME: BroadcastSync fans events out to in-process subscribers over a tokio broadcast channel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! Realtime sync
//!
//! Delivery is best-effort. The coordinator logs and swallows publish
//! failures, so a broken sync target never fails a workout mutation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{
    AchievementCategory, CompletedChallenge, LiftoffPoints, RankTier, Rarity, UnlockedAchievement,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Flat event payloads pushed to the sync target
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressionEvent {
    /// An achievement was unlocked
    AchievementUnlocked {
        /// User who unlocked it
        user_id: Uuid,
        /// Achievement unlocked
        achievement_id: Uuid,
        /// Achievement name
        name: String,
        /// Catalog category
        category: AchievementCategory,
        /// Rarity label
        rarity: Rarity,
        /// Reward points
        points_reward: u32,
        /// Unlock time
        unlocked_at: DateTime<Utc>,
    },
    /// A challenge participation reached its target
    ChallengeCompleted {
        /// Participant
        user_id: Uuid,
        /// Challenge completed
        challenge_id: Uuid,
        /// Challenge name
        name: String,
        /// Progress when completed
        final_progress: u64,
        /// Target that was reached
        target_value: u64,
        /// Reward points
        points_reward: u32,
        /// Completion time
        completed_at: Option<DateTime<Utc>>,
    },
    /// The overall ranking row was recomputed
    RankingUpdated {
        /// Ranked user
        user_id: Uuid,
        /// Overall points
        total_points: u32,
        /// Workout component
        workout_points: u32,
        /// Consistency component
        consistency_points: u32,
        /// Overall tier
        tier: RankTier,
        /// Recompute time
        updated_at: DateTime<Utc>,
    },
}

impl ProgressionEvent {
    /// Event for a fresh unlock
    #[must_use]
    pub fn achievement_unlocked(unlocked: &UnlockedAchievement) -> Self {
        Self::AchievementUnlocked {
            user_id: unlocked.unlock.user_id,
            achievement_id: unlocked.achievement.id,
            name: unlocked.achievement.name.clone(),
            category: unlocked.achievement.category,
            rarity: unlocked.achievement.rarity,
            points_reward: unlocked.achievement.points_reward,
            unlocked_at: unlocked.unlock.unlocked_at,
        }
    }

    /// Event for a completed challenge
    #[must_use]
    pub fn challenge_completed(completed: &CompletedChallenge) -> Self {
        Self::ChallengeCompleted {
            user_id: completed.participation.user_id,
            challenge_id: completed.challenge.id,
            name: completed.challenge.name.clone(),
            final_progress: completed.final_progress,
            target_value: completed.challenge.target_value,
            points_reward: completed.challenge.points_reward,
            completed_at: completed.participation.completed_at,
        }
    }

    /// Event for a recomputed overall ranking
    #[must_use]
    pub const fn ranking_updated(user_id: Uuid, points: &LiftoffPoints, at: DateTime<Utc>) -> Self {
        Self::RankingUpdated {
            user_id,
            total_points: points.total_points,
            workout_points: points.workout_points,
            consistency_points: points.consistency_points,
            tier: points.tier,
            updated_at: at,
        }
    }

    /// Event name as serialized in the `type` tag
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AchievementUnlocked { .. } => "achievement_unlocked",
            Self::ChallengeCompleted { .. } => "challenge_completed",
            Self::RankingUpdated { .. } => "ranking_updated",
        }
    }
}

/// Sync target for progression events
#[async_trait]
pub trait RealtimeSync: Send + Sync {
    /// Push one event
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be delivered
    async fn publish(&self, event: &ProgressionEvent) -> AppResult<()>;
}

/// In-process fan-out over a tokio broadcast channel
#[derive(Clone)]
pub struct BroadcastSync {
    sender: broadcast::Sender<ProgressionEvent>,
}

impl BroadcastSync {
    /// Create a channel buffering up to `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressionEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl RealtimeSync for BroadcastSync {
    async fn publish(&self, event: &ProgressionEvent) -> AppResult<()> {
        if self.sender.receiver_count() == 0 {
            debug!(event = event.kind(), "No realtime subscribers, dropping event");
            return Ok(());
        }
        self.sender
            .send(event.clone())
            .map_err(|e| AppError::external_service("realtime", format!("Failed to publish event: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let sync = BroadcastSync::new(4);
        let event = ProgressionEvent::RankingUpdated {
            user_id: Uuid::new_v4(),
            total_points: 60,
            workout_points: 40,
            consistency_points: 20,
            tier: RankTier::Silver,
            updated_at: Utc::now(),
        };
        assert!(sync.publish(&event).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let sync = BroadcastSync::new(4);
        let mut receiver = sync.subscribe();
        let event = ProgressionEvent::RankingUpdated {
            user_id: Uuid::new_v4(),
            total_points: 10,
            workout_points: 10,
            consistency_points: 0,
            tier: RankTier::Bronze,
            updated_at: Utc::now(),
        };
        sync.publish(&event).await.unwrap();
        assert_eq!(receiver.recv().await.unwrap(), event);
    }

    #[test]
    fn test_event_tag() {
        let event = ProgressionEvent::RankingUpdated {
            user_id: Uuid::nil(),
            total_points: 0,
            workout_points: 0,
            consistency_points: 0,
            tier: RankTier::Bronze,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ranking_updated");
        assert_eq!(json["tier"], "Bronze");
    }
}
