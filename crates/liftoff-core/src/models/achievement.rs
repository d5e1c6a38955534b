// ABOUTME: Achievement models: typed unlock criteria, catalog definitions and user unlocks
// ABOUTME: Includes the reference achievement catalog shipped with the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ranking::RankTier;

/// Condition a user must satisfy to unlock an achievement
///
/// Serialized with an internal `type` tag, e.g.
/// `{"type": "muscle_group_workout", "muscle_group": "Chest", "target": 10}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnlockCriterion {
    /// Total workouts logged
    WorkoutCount {
        /// Required workouts
        target: u32,
    },
    /// Liftoff points on the overall scope
    TotalPoints {
        /// Required points
        target: u32,
    },
    /// Current overall rank tier
    RankTier {
        /// Tier to reach or exceed
        target: RankTier,
    },
    /// Accepted friendships in either direction
    FriendsCount {
        /// Required friends
        target: u32,
    },
    /// Distinct workouts training one muscle group
    MuscleGroupWorkout {
        /// Muscle group name
        muscle_group: String,
        /// Required workouts
        target: u32,
    },
    /// Longest run of calendar-consecutive workout days
    ConsecutiveDays {
        /// Required run length
        target: u32,
    },
    /// Lifetime volume across every workout
    VolumeMilestone {
        /// Required volume
        target: f64,
    },
}

impl UnlockCriterion {
    /// Tag value used in serialized form
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::WorkoutCount { .. } => "workout_count",
            Self::TotalPoints { .. } => "total_points",
            Self::RankTier { .. } => "rank_tier",
            Self::FriendsCount { .. } => "friends_count",
            Self::MuscleGroupWorkout { .. } => "muscle_group_workout",
            Self::ConsecutiveDays { .. } => "consecutive_days",
            Self::VolumeMilestone { .. } => "volume_milestone",
        }
    }
}

/// Grouping used to browse the catalog
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    /// Workout-count and rank milestones
    Milestone,
    /// Muscle-group focus
    MuscleGroup,
    /// Friend-related
    Social,
    /// Lifetime volume
    Volume,
    /// Training habits such as streaks
    Workout,
}

impl AchievementCategory {
    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Milestone => "milestone",
            Self::MuscleGroup => "muscle_group",
            Self::Social => "social",
            Self::Volume => "volume",
            Self::Workout => "workout",
        }
    }
}

impl fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "milestone" => Ok(Self::Milestone),
            "muscle_group" => Ok(Self::MuscleGroup),
            "social" => Ok(Self::Social),
            "volume" => Ok(Self::Volume),
            "workout" => Ok(Self::Workout),
            other => Err(AppError::invalid_input(format!(
                "Unknown achievement category: {other}"
            ))),
        }
    }
}

/// How rare an achievement is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Most users earn it
    Common,
    /// Takes sustained effort
    Rare,
    /// Takes months of training
    Epic,
    /// Top of the catalog
    Legendary,
}

impl Rarity {
    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            other => Err(AppError::invalid_input(format!("Unknown rarity: {other}"))),
        }
    }
}

/// Catalog entry describing an unlockable achievement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    /// Achievement identifier
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    /// What the user has to do
    pub description: String,
    /// Catalog grouping
    pub category: AchievementCategory,
    /// Rarity label
    pub rarity: Rarity,
    /// Points granted on unlock
    pub points_reward: u32,
    /// Unlock condition
    pub criterion: UnlockCriterion,
    /// Hidden achievements are omitted from the catalog until unlocked
    pub is_hidden: bool,
}

impl AchievementDefinition {
    /// Create a visible achievement with a fresh identifier
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: AchievementCategory,
        rarity: Rarity,
        points_reward: u32,
        criterion: UnlockCriterion,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            category,
            rarity,
            points_reward,
            criterion,
            is_hidden: false,
        }
    }

    /// Mark the achievement hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }
}

/// Stats captured at the moment an achievement unlocked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockSnapshot {
    /// Workouts logged at unlock time
    pub workout_count: u32,
    /// Overall Liftoff points at unlock time
    pub total_points: u32,
    /// Workout component of the points
    pub workout_points: u32,
    /// Consistency component of the points
    pub consistency_points: u32,
    /// Overall tier at unlock time
    pub tier: Option<RankTier>,
}

/// A user's unlock of one achievement; at most one per (user, achievement)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAchievementUnlock {
    /// Unlock identifier
    pub id: Uuid,
    /// User who unlocked it
    pub user_id: Uuid,
    /// Achievement unlocked
    pub achievement_id: Uuid,
    /// When it unlocked
    pub unlocked_at: DateTime<Utc>,
    /// Stats at unlock time
    pub snapshot: UnlockSnapshot,
}

impl UserAchievementUnlock {
    /// Create an unlock record
    #[must_use]
    pub fn new(
        user_id: Uuid,
        achievement_id: Uuid,
        unlocked_at: DateTime<Utc>,
        snapshot: UnlockSnapshot,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            achievement_id,
            unlocked_at,
            snapshot,
        }
    }
}

/// An achievement together with the unlock that was just recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    /// Catalog entry
    pub achievement: AchievementDefinition,
    /// Unlock row
    pub unlock: UserAchievementUnlock,
}

/// Achievement plus the user's status and progress towards it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementStatus {
    /// Catalog entry
    pub achievement: AchievementDefinition,
    /// Unlock row, if unlocked
    pub unlock: Option<UserAchievementUnlock>,
    /// Progress in 0..=1
    pub progress: f64,
}

impl AchievementStatus {
    /// Whether the achievement is unlocked
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlock.is_some()
    }
}

/// Aggregate counters over a user's achievements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AchievementStats {
    /// Achievements unlocked
    pub unlocked: u32,
    /// Achievements in the visible catalog
    pub total: u32,
    /// `unlocked / total` as a percentage
    pub completion_percentage: f64,
    /// Sum of rewards from unlocked achievements
    pub points_earned: u32,
}

/// A user's achievements with progress, totals and recent unlocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAchievementsOverview {
    /// Catalog entries with the user's status, ordered by category then name
    pub achievements: Vec<AchievementStatus>,
    /// Totals over the filtered catalog
    pub stats: AchievementStats,
    /// Unlocks from the last seven days, newest first
    pub recent: Vec<UnlockedAchievement>,
}

/// Locked achievements the user is close to unlocking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearCompletion {
    /// Closest achievements first, truncated to the configured limit
    pub achievements: Vec<AchievementStatus>,
    /// Number of achievements above the threshold before truncation
    pub total_in_progress: u32,
}

// ============================================================================
// Reference catalog
// ============================================================================

fn milestone(
    name: &str,
    description: &str,
    target: u32,
    points: u32,
    rarity: Rarity,
) -> AchievementDefinition {
    AchievementDefinition::new(
        name,
        description,
        AchievementCategory::Milestone,
        rarity,
        points,
        UnlockCriterion::WorkoutCount { target },
    )
}

fn tier_milestone(
    name: &str,
    target: RankTier,
    points: u32,
    rarity: Rarity,
) -> AchievementDefinition {
    AchievementDefinition::new(
        name,
        format!("Reach {target} rank"),
        AchievementCategory::Milestone,
        rarity,
        points,
        UnlockCriterion::RankTier { target },
    )
}

fn muscle_focus(name: &str, muscle_group: &str, label: &str) -> AchievementDefinition {
    AchievementDefinition::new(
        name,
        format!("Complete 10 {label} workouts"),
        AchievementCategory::MuscleGroup,
        Rarity::Rare,
        75,
        UnlockCriterion::MuscleGroupWorkout {
            muscle_group: muscle_group.to_owned(),
            target: 10,
        },
    )
}

/// The achievement catalog shipped with Liftoff
#[must_use]
pub fn default_achievement_catalog() -> Vec<AchievementDefinition> {
    vec![
        milestone("First Steps", "Complete your first workout", 1, 10, Rarity::Common),
        milestone("Getting Started", "Complete 5 workouts", 5, 25, Rarity::Common),
        milestone("Dedicated", "Complete 10 workouts", 10, 50, Rarity::Rare),
        milestone("Committed", "Complete 25 workouts", 25, 100, Rarity::Rare),
        milestone("Fitness Enthusiast", "Complete 50 workouts", 50, 200, Rarity::Epic),
        milestone("Gym Legend", "Complete 100 workouts", 100, 500, Rarity::Legendary),
        tier_milestone("Silver Medalist", RankTier::Silver, 100, Rarity::Rare),
        tier_milestone("Golden Champion", RankTier::Gold, 250, Rarity::Epic),
        tier_milestone("Platinum Elite", RankTier::Platinum, 500, Rarity::Legendary),
        tier_milestone("Diamond Legend", RankTier::Diamond, 1000, Rarity::Legendary),
        muscle_focus("Chest Crusher", "Chest", "chest"),
        muscle_focus("Back Builder", "Back", "back"),
        muscle_focus("Leg Legend", "Legs", "leg"),
        muscle_focus("Shoulder Shredder", "Shoulders", "shoulder"),
        muscle_focus("Arm Architect", "Arms", "arm"),
        AchievementDefinition::new(
            "Social Butterfly",
            "Add your first friend",
            AchievementCategory::Social,
            Rarity::Common,
            25,
            UnlockCriterion::FriendsCount { target: 1 },
        ),
        AchievementDefinition::new(
            "Squad Goals",
            "Add 5 friends",
            AchievementCategory::Social,
            Rarity::Rare,
            100,
            UnlockCriterion::FriendsCount { target: 5 },
        ),
        AchievementDefinition::new(
            "Heavy Lifter",
            "Lift 10,000 total volume",
            AchievementCategory::Volume,
            Rarity::Epic,
            150,
            UnlockCriterion::VolumeMilestone { target: 10_000.0 },
        ),
        AchievementDefinition::new(
            "Volume King",
            "Lift 50,000 total volume",
            AchievementCategory::Volume,
            Rarity::Legendary,
            500,
            UnlockCriterion::VolumeMilestone { target: 50_000.0 },
        ),
        AchievementDefinition::new(
            "Iron Streak",
            "Train 7 days in a row",
            AchievementCategory::Workout,
            Rarity::Epic,
            150,
            UnlockCriterion::ConsecutiveDays { target: 7 },
        )
        .hidden(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criterion_uses_type_tag() {
        let criterion = UnlockCriterion::MuscleGroupWorkout {
            muscle_group: "Chest".to_owned(),
            target: 10,
        };
        let json = serde_json::to_value(&criterion).unwrap();
        assert_eq!(json["type"], "muscle_group_workout");
        assert_eq!(json["muscle_group"], "Chest");

        let parsed: UnlockCriterion =
            serde_json::from_str(r#"{"type":"rank_tier","target":"Gold"}"#).unwrap();
        assert_eq!(parsed, UnlockCriterion::RankTier { target: RankTier::Gold });
    }

    #[test]
    fn test_unknown_criterion_type_is_rejected() {
        let parsed: Result<UnlockCriterion, _> =
            serde_json::from_str(r#"{"type":"marathon_time","target":3}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_default_catalog_names_are_unique() {
        let catalog = default_achievement_catalog();
        let mut names: Vec<&str> = catalog.iter().map(|a| a.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
        assert!(catalog
            .iter()
            .any(|a| a.criterion == UnlockCriterion::WorkoutCount { target: 1 }));
    }
}
