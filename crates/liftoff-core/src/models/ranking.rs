// ABOUTME: Ranking models: rank tiers, legacy tiers, ranking scopes and stored ranking rows
// ABOUTME: Tier thresholds live here so every scorer classifies points the same way
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

// ============================================================================
// Rank tiers (Liftoff points)
// ============================================================================

/// Rank tier derived from Liftoff points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RankTier {
    /// Entry tier
    Bronze,
    /// Second tier
    Silver,
    /// Third tier
    Gold,
    /// Fourth tier
    Platinum,
    /// Top tier
    Diamond,
}

impl RankTier {
    /// All tiers from lowest to highest
    pub const ALL: [Self; 5] = [
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Platinum,
        Self::Diamond,
    ];

    /// Tier name as stored and displayed
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
            Self::Diamond => "Diamond",
        }
    }

    /// Display color as a hex string
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Bronze => "#CD7F32",
            Self::Silver => "#C0C0C0",
            Self::Gold => "#FFD700",
            Self::Platinum => "#E5E4E2",
            Self::Diamond => "#B9F2FF",
        }
    }

    /// Ordinal used for tier comparisons (Bronze = 1 .. Diamond = 5)
    #[must_use]
    pub const fn ordinal(&self) -> u8 {
        match self {
            Self::Bronze => 1,
            Self::Silver => 2,
            Self::Gold => 3,
            Self::Platinum => 4,
            Self::Diamond => 5,
        }
    }

    /// The tier above this one, if any
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => Some(Self::Diamond),
            Self::Diamond => None,
        }
    }
}

impl fmt::Display for RankTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            "diamond" => Ok(Self::Diamond),
            other => Err(AppError::invalid_input(format!("Unknown rank tier: {other}"))),
        }
    }
}

/// Lower point bounds for each rank tier above Bronze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Points required for Silver
    pub silver: u32,
    /// Points required for Gold
    pub gold: u32,
    /// Points required for Platinum
    pub platinum: u32,
    /// Points required for Diamond
    pub diamond: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            silver: 50,
            gold: 150,
            platinum: 300,
            diamond: 500,
        }
    }
}

impl TierThresholds {
    /// Classify a point total
    #[must_use]
    pub const fn tier_for(&self, points: u32) -> RankTier {
        if points >= self.diamond {
            RankTier::Diamond
        } else if points >= self.platinum {
            RankTier::Platinum
        } else if points >= self.gold {
            RankTier::Gold
        } else if points >= self.silver {
            RankTier::Silver
        } else {
            RankTier::Bronze
        }
    }

    /// Minimum points of a tier
    #[must_use]
    pub const fn threshold_of(&self, tier: RankTier) -> u32 {
        match tier {
            RankTier::Bronze => 0,
            RankTier::Silver => self.silver,
            RankTier::Gold => self.gold,
            RankTier::Platinum => self.platinum,
            RankTier::Diamond => self.diamond,
        }
    }

    /// Whether thresholds strictly increase from Silver to Diamond
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        self.silver > 0
            && self.silver < self.gold
            && self.gold < self.platinum
            && self.platinum < self.diamond
    }
}

// ============================================================================
// Legacy tiers (legacy MMR formula)
// ============================================================================

/// Tier produced by the legacy MMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LegacyTier {
    /// Below 100 MMR
    #[serde(rename = "Bronze Fighter")]
    BronzeFighter,
    /// 100 MMR and above
    #[serde(rename = "Silver Warrior")]
    SilverWarrior,
    /// 300 MMR and above
    #[serde(rename = "Gold Gladiator")]
    GoldGladiator,
    /// 600 MMR and above
    #[serde(rename = "Platinum Spartan")]
    PlatinumSpartan,
    /// 1000 MMR and above
    #[serde(rename = "Diamond Titan")]
    DiamondTitan,
}

impl LegacyTier {
    /// Display label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BronzeFighter => "Bronze Fighter",
            Self::SilverWarrior => "Silver Warrior",
            Self::GoldGladiator => "Gold Gladiator",
            Self::PlatinumSpartan => "Platinum Spartan",
            Self::DiamondTitan => "Diamond Titan",
        }
    }
}

impl fmt::Display for LegacyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower MMR bounds for the legacy tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTierThresholds {
    /// MMR required for Silver Warrior
    pub silver_warrior: u32,
    /// MMR required for Gold Gladiator
    pub gold_gladiator: u32,
    /// MMR required for Platinum Spartan
    pub platinum_spartan: u32,
    /// MMR required for Diamond Titan
    pub diamond_titan: u32,
}

impl Default for LegacyTierThresholds {
    fn default() -> Self {
        Self {
            silver_warrior: 100,
            gold_gladiator: 300,
            platinum_spartan: 600,
            diamond_titan: 1000,
        }
    }
}

impl LegacyTierThresholds {
    /// Classify an MMR value
    #[must_use]
    pub const fn tier_for(&self, mmr: u32) -> LegacyTier {
        if mmr >= self.diamond_titan {
            LegacyTier::DiamondTitan
        } else if mmr >= self.platinum_spartan {
            LegacyTier::PlatinumSpartan
        } else if mmr >= self.gold_gladiator {
            LegacyTier::GoldGladiator
        } else if mmr >= self.silver_warrior {
            LegacyTier::SilverWarrior
        } else {
            LegacyTier::BronzeFighter
        }
    }
}

// ============================================================================
// Scopes and stored rows
// ============================================================================

/// Storage key of the overall scope
pub const OVERALL_SCOPE_KEY: &str = "overall";

/// What a ranking row ranks: overall activity or one muscle group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RankingScope {
    /// Whole-account ranking
    Overall,
    /// Ranking restricted to one muscle group
    MuscleGroup(String),
}

impl RankingScope {
    /// Parse a storage key; `"overall"` maps to [`RankingScope::Overall`]
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        if key == OVERALL_SCOPE_KEY {
            Self::Overall
        } else {
            Self::MuscleGroup(key.to_owned())
        }
    }

    /// Key stored in the rankings table
    #[must_use]
    pub fn as_key(&self) -> &str {
        match self {
            Self::Overall => OVERALL_SCOPE_KEY,
            Self::MuscleGroup(group) => group,
        }
    }

    /// Whether this is the overall scope
    #[must_use]
    pub const fn is_overall(&self) -> bool {
        matches!(self, Self::Overall)
    }
}

impl fmt::Display for RankingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl Serialize for RankingScope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_key())
    }
}

impl<'de> Deserialize<'de> for RankingScope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Self::from_key(&key))
    }
}

/// Persisted ranking for one (user, scope) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRankingRow {
    /// Ranked user
    pub user_id: Uuid,
    /// Overall or a muscle group
    pub scope: RankingScope,
    /// Total Liftoff points in this scope
    pub points: u32,
    /// Tier derived from `points`
    pub tier: RankTier,
    /// When the row was last written
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Scoring outputs
// ============================================================================

/// Aggregate workout statistics for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Number of workouts logged
    pub total_workouts: u32,
    /// Number of distinct exercise names performed
    pub total_exercises: u32,
    /// Days from first to last workout, inclusive
    pub workout_days: u32,
    /// Number of personal-record log entries
    pub personal_records: u32,
    /// Legacy consistency estimate in 0..=100
    pub consistency_score: u32,
}

/// Result of the legacy MMR formula; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRanking {
    /// Statistics the MMR was computed from
    pub stats: UserStats,
    /// Legacy MMR value
    pub mmr: u32,
    /// Legacy tier
    pub tier: LegacyTier,
}

/// Overall Liftoff points breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftoffPoints {
    /// Number of workouts counted
    pub workout_count: u32,
    /// Points earned from workouts
    pub workout_points: u32,
    /// Points earned from consistency
    pub consistency_points: u32,
    /// Sum of both contributions
    pub total_points: u32,
    /// Tier for `total_points`
    pub tier: RankTier,
}

/// Points breakdown for one muscle group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleGroupPoints {
    /// Muscle group name
    pub muscle_group: String,
    /// Distinct workouts touching the group
    pub workout_count: u32,
    /// Volume of the group's exercises
    pub total_volume: f64,
    /// Points earned from workouts
    pub workout_points: u32,
    /// Points earned from volume
    pub volume_points: u32,
    /// Sum of both contributions
    pub total_points: u32,
    /// Tier for `total_points`
    pub tier: RankTier,
}

/// Distance from the current tier to the next one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierProgress {
    /// Tier currently held
    pub current_tier: RankTier,
    /// Next tier, absent at Diamond
    pub next_tier: Option<RankTier>,
    /// Points needed for the next tier; equals the current points at Diamond
    pub next_threshold: u32,
    /// Remaining points, never negative
    pub points_needed: u32,
    /// Fraction of the way to the next tier, clamped to 0..=1
    pub progress: f64,
}

impl TierProgress {
    /// Compute tier progress for a point total
    #[must_use]
    pub fn for_points(points: u32, thresholds: &TierThresholds) -> Self {
        let current_tier = thresholds.tier_for(points);
        let next_tier = current_tier.next();
        let next_threshold = next_tier.map_or(points, |tier| thresholds.threshold_of(tier));
        let points_needed = next_threshold.saturating_sub(points);
        let progress = if next_threshold == 0 {
            1.0
        } else {
            (f64::from(points) / f64::from(next_threshold)).clamp(0.0, 1.0)
        };
        Self {
            current_tier,
            next_tier,
            next_threshold,
            points_needed,
            progress,
        }
    }
}
