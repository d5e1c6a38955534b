// ABOUTME: Progression scoring configuration: consistency, ranking, achievements, challenges
// ABOUTME: Defaults match the shipped scoring rules; every value can be overridden via LIFTOFF_ env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! Progression Configuration Module
//!
//! Scoring parameters used by the ranking and progression engines. All values
//! can be overridden via environment variables with the `LIFTOFF_` prefix.

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

use liftoff_core::constants::{achievements, challenges, scoring};
use liftoff_core::models::{LegacyTierThresholds, TierThresholds};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::ConfigError;

/// Global configuration singleton
static PROGRESSION_CONFIG: OnceLock<ProgressionConfig> = OnceLock::new();

const WEIGHT_TOTAL: f64 = 100.0;

// ============================================================================
// Main Configuration
// ============================================================================

/// Progression configuration container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Consistency score parameters
    pub consistency: ConsistencyConfig,
    /// Point formulas and tier thresholds
    pub ranking: RankingConfig,
    /// Achievement query tuning
    pub achievements: AchievementConfig,
    /// Challenge defaults
    pub challenges: ChallengeConfig,
}

impl ProgressionConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        PROGRESSION_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load progression config: {e}, using defaults");
                Self::default()
            })
        })
    }

    /// Load configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consistency.window_days == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "consistency window_days must be > 0",
            ));
        }

        if self.consistency.frequency_weight < 0.0 || self.consistency.regularity_weight < 0.0 {
            return Err(ConfigError::InvalidWeights(
                "consistency weights must not be negative",
            ));
        }

        let weight_sum = self.consistency.frequency_weight + self.consistency.regularity_weight;
        if (weight_sum - WEIGHT_TOTAL).abs() > f64::EPSILON {
            return Err(ConfigError::InvalidWeights(
                "frequency_weight + regularity_weight must equal 100",
            ));
        }

        if self.ranking.volume_points_factor < 0.0 || !self.ranking.volume_points_factor.is_finite()
        {
            return Err(ConfigError::ValueOutOfRange(
                "volume_points_factor must be a finite value >= 0",
            ));
        }

        if !self.ranking.tiers.is_ascending() {
            return Err(ConfigError::InvalidRange(
                "tier thresholds must be strictly ascending",
            ));
        }

        let legacy = &self.ranking.legacy_tiers;
        if !(legacy.silver_warrior < legacy.gold_gladiator
            && legacy.gold_gladiator < legacy.platinum_spartan
            && legacy.platinum_spartan < legacy.diamond_titan)
        {
            return Err(ConfigError::InvalidRange(
                "legacy tier thresholds must be strictly ascending",
            ));
        }

        if !(0.0..=1.0).contains(&self.achievements.near_completion_threshold) {
            return Err(ConfigError::ValueOutOfRange(
                "near_completion_threshold must be between 0 and 1",
            ));
        }

        if self.challenges.friend_battle_default_days == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "friend_battle_default_days must be > 0",
            ));
        }

        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Consistency
        Self::apply_env_var(
            "LIFTOFF_CONSISTENCY_WINDOW_DAYS",
            &mut self.consistency.window_days,
        )?;
        Self::apply_env_var(
            "LIFTOFF_FREQUENCY_WEIGHT",
            &mut self.consistency.frequency_weight,
        )?;
        Self::apply_env_var(
            "LIFTOFF_REGULARITY_WEIGHT",
            &mut self.consistency.regularity_weight,
        )?;
        Self::apply_env_var(
            "LIFTOFF_SINGLE_DAY_POINTS",
            &mut self.consistency.single_day_points,
        )?;

        // Ranking
        Self::apply_env_var("LIFTOFF_WORKOUT_POINTS", &mut self.ranking.workout_points)?;
        Self::apply_env_var(
            "LIFTOFF_VOLUME_POINTS_FACTOR",
            &mut self.ranking.volume_points_factor,
        )?;
        Self::apply_env_var("LIFTOFF_TIER_SILVER", &mut self.ranking.tiers.silver)?;
        Self::apply_env_var("LIFTOFF_TIER_GOLD", &mut self.ranking.tiers.gold)?;
        Self::apply_env_var("LIFTOFF_TIER_PLATINUM", &mut self.ranking.tiers.platinum)?;
        Self::apply_env_var("LIFTOFF_TIER_DIAMOND", &mut self.ranking.tiers.diamond)?;

        // Achievements
        Self::apply_env_var(
            "LIFTOFF_NEAR_COMPLETION_THRESHOLD",
            &mut self.achievements.near_completion_threshold,
        )?;
        Self::apply_env_var(
            "LIFTOFF_NEAR_COMPLETION_LIMIT",
            &mut self.achievements.near_completion_limit,
        )?;

        // Challenges
        Self::apply_env_var(
            "LIFTOFF_FRIEND_BATTLE_DAYS",
            &mut self.challenges.friend_battle_default_days,
        )?;
        Self::apply_env_var(
            "LIFTOFF_FRIEND_BATTLE_REWARD",
            &mut self.challenges.friend_battle_default_reward,
        )?;

        Ok(self)
    }
}

// ============================================================================
// Consistency Configuration
// ============================================================================

/// Consistency score parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    /// Trailing window in days
    pub window_days: u32,
    /// Maximum frequency contribution
    pub frequency_weight: f64,
    /// Maximum regularity contribution; also the variance cut-off
    pub regularity_weight: f64,
    /// Points per date when fewer than two dates exist
    pub single_day_points: u32,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            window_days: scoring::CONSISTENCY_WINDOW_DAYS,
            frequency_weight: scoring::FREQUENCY_WEIGHT,
            regularity_weight: scoring::REGULARITY_WEIGHT,
            single_day_points: scoring::SINGLE_DAY_POINTS,
        }
    }
}

// ============================================================================
// Ranking Configuration
// ============================================================================

/// Point formula parameters and tier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Points per workout
    pub workout_points: u32,
    /// Points per unit of muscle-group volume
    pub volume_points_factor: f64,
    /// Liftoff tier thresholds
    pub tiers: TierThresholds,
    /// Legacy MMR tier thresholds
    pub legacy_tiers: LegacyTierThresholds,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            workout_points: scoring::WORKOUT_POINTS,
            volume_points_factor: scoring::VOLUME_POINTS_FACTOR,
            tiers: TierThresholds::default(),
            legacy_tiers: LegacyTierThresholds::default(),
        }
    }
}

// ============================================================================
// Achievement Configuration
// ============================================================================

/// Achievement query tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementConfig {
    /// Progress strictly above which an achievement is "near completion"
    pub near_completion_threshold: f64,
    /// Maximum near-completion results
    pub near_completion_limit: usize,
}

impl Default for AchievementConfig {
    fn default() -> Self {
        Self {
            near_completion_threshold: achievements::NEAR_COMPLETION_THRESHOLD,
            near_completion_limit: achievements::NEAR_COMPLETION_LIMIT,
        }
    }
}

// ============================================================================
// Challenge Configuration
// ============================================================================

/// Challenge defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Friend battle window when none is requested
    pub friend_battle_default_days: u32,
    /// Friend battle reward when none is requested
    pub friend_battle_default_reward: u32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            friend_battle_default_days: challenges::FRIEND_BATTLE_DEFAULT_DAYS,
            friend_battle_default_reward: challenges::FRIEND_BATTLE_DEFAULT_REWARD,
        }
    }
}
