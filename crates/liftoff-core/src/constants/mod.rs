// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Scoring defaults, pagination limits and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! Constants grouped by domain. Scoring values here are the defaults the
//! configuration layer starts from; runtime code reads them through config.

/// Default scoring parameters
pub mod scoring {
    /// Trailing window for the consistency score, in days
    pub const CONSISTENCY_WINDOW_DAYS: u32 = 90;
    /// Maximum contribution of workout frequency to the consistency score
    pub const FREQUENCY_WEIGHT: f64 = 60.0;
    /// Maximum contribution of gap regularity to the consistency score
    pub const REGULARITY_WEIGHT: f64 = 40.0;
    /// Points per distinct date when fewer than two dates exist
    pub const SINGLE_DAY_POINTS: u32 = 10;
    /// Upper bound of any consistency score
    pub const MAX_CONSISTENCY_SCORE: u32 = 100;
    /// Points per workout in Liftoff-style scoring
    pub const WORKOUT_POINTS: u32 = 2;
    /// Points per unit of muscle-group volume
    pub const VOLUME_POINTS_FACTOR: f64 = 0.1;
    /// Legacy consistency multiplier applied to workouts per week
    pub const LEGACY_CONSISTENCY_MULTIPLIER: f64 = 20.0;
    /// Legacy MMR points per personal record
    pub const LEGACY_POINTS_PER_RECORD: u32 = 10;
    /// Legacy MMR divisor for distinct exercises
    pub const LEGACY_EXERCISE_DIVISOR: u32 = 5;
}

/// Achievement defaults
pub mod achievements {
    /// Progress above which an achievement counts as nearly complete
    pub const NEAR_COMPLETION_THRESHOLD: f64 = 0.5;
    /// Maximum near-completion achievements returned
    pub const NEAR_COMPLETION_LIMIT: usize = 10;
}

/// Challenge defaults
pub mod challenges {
    /// Friend battle length when none is given
    pub const FRIEND_BATTLE_DEFAULT_DAYS: u32 = 7;
    /// Friend battle reward when none is given
    pub const FRIEND_BATTLE_DEFAULT_REWARD: u32 = 50;
}

/// Pagination limits
pub mod pagination {
    /// Default page size
    pub const DEFAULT_PER_PAGE: u32 = 50;
    /// Largest page size served
    pub const MAX_PER_PAGE: u32 = 100;
}

/// Environment variable names
pub mod env {
    /// Prefix for progression overrides
    pub const PROGRESSION_PREFIX: &str = "LIFTOFF_";
    /// Database connection string
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Enables the realtime sync collaborator
    pub const REALTIME_SYNC: &str = "LIFTOFF_REALTIME_SYNC";
    /// Capacity of the realtime broadcast channel
    pub const SYNC_CHANNEL_SIZE: &str = "LIFTOFF_SYNC_CHANNEL_SIZE";
    /// Log output format
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Defaults for the server process
pub mod server {
    /// Database used when `DATABASE_URL` is unset
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:liftoff.db";
    /// Realtime broadcast capacity when unset
    pub const DEFAULT_SYNC_CHANNEL_SIZE: usize = 256;
}
