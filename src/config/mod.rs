// ABOUTME: Configuration management for scoring parameters and process settings
// ABOUTME: Progression config is env-overridable and validated; server config is env-only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! Configuration module for Liftoff
//!
//! - **Environment**: Database and realtime settings from environment variables
//! - **Progression**: Scoring weights, tier thresholds and engine defaults
//! - **Error**: Configuration validation errors

/// Environment and server configuration
pub mod environment;
/// Configuration error types
pub mod error;
/// Scoring and engine configuration
pub mod progression;

pub use environment::ServerConfig;
pub use error::ConfigError;
pub use progression::{
    AchievementConfig, ChallengeConfig, ConsistencyConfig, ProgressionConfig, RankingConfig,
};
