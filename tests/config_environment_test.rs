// ABOUTME: Tests for environment-driven configuration loading
// ABOUTME: Runs serially because every test mutates process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use liftoff_server::config::{ConfigError, ProgressionConfig, ServerConfig};
use liftoff_server::errors::{AppError, ErrorCode};
use liftoff_server::logging::{LogFormat, LoggingConfig};
use liftoff_server::models::RankTier;
use serial_test::serial;

const PROGRESSION_VARS: &[&str] = &[
    "LIFTOFF_CONSISTENCY_WINDOW_DAYS",
    "LIFTOFF_FREQUENCY_WEIGHT",
    "LIFTOFF_REGULARITY_WEIGHT",
    "LIFTOFF_WORKOUT_POINTS",
    "LIFTOFF_TIER_SILVER",
    "LIFTOFF_TIER_GOLD",
    "LIFTOFF_NEAR_COMPLETION_THRESHOLD",
    "LIFTOFF_FRIEND_BATTLE_DAYS",
];

const SERVER_VARS: &[&str] = &[
    "DATABASE_URL",
    "LIFTOFF_REALTIME_SYNC",
    "LIFTOFF_SYNC_CHANNEL_SIZE",
];

fn clear(vars: &[&str]) {
    for var in vars {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_overrides() {
    clear(PROGRESSION_VARS);
    let config = ProgressionConfig::load().unwrap();
    assert_eq!(config, ProgressionConfig::default());
    assert_eq!(config.consistency.window_days, 90);
    assert_eq!(config.ranking.workout_points, 2);
    assert_eq!(config.challenges.friend_battle_default_reward, 50);
}

#[test]
#[serial]
fn test_progression_env_overrides() {
    clear(PROGRESSION_VARS);
    env::set_var("LIFTOFF_CONSISTENCY_WINDOW_DAYS", "30");
    env::set_var("LIFTOFF_FREQUENCY_WEIGHT", "70");
    env::set_var("LIFTOFF_REGULARITY_WEIGHT", "30");
    env::set_var("LIFTOFF_WORKOUT_POINTS", "3");
    env::set_var("LIFTOFF_TIER_SILVER", "40");

    let config = ProgressionConfig::load().unwrap();

    assert_eq!(config.consistency.window_days, 30);
    assert!((config.consistency.frequency_weight - 70.0).abs() < f64::EPSILON);
    assert_eq!(config.ranking.workout_points, 3);
    assert_eq!(config.ranking.tiers.tier_for(45), RankTier::Silver);

    clear(PROGRESSION_VARS);
}

#[test]
#[serial]
fn test_weights_must_sum_to_one_hundred() {
    clear(PROGRESSION_VARS);
    env::set_var("LIFTOFF_FREQUENCY_WEIGHT", "80");

    let err = ProgressionConfig::load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidWeights(_)));

    clear(PROGRESSION_VARS);
}

#[test]
#[serial]
fn test_invalid_override_values_are_rejected() {
    clear(PROGRESSION_VARS);
    env::set_var("LIFTOFF_WORKOUT_POINTS", "lots");
    assert!(matches!(
        ProgressionConfig::load().unwrap_err(),
        ConfigError::Parse(_)
    ));

    clear(PROGRESSION_VARS);
    env::set_var("LIFTOFF_TIER_GOLD", "20");
    assert!(matches!(
        ProgressionConfig::load().unwrap_err(),
        ConfigError::InvalidRange(_)
    ));

    clear(PROGRESSION_VARS);
    env::set_var("LIFTOFF_NEAR_COMPLETION_THRESHOLD", "1.5");
    assert!(matches!(
        ProgressionConfig::load().unwrap_err(),
        ConfigError::ValueOutOfRange(_)
    ));

    clear(PROGRESSION_VARS);
    env::set_var("LIFTOFF_FRIEND_BATTLE_DAYS", "0");
    let err: AppError = ProgressionConfig::load().unwrap_err().into();
    assert_eq!(err.code, ErrorCode::ConfigError);

    clear(PROGRESSION_VARS);
}

#[test]
#[serial]
fn test_server_config_from_env() {
    clear(SERVER_VARS);
    let defaults = ServerConfig::from_env().unwrap();
    assert_eq!(defaults, ServerConfig::default());
    assert!(!defaults.realtime_sync);

    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("LIFTOFF_REALTIME_SYNC", "yes");
    env::set_var("LIFTOFF_SYNC_CHANNEL_SIZE", "32");
    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.database_url, "sqlite::memory:");
    assert!(config.realtime_sync);
    assert_eq!(config.sync_channel_size, 32);

    env::set_var("LIFTOFF_SYNC_CHANNEL_SIZE", "0");
    assert!(matches!(
        ServerConfig::from_env().unwrap_err(),
        ConfigError::ValueOutOfRange(_)
    ));

    env::set_var("LIFTOFF_SYNC_CHANNEL_SIZE", "16");
    env::set_var("LIFTOFF_REALTIME_SYNC", "sometimes");
    assert!(matches!(
        ServerConfig::from_env().unwrap_err(),
        ConfigError::Parse(_)
    ));

    clear(SERVER_VARS);
}

#[test]
#[serial]
fn test_logging_config_from_env() {
    env::set_var("LOG_FORMAT", "json");
    env::set_var("RUST_LOG", "warn");

    let config = LoggingConfig::from_env();
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, "warn");
    assert_eq!(config.with_level("debug").level, "debug");

    env::remove_var("LOG_FORMAT");
    env::remove_var("RUST_LOG");
}
