// ABOUTME: Process-level configuration read from environment variables
// ABOUTME: Database location and realtime sync settings for the server and CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::env;

use liftoff_core::constants::{env as env_vars, server};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// sqlx connection string
    pub database_url: String,
    /// Whether progression events are published to the realtime collaborator
    pub realtime_sync: bool,
    /// Buffer size of the realtime broadcast channel
    pub sync_channel_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: server::DEFAULT_DATABASE_URL.to_owned(),
            realtime_sync: false,
            sync_channel_size: server::DEFAULT_SYNC_CHANNEL_SIZE,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = env::var(env_vars::DATABASE_URL).unwrap_or(defaults.database_url);

        let realtime_sync = match env::var(env_vars::REALTIME_SYNC) {
            Ok(value) => parse_bool(&value)
                .ok_or_else(|| ConfigError::Parse(format!("Invalid {}", env_vars::REALTIME_SYNC)))?,
            Err(_) => defaults.realtime_sync,
        };

        let sync_channel_size = match env::var(env_vars::SYNC_CHANNEL_SIZE) {
            Ok(value) => value.parse().map_err(|_| {
                ConfigError::Parse(format!("Invalid {}", env_vars::SYNC_CHANNEL_SIZE))
            })?,
            Err(_) => defaults.sync_channel_size,
        };

        if sync_channel_size == 0 {
            return Err(ConfigError::ValueOutOfRange("sync channel size must be > 0"));
        }

        Ok(Self {
            database_url,
            realtime_sync,
            sync_channel_size,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
