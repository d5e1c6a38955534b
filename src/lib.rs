// ABOUTME: Main library entry point for the Liftoff progression engine
// ABOUTME: Wires storage, scoring engines, the progression pipeline and realtime sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

// Crate-level attributes:
// - recursion_limit: serde and thiserror derives on the nested model types
// - deny(unsafe_code): zero-tolerance unsafe policy
#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Liftoff
//!
//! Ranking and progression engine for a workout-tracking service. Every time a
//! user logs, edits or deletes a workout the engine recomputes their standing
//! and records what they earned.
//!
//! ## Features
//!
//! - **Rankings**: Overall and per-muscle-group points with Bronze to Diamond tiers
//! - **Consistency**: 0-100 score from workout frequency and gap regularity
//! - **Personal records**: Max weight, volume and reps per exercise with history
//! - **Achievements**: Typed unlock criteria, unlocked at most once per user
//! - **Challenges**: Time-boxed targets, late-join credit and friend battles
//! - **Leaderboards**: Paginated global, per-group and friends-only standings
//!
//! ## Architecture
//!
//! - **Database**: `ProgressionStore` repositories with `SQLite` and in-memory backends
//! - **Progression**: Scoring engines, pure functions at the core
//! - **Services**: Workout mutations and the post-change pipeline
//! - **Realtime**: Best-effort event publishing to a sync collaborator
//! - **Config**: Environment-overridable scoring parameters
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use liftoff_server::config::{ProgressionConfig, ServerConfig};
//! use liftoff_server::database::Database;
//! use liftoff_server::errors::AppResult;
//! use liftoff_server::services::{ProgressionService, WorkoutChange};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let server = ServerConfig::from_env()?;
//!     let database = Database::new(&server.database_url).await?;
//!     let config = Arc::new(ProgressionConfig::global().clone());
//!
//!     let service = ProgressionService::new(Arc::new(database), config);
//!     let user_id = Uuid::new_v4();
//!     let workout_id = Uuid::new_v4();
//!     let outcome = service
//!         .on_workout_changed(user_id, WorkoutChange::Created(workout_id))
//!         .await?;
//!     println!("{} points", outcome.ranking.overall.total_points);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────

/// Configuration management
pub mod config;

/// Storage layer: repository traits, `SQLite` and in-memory stores
pub mod database;

/// Structured logging setup
pub mod logging;

/// Scoring engines: stats, consistency, ranking, records, achievements, challenges
pub mod progression;

/// Progression events and the realtime sync collaborator
pub mod realtime;

/// Workout mutations and the progression pipeline
pub mod services;

/// Test utilities for creating consistent test data
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use liftoff_core::{constants, errors, models, pagination};
