// ABOUTME: SQLite storage for workouts, rankings, records, achievements, challenges and friendships
// ABOUTME: Creates the schema on connect and implements every repository trait on Database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! # Database Management
//!
//! `Database` wraps a sqlx `SqlitePool`. Identifiers are stored as TEXT UUIDs
//! and timestamps as fixed-width RFC 3339 strings in UTC, so string comparison
//! in SQL orders them chronologically.

mod achievements;
mod challenges;
/// In-memory store with the same semantics as [`Database`]
pub mod memory;
mod personal_records;
mod rankings;
/// Repository traits
pub mod repositories;
mod social;
mod workouts;

pub use memory::InMemoryStore;
pub use repositories::{
    AchievementRepository, ChallengeRepository, PersonalRecordRepository, ProgressionStore,
    RankingRepository, SocialRepository, WorkoutRepository,
};

use chrono::{DateTime, SecondsFormat, Utc};
use liftoff_core::errors::{AppError, AppResult};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Schema statements, applied in order on every connect
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS exercises (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        muscle_group TEXT NOT NULL,
        description TEXT,
        is_compound INTEGER NOT NULL DEFAULT 0
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS workouts (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        performed_at TEXT NOT NULL,
        duration_minutes INTEGER,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_workouts_user_date ON workouts(user_id, performed_at)",
    r"
    CREATE TABLE IF NOT EXISTS workout_exercises (
        workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        exercise_id TEXT NOT NULL REFERENCES exercises(id),
        sets INTEGER NOT NULL,
        reps INTEGER NOT NULL,
        weight REAL,
        PRIMARY KEY (workout_id, position)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS user_rankings (
        user_id TEXT NOT NULL,
        scope TEXT NOT NULL,
        points INTEGER NOT NULL,
        tier TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (user_id, scope)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_rankings_scope_points ON user_rankings(scope, points DESC)",
    r"
    CREATE TABLE IF NOT EXISTS personal_records (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        exercise_id TEXT NOT NULL,
        record_type TEXT NOT NULL,
        record_value REAL NOT NULL,
        sets INTEGER NOT NULL,
        reps INTEGER NOT NULL,
        weight REAL NOT NULL,
        workout_id TEXT NOT NULL,
        previous_record REAL NOT NULL,
        achieved_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_prs_lookup ON personal_records(user_id, exercise_id, record_type)",
    r"
    CREATE TABLE IF NOT EXISTS achievements (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        rarity TEXT NOT NULL,
        points_reward INTEGER NOT NULL,
        unlock_criteria TEXT NOT NULL,
        is_hidden INTEGER NOT NULL DEFAULT 0
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS user_achievements (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        achievement_id TEXT NOT NULL REFERENCES achievements(id),
        unlocked_at TEXT NOT NULL,
        progress_snapshot TEXT NOT NULL,
        UNIQUE (user_id, achievement_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS challenges (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        challenge_type TEXT NOT NULL,
        category TEXT NOT NULL,
        target_value INTEGER NOT NULL,
        target_unit TEXT,
        points_reward INTEGER NOT NULL,
        difficulty TEXT NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        is_active INTEGER NOT NULL,
        is_global INTEGER NOT NULL,
        max_participants INTEGER,
        creator_id TEXT,
        invited_user_ids TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS user_challenges (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        challenge_id TEXT NOT NULL REFERENCES challenges(id),
        current_progress INTEGER NOT NULL DEFAULT 0,
        completed INTEGER NOT NULL DEFAULT 0,
        completed_at TEXT,
        joined_at TEXT NOT NULL,
        progress_history TEXT NOT NULL DEFAULT '[]',
        UNIQUE (user_id, challenge_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS friendships (
        id TEXT PRIMARY KEY,
        requester_id TEXT NOT NULL,
        addressee_id TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
];

/// SQLite-backed progression store
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and create the schema if needed
    ///
    /// In-memory URLs get a single connection so every query sees the same database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema creation fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        let connection_url = if database_url.starts_with("sqlite:") && !in_memory {
            if database_url.contains('?') {
                database_url.to_owned()
            } else {
                format!("{database_url}?mode=rwc")
            }
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect(&connection_url)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {database_url}: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database.url = %database_url, "Database ready");
        Ok(db)
    }

    /// Get a reference to the connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes that do not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to enable foreign keys: {e}")))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Schema migration failed: {e}")))?;
        }
        debug!(statements = SCHEMA.len(), "Schema up to date");
        Ok(())
    }
}

// ============================================================================
// Column encoding helpers
// ============================================================================

/// Fixed-width UTC timestamp used for every stored instant
pub(crate) fn encode_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid date: {e}")))
}

pub(crate) fn decode_optional_timestamp(value: Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    value.as_deref().map(decode_timestamp).transpose()
}

pub(crate) fn decode_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::database(format!("Invalid UUID: {e}")))
}

pub(crate) fn decode_u32(value: i64, column: &str) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::database(format!("Column {column} out of range: {value}")))
}

pub(crate) fn decode_u64(value: i64, column: &str) -> AppResult<u64> {
    u64::try_from(value)
        .map_err(|_| AppError::database(format!("Column {column} out of range: {value}")))
}

pub(crate) fn encode_u64(value: u64, column: &str) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::invalid_input(format!("{column} too large: {value}")))
}
