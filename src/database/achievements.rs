// ABOUTME: SQLite implementation of the achievement catalog and unlock repository
// ABOUTME: Unlock criteria and snapshots are stored as JSON text columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use async_trait::async_trait;
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{AchievementDefinition, UserAchievementUnlock};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{
    decode_timestamp, decode_u32, decode_uuid, encode_timestamp, AchievementRepository, Database,
};

fn row_to_achievement(row: &SqliteRow) -> AppResult<AchievementDefinition> {
    let id: String = row.get("id");
    let category: String = row.get("category");
    let rarity: String = row.get("rarity");
    let points_reward: i64 = row.get("points_reward");
    let criteria: String = row.get("unlock_criteria");
    let is_hidden: i64 = row.get("is_hidden");

    Ok(AchievementDefinition {
        id: decode_uuid(&id)?,
        name: row.get("name"),
        description: row.get("description"),
        category: category
            .parse()
            .map_err(|e| AppError::database(format!("Invalid achievement category: {e}")))?,
        rarity: rarity
            .parse()
            .map_err(|e| AppError::database(format!("Invalid rarity: {e}")))?,
        points_reward: decode_u32(points_reward, "points_reward")?,
        criterion: serde_json::from_str(&criteria)
            .map_err(|e| AppError::database(format!("Invalid unlock criteria: {e}")))?,
        is_hidden: is_hidden != 0,
    })
}

fn row_to_unlock(row: &SqliteRow) -> AppResult<UserAchievementUnlock> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let achievement_id: String = row.get("achievement_id");
    let unlocked_at: String = row.get("unlocked_at");
    let snapshot: String = row.get("progress_snapshot");

    Ok(UserAchievementUnlock {
        id: decode_uuid(&id)?,
        user_id: decode_uuid(&user_id)?,
        achievement_id: decode_uuid(&achievement_id)?,
        unlocked_at: decode_timestamp(&unlocked_at)?,
        snapshot: serde_json::from_str(&snapshot)
            .map_err(|e| AppError::database(format!("Invalid unlock snapshot: {e}")))?,
    })
}

const ACHIEVEMENT_COLUMNS: &str =
    "id, name, description, category, rarity, points_reward, unlock_criteria, is_hidden";

#[async_trait]
impl AchievementRepository for Database {
    async fn insert_achievement(&self, achievement: &AchievementDefinition) -> AppResult<()> {
        let criteria = serde_json::to_string(&achievement.criterion)?;
        sqlx::query(
            r"
            INSERT INTO achievements (id, name, description, category, rarity, points_reward, unlock_criteria, is_hidden)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(achievement.id.to_string())
        .bind(&achievement.name)
        .bind(&achievement.description)
        .bind(achievement.category.as_str())
        .bind(achievement.rarity.as_str())
        .bind(i64::from(achievement.points_reward))
        .bind(criteria)
        .bind(i64::from(achievement.is_hidden))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create achievement: {e}")))?;
        Ok(())
    }

    async fn achievement_catalog(&self) -> AppResult<Vec<AchievementDefinition>> {
        let query = format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements ORDER BY category, name");
        let rows = sqlx::query(&query)
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list achievements: {e}")))?;

        rows.iter().map(row_to_achievement).collect()
    }

    async fn achievement_by_id(
        &self,
        achievement_id: Uuid,
    ) -> AppResult<Option<AchievementDefinition>> {
        let query = format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(achievement_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get achievement: {e}")))?;

        row.map(|r| row_to_achievement(&r)).transpose()
    }

    async fn user_unlock_exists(&self, user_id: Uuid, achievement_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 AS found FROM user_achievements WHERE user_id = $1 AND achievement_id = $2",
        )
        .bind(user_id.to_string())
        .bind(achievement_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to check unlock: {e}")))?;

        Ok(row.is_some())
    }

    async fn insert_unlock(&self, unlock: &UserAchievementUnlock) -> AppResult<bool> {
        let snapshot = serde_json::to_string(&unlock.snapshot)?;
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO user_achievements (id, user_id, achievement_id, unlocked_at, progress_snapshot)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(unlock.id.to_string())
        .bind(unlock.user_id.to_string())
        .bind(unlock.achievement_id.to_string())
        .bind(encode_timestamp(unlock.unlocked_at))
        .bind(snapshot)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to store unlock: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn unlocks_for(&self, user_id: Uuid) -> AppResult<Vec<UserAchievementUnlock>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, achievement_id, unlocked_at, progress_snapshot
            FROM user_achievements
            WHERE user_id = $1
            ORDER BY unlocked_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list unlocks: {e}")))?;

        rows.iter().map(row_to_unlock).collect()
    }
}
