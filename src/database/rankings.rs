// ABOUTME: SQLite implementation of the ranking repository
// ABOUTME: One row per (user, scope), written with an upsert on that key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use async_trait::async_trait;
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{RankingScope, UserRankingRow, OVERALL_SCOPE_KEY};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{
    decode_timestamp, decode_u32, decode_uuid, encode_timestamp, Database, RankingRepository,
};

fn row_to_ranking(row: &SqliteRow) -> AppResult<UserRankingRow> {
    let user_id: String = row.get("user_id");
    let scope: String = row.get("scope");
    let points: i64 = row.get("points");
    let tier: String = row.get("tier");
    let updated_at: String = row.get("updated_at");

    Ok(UserRankingRow {
        user_id: decode_uuid(&user_id)?,
        scope: RankingScope::from_key(&scope),
        points: decode_u32(points, "points")?,
        tier: tier
            .parse()
            .map_err(|e| AppError::database(format!("Invalid rank tier: {e}")))?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}

fn count_from(row: &SqliteRow) -> AppResult<u32> {
    let count: i64 = row.get("count");
    decode_u32(count, "count")
}

#[async_trait]
impl RankingRepository for Database {
    async fn ranking_row(
        &self,
        user_id: Uuid,
        scope: &RankingScope,
    ) -> AppResult<Option<UserRankingRow>> {
        let row = sqlx::query(
            r"
            SELECT user_id, scope, points, tier, updated_at
            FROM user_rankings
            WHERE user_id = $1 AND scope = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(scope.as_key())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get ranking: {e}")))?;

        row.map(|r| row_to_ranking(&r)).transpose()
    }

    async fn upsert_ranking(&self, row: &UserRankingRow) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_rankings (user_id, scope, points, tier, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(user_id, scope) DO UPDATE SET
                points = excluded.points,
                tier = excluded.tier,
                updated_at = excluded.updated_at
            ",
        )
        .bind(row.user_id.to_string())
        .bind(row.scope.as_key())
        .bind(i64::from(row.points))
        .bind(row.tier.as_str())
        .bind(encode_timestamp(row.updated_at))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to store ranking: {e}")))?;
        Ok(())
    }

    async fn rankings_for(&self, user_id: Uuid) -> AppResult<Vec<UserRankingRow>> {
        let rows = sqlx::query(
            r"
            SELECT user_id, scope, points, tier, updated_at
            FROM user_rankings
            WHERE user_id = $1
            ORDER BY CASE WHEN scope = $2 THEN 0 ELSE 1 END, scope
            ",
        )
        .bind(user_id.to_string())
        .bind(OVERALL_SCOPE_KEY)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list rankings: {e}")))?;

        rows.iter().map(row_to_ranking).collect()
    }

    async fn leaderboard_slice(
        &self,
        scope: &RankingScope,
        offset: u32,
        limit: u32,
    ) -> AppResult<Vec<UserRankingRow>> {
        let rows = sqlx::query(
            r"
            SELECT user_id, scope, points, tier, updated_at
            FROM user_rankings
            WHERE scope = $1
            ORDER BY points DESC, user_id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(scope.as_key())
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get leaderboard: {e}")))?;

        rows.iter().map(row_to_ranking).collect()
    }

    async fn count_ranked(&self, scope: &RankingScope) -> AppResult<u32> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM user_rankings WHERE scope = $1")
            .bind(scope.as_key())
            .fetch_one(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to count rankings: {e}")))?;
        count_from(&row)
    }

    async fn count_ranked_above(&self, scope: &RankingScope, points: u32) -> AppResult<u32> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM user_rankings WHERE scope = $1 AND points > $2",
        )
        .bind(scope.as_key())
        .bind(i64::from(points))
        .fetch_one(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to count rankings: {e}")))?;
        count_from(&row)
    }

    async fn rankings_for_users(
        &self,
        scope: &RankingScope,
        user_ids: &[Uuid],
    ) -> AppResult<Vec<UserRankingRow>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (0..user_ids.len())
            .map(|i| format!("${}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            r"
            SELECT user_id, scope, points, tier, updated_at
            FROM user_rankings
            WHERE scope = $1 AND user_id IN ({placeholders})
            ORDER BY points DESC, user_id
            "
        );

        let mut statement = sqlx::query(&query).bind(scope.as_key());
        for user_id in user_ids {
            statement = statement.bind(user_id.to_string());
        }
        let rows = statement
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get rankings: {e}")))?;

        rows.iter().map(row_to_ranking).collect()
    }
}
