// ABOUTME: SQLite implementation of the friendship repository
// ABOUTME: Friendships are undirected once accepted; lookups match either direction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use async_trait::async_trait;
use chrono::Utc;
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{FriendStatus, Friendship};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{decode_timestamp, decode_uuid, encode_timestamp, Database, SocialRepository};

fn row_to_friendship(row: &SqliteRow) -> AppResult<Friendship> {
    let id: String = row.get("id");
    let requester_id: String = row.get("requester_id");
    let addressee_id: String = row.get("addressee_id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Friendship {
        id: decode_uuid(&id)?,
        requester_id: decode_uuid(&requester_id)?,
        addressee_id: decode_uuid(&addressee_id)?,
        status: status
            .parse()
            .map_err(|e| AppError::database(format!("Invalid friendship status: {e}")))?,
        created_at: decode_timestamp(&created_at)?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}

#[async_trait]
impl SocialRepository for Database {
    async fn insert_friendship(&self, friendship: &Friendship) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO friendships (id, requester_id, addressee_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(friendship.id.to_string())
        .bind(friendship.requester_id.to_string())
        .bind(friendship.addressee_id.to_string())
        .bind(friendship.status.as_str())
        .bind(encode_timestamp(friendship.created_at))
        .bind(encode_timestamp(friendship.updated_at))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create friendship: {e}")))?;

        Ok(())
    }

    async fn update_friendship_status(
        &self,
        friendship_id: Uuid,
        status: FriendStatus,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE friendships SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(encode_timestamp(Utc::now()))
            .bind(friendship_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to update friendship: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Friendship {friendship_id}")));
        }
        Ok(())
    }

    async fn friendship_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> AppResult<Option<Friendship>> {
        let row = sqlx::query(
            r"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friendships
            WHERE (requester_id = $1 AND addressee_id = $2)
               OR (requester_id = $2 AND addressee_id = $1)
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(user_a.to_string())
        .bind(user_b.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get friendship: {e}")))?;

        row.map(|r| row_to_friendship(&r)).transpose()
    }

    async fn accepted_friend_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query(
            r"
            SELECT DISTINCT CASE WHEN requester_id = $1 THEN addressee_id ELSE requester_id END AS friend_id
            FROM friendships
            WHERE (requester_id = $1 OR addressee_id = $1) AND status = 'accepted'
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list friends: {e}")))?;

        rows.iter()
            .map(|row| {
                let friend_id: String = row.get("friend_id");
                decode_uuid(&friend_id)
            })
            .collect()
    }
}
