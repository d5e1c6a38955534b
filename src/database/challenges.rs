// ABOUTME: SQLite implementation of the challenge and participation repository
// ABOUTME: Invite lists and progress histories are stored as JSON text columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use async_trait::async_trait;
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{ChallengeCategory, ChallengeDefinition, UserChallengeParticipation};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{
    decode_optional_timestamp, decode_timestamp, decode_u32, decode_u64, decode_uuid,
    encode_timestamp, encode_u64, ChallengeRepository, Database,
};

const CHALLENGE_COLUMNS: &str = r"
    id, name, description, challenge_type, category, target_value, target_unit, points_reward,
    difficulty, start_date, end_date, is_active, is_global, max_participants, creator_id,
    invited_user_ids, created_at
";

const PARTICIPATION_COLUMNS: &str = r"
    id, user_id, challenge_id, current_progress, completed, completed_at, joined_at, progress_history
";

fn row_to_challenge(row: &SqliteRow) -> AppResult<ChallengeDefinition> {
    let id: String = row.get("id");
    let challenge_type: String = row.get("challenge_type");
    let category: String = row.get("category");
    let target_value: i64 = row.get("target_value");
    let points_reward: i64 = row.get("points_reward");
    let difficulty: String = row.get("difficulty");
    let start_date: String = row.get("start_date");
    let end_date: String = row.get("end_date");
    let is_active: i64 = row.get("is_active");
    let is_global: i64 = row.get("is_global");
    let max_participants: Option<i64> = row.get("max_participants");
    let creator_id: Option<String> = row.get("creator_id");
    let invited: String = row.get("invited_user_ids");
    let created_at: String = row.get("created_at");

    Ok(ChallengeDefinition {
        id: decode_uuid(&id)?,
        name: row.get("name"),
        description: row.get("description"),
        challenge_type: challenge_type
            .parse()
            .map_err(|e| AppError::database(format!("Invalid challenge type: {e}")))?,
        category: ChallengeCategory::from_stored(&category),
        target_value: decode_u64(target_value, "target_value")?,
        target_unit: row.get("target_unit"),
        points_reward: decode_u32(points_reward, "points_reward")?,
        difficulty: difficulty
            .parse()
            .map_err(|e| AppError::database(format!("Invalid difficulty: {e}")))?,
        start_date: decode_timestamp(&start_date)?,
        end_date: decode_timestamp(&end_date)?,
        is_active: is_active != 0,
        is_global: is_global != 0,
        max_participants: max_participants
            .map(|m| decode_u32(m, "max_participants"))
            .transpose()?,
        creator_id: creator_id.as_deref().map(decode_uuid).transpose()?,
        invited_user_ids: serde_json::from_str(&invited)
            .map_err(|e| AppError::database(format!("Invalid invite list: {e}")))?,
        created_at: decode_timestamp(&created_at)?,
    })
}

fn row_to_participation(row: &SqliteRow) -> AppResult<UserChallengeParticipation> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let challenge_id: String = row.get("challenge_id");
    let current_progress: i64 = row.get("current_progress");
    let completed: i64 = row.get("completed");
    let completed_at: Option<String> = row.get("completed_at");
    let joined_at: String = row.get("joined_at");
    let history: String = row.get("progress_history");

    Ok(UserChallengeParticipation {
        id: decode_uuid(&id)?,
        user_id: decode_uuid(&user_id)?,
        challenge_id: decode_uuid(&challenge_id)?,
        current_progress: decode_u64(current_progress, "current_progress")?,
        completed: completed != 0,
        completed_at: decode_optional_timestamp(completed_at)?,
        joined_at: decode_timestamp(&joined_at)?,
        progress_history: serde_json::from_str(&history)
            .map_err(|e| AppError::database(format!("Invalid progress history: {e}")))?,
    })
}

#[async_trait]
impl ChallengeRepository for Database {
    async fn insert_challenge(&self, challenge: &ChallengeDefinition) -> AppResult<()> {
        let invited = serde_json::to_string(&challenge.invited_user_ids)?;
        sqlx::query(
            r"
            INSERT INTO challenges (
                id, name, description, challenge_type, category, target_value, target_unit,
                points_reward, difficulty, start_date, end_date, is_active, is_global,
                max_participants, creator_id, invited_user_ids, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ",
        )
        .bind(challenge.id.to_string())
        .bind(&challenge.name)
        .bind(&challenge.description)
        .bind(challenge.challenge_type.as_str())
        .bind(challenge.category.as_str())
        .bind(encode_u64(challenge.target_value, "target_value")?)
        .bind(challenge.target_unit.as_deref())
        .bind(i64::from(challenge.points_reward))
        .bind(challenge.difficulty.as_str())
        .bind(encode_timestamp(challenge.start_date))
        .bind(encode_timestamp(challenge.end_date))
        .bind(i64::from(challenge.is_active))
        .bind(i64::from(challenge.is_global))
        .bind(challenge.max_participants.map(i64::from))
        .bind(challenge.creator_id.map(|id| id.to_string()))
        .bind(invited)
        .bind(encode_timestamp(challenge.created_at))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create challenge: {e}")))?;
        Ok(())
    }

    async fn challenge_by_id(
        &self,
        challenge_id: Uuid,
    ) -> AppResult<Option<ChallengeDefinition>> {
        let query = format!("SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(challenge_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get challenge: {e}")))?;

        row.map(|r| row_to_challenge(&r)).transpose()
    }

    async fn list_challenges(&self) -> AppResult<Vec<ChallengeDefinition>> {
        let query = format!("SELECT {CHALLENGE_COLUMNS} FROM challenges ORDER BY created_at DESC");
        let rows = sqlx::query(&query)
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list challenges: {e}")))?;

        rows.iter().map(row_to_challenge).collect()
    }

    async fn participation_get(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> AppResult<Option<UserChallengeParticipation>> {
        let query = format!(
            "SELECT {PARTICIPATION_COLUMNS} FROM user_challenges WHERE user_id = $1 AND challenge_id = $2"
        );
        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(challenge_id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get participation: {e}")))?;

        row.map(|r| row_to_participation(&r)).transpose()
    }

    async fn participation_insert(
        &self,
        participation: &UserChallengeParticipation,
    ) -> AppResult<bool> {
        let history = serde_json::to_string(&participation.progress_history)?;
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO user_challenges (
                id, user_id, challenge_id, current_progress, completed, completed_at, joined_at, progress_history
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(participation.id.to_string())
        .bind(participation.user_id.to_string())
        .bind(participation.challenge_id.to_string())
        .bind(encode_u64(participation.current_progress, "current_progress")?)
        .bind(i64::from(participation.completed))
        .bind(participation.completed_at.map(encode_timestamp))
        .bind(encode_timestamp(participation.joined_at))
        .bind(history)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to join challenge: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn participation_update(
        &self,
        participation: &UserChallengeParticipation,
    ) -> AppResult<()> {
        let history = serde_json::to_string(&participation.progress_history)?;
        let result = sqlx::query(
            r"
            UPDATE user_challenges
            SET current_progress = $1, completed = $2, completed_at = $3, progress_history = $4
            WHERE id = $5
            ",
        )
        .bind(encode_u64(participation.current_progress, "current_progress")?)
        .bind(i64::from(participation.completed))
        .bind(participation.completed_at.map(encode_timestamp))
        .bind(history)
        .bind(participation.id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update participation: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Participation {}",
                participation.id
            )));
        }
        Ok(())
    }

    async fn participations_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<UserChallengeParticipation>> {
        let query = format!(
            "SELECT {PARTICIPATION_COLUMNS} FROM user_challenges WHERE user_id = $1 ORDER BY joined_at"
        );
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list participations: {e}")))?;

        rows.iter().map(row_to_participation).collect()
    }

    async fn participations_for_challenge(
        &self,
        challenge_id: Uuid,
    ) -> AppResult<Vec<UserChallengeParticipation>> {
        let query = format!(
            r"
            SELECT {PARTICIPATION_COLUMNS}
            FROM user_challenges
            WHERE challenge_id = $1
            ORDER BY current_progress DESC, joined_at
            "
        );
        let rows = sqlx::query(&query)
            .bind(challenge_id.to_string())
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list participants: {e}")))?;

        rows.iter().map(row_to_participation).collect()
    }

    async fn participant_count(&self, challenge_id: Uuid) -> AppResult<u32> {
        let row =
            sqlx::query("SELECT COUNT(*) AS count FROM user_challenges WHERE challenge_id = $1")
                .bind(challenge_id.to_string())
                .fetch_one(self.pool())
                .await
                .map_err(|e| AppError::database(format!("Failed to count participants: {e}")))?;
        let count: i64 = row.get("count");
        decode_u32(count, "count")
    }
}
