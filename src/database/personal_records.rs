// ABOUTME: SQLite implementation of the personal-record log
// ABOUTME: Entries are append-only; the current best is the maximum logged value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use async_trait::async_trait;
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{PersonalRecordEntry, PersonalRecordFilter, RecordType};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{
    decode_timestamp, decode_u32, decode_uuid, encode_timestamp, Database,
    PersonalRecordRepository,
};

fn row_to_record(row: &SqliteRow) -> AppResult<PersonalRecordEntry> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let exercise_id: String = row.get("exercise_id");
    let record_type: String = row.get("record_type");
    let workout_id: String = row.get("workout_id");
    let sets: i64 = row.get("sets");
    let reps: i64 = row.get("reps");
    let achieved_at: String = row.get("achieved_at");

    Ok(PersonalRecordEntry {
        id: decode_uuid(&id)?,
        user_id: decode_uuid(&user_id)?,
        exercise_id: decode_uuid(&exercise_id)?,
        record_type: record_type
            .parse()
            .map_err(|e| AppError::database(format!("Invalid record type: {e}")))?,
        record_value: row.get("record_value"),
        sets: decode_u32(sets, "sets")?,
        reps: decode_u32(reps, "reps")?,
        weight: row.get("weight"),
        workout_id: decode_uuid(&workout_id)?,
        previous_record: row.get("previous_record"),
        achieved_at: decode_timestamp(&achieved_at)?,
    })
}

#[async_trait]
impl PersonalRecordRepository for Database {
    async fn personal_record_best(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        record_type: RecordType,
    ) -> AppResult<Option<f64>> {
        let row = sqlx::query(
            r"
            SELECT MAX(record_value) AS best
            FROM personal_records
            WHERE user_id = $1 AND exercise_id = $2 AND record_type = $3
            ",
        )
        .bind(user_id.to_string())
        .bind(exercise_id.to_string())
        .bind(record_type.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get personal record: {e}")))?;

        Ok(row.get("best"))
    }

    async fn insert_personal_record(&self, entry: &PersonalRecordEntry) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO personal_records (
                id, user_id, exercise_id, record_type, record_value, sets, reps, weight,
                workout_id, previous_record, achieved_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.user_id.to_string())
        .bind(entry.exercise_id.to_string())
        .bind(entry.record_type.as_str())
        .bind(entry.record_value)
        .bind(i64::from(entry.sets))
        .bind(i64::from(entry.reps))
        .bind(entry.weight)
        .bind(entry.workout_id.to_string())
        .bind(entry.previous_record)
        .bind(encode_timestamp(entry.achieved_at))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to store personal record: {e}")))?;
        Ok(())
    }

    async fn personal_records_for(
        &self,
        user_id: Uuid,
        filter: PersonalRecordFilter,
    ) -> AppResult<Vec<PersonalRecordEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, exercise_id, record_type, record_value, sets, reps, weight,
                   workout_id, previous_record, achieved_at
            FROM personal_records
            WHERE user_id = $1
              AND ($2 IS NULL OR exercise_id = $2)
              AND ($3 IS NULL OR record_type = $3)
            ORDER BY achieved_at DESC, rowid DESC
            ",
        )
        .bind(user_id.to_string())
        .bind(filter.exercise_id.map(|id| id.to_string()))
        .bind(filter.record_type.map(|t| t.as_str()))
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list personal records: {e}")))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn count_personal_records(&self, user_id: Uuid) -> AppResult<u32> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM personal_records WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to count personal records: {e}")))?;
        let count: i64 = row.get("count");
        decode_u32(count, "count")
    }
}
