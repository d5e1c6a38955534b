// ABOUTME: SQLite implementation of the workout and exercise-catalog repository
// ABOUTME: Workouts are written with their exercise entries in a single transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{ExerciseDefinition, PerformedExercise, WorkoutRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};
use uuid::Uuid;

use super::{
    decode_timestamp, decode_u32, decode_uuid, encode_timestamp, Database, WorkoutRepository,
};

const WORKOUT_COLUMNS: &str = r"
    SELECT w.id, w.user_id, w.name, w.performed_at, w.duration_minutes, w.notes,
           w.created_at, w.updated_at,
           we.position, we.exercise_id, we.sets, we.reps, we.weight,
           e.name AS exercise_name, e.muscle_group
    FROM workouts w
    LEFT JOIN workout_exercises we ON we.workout_id = w.id
    LEFT JOIN exercises e ON e.id = we.exercise_id
";

fn row_to_exercise(row: &SqliteRow) -> AppResult<ExerciseDefinition> {
    let id: String = row.get("id");
    let is_compound: i64 = row.get("is_compound");
    Ok(ExerciseDefinition {
        id: decode_uuid(&id)?,
        name: row.get("name"),
        muscle_group: row.get("muscle_group"),
        description: row.get("description"),
        is_compound: is_compound != 0,
    })
}

fn row_to_workout_header(row: &SqliteRow) -> AppResult<WorkoutRecord> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let performed_at: String = row.get("performed_at");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    let duration_minutes: Option<i64> = row.get("duration_minutes");

    Ok(WorkoutRecord {
        id: decode_uuid(&id)?,
        user_id: decode_uuid(&user_id)?,
        name: row.get("name"),
        performed_at: decode_timestamp(&performed_at)?,
        duration_minutes: duration_minutes
            .map(|m| decode_u32(m, "duration_minutes"))
            .transpose()?,
        notes: row.get("notes"),
        exercises: Vec::new(),
        created_at: decode_timestamp(&created_at)?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}

fn row_to_performed(row: &SqliteRow) -> AppResult<Option<PerformedExercise>> {
    let exercise_id: Option<String> = row.get("exercise_id");
    let Some(exercise_id) = exercise_id else {
        return Ok(None);
    };
    let sets: i64 = row.get("sets");
    let reps: i64 = row.get("reps");
    let exercise_name: Option<String> = row.get("exercise_name");
    let muscle_group: Option<String> = row.get("muscle_group");

    Ok(Some(PerformedExercise {
        exercise_id: decode_uuid(&exercise_id)?,
        exercise_name: exercise_name.unwrap_or_default(),
        muscle_group: muscle_group.unwrap_or_default(),
        sets: decode_u32(sets, "sets")?,
        reps: decode_u32(reps, "reps")?,
        weight: row.get("weight"),
    }))
}

/// Fold joined rows (ordered by workout then position) into workouts
fn rows_to_workouts(rows: &[SqliteRow]) -> AppResult<Vec<WorkoutRecord>> {
    let mut workouts: Vec<WorkoutRecord> = Vec::new();
    for row in rows {
        let id: String = row.get("id");
        let id = decode_uuid(&id)?;
        if !matches!(workouts.last(), Some(last) if last.id == id) {
            workouts.push(row_to_workout_header(row)?);
        }
        if let (Some(exercise), Some(workout)) = (row_to_performed(row)?, workouts.last_mut()) {
            workout.exercises.push(exercise);
        }
    }
    Ok(workouts)
}

async fn write_entries(
    tx: &mut Transaction<'_, Sqlite>,
    workout: &WorkoutRecord,
) -> AppResult<()> {
    for (position, exercise) in workout.exercises.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO workout_exercises (workout_id, position, exercise_id, sets, reps, weight)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(workout.id.to_string())
        .bind(position as i64)
        .bind(exercise.exercise_id.to_string())
        .bind(i64::from(exercise.sets))
        .bind(i64::from(exercise.reps))
        .bind(exercise.weight)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to store workout exercise: {e}")))?;
    }
    Ok(())
}

#[async_trait]
impl WorkoutRepository for Database {
    async fn insert_exercise(&self, exercise: &ExerciseDefinition) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO exercises (id, name, muscle_group, description, is_compound)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(exercise.id.to_string())
        .bind(&exercise.name)
        .bind(&exercise.muscle_group)
        .bind(exercise.description.as_deref())
        .bind(i64::from(exercise.is_compound))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create exercise: {e}")))?;
        Ok(())
    }

    async fn exercise_by_id(&self, exercise_id: Uuid) -> AppResult<Option<ExerciseDefinition>> {
        let row = sqlx::query(
            "SELECT id, name, muscle_group, description, is_compound FROM exercises WHERE id = $1",
        )
        .bind(exercise_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get exercise: {e}")))?;

        row.map(|r| row_to_exercise(&r)).transpose()
    }

    async fn exercise_by_name(&self, name: &str) -> AppResult<Option<ExerciseDefinition>> {
        let row = sqlx::query(
            r"
            SELECT id, name, muscle_group, description, is_compound
            FROM exercises
            WHERE name = $1 COLLATE NOCASE
            LIMIT 1
            ",
        )
        .bind(name.trim())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get exercise: {e}")))?;

        row.map(|r| row_to_exercise(&r)).transpose()
    }

    async fn list_exercises(&self) -> AppResult<Vec<ExerciseDefinition>> {
        let rows = sqlx::query(
            "SELECT id, name, muscle_group, description, is_compound FROM exercises ORDER BY name",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list exercises: {e}")))?;

        rows.iter().map(row_to_exercise).collect()
    }

    async fn insert_workout(&self, workout: &WorkoutRecord) -> AppResult<()> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO workouts (id, user_id, name, performed_at, duration_minutes, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(workout.id.to_string())
        .bind(workout.user_id.to_string())
        .bind(&workout.name)
        .bind(encode_timestamp(workout.performed_at))
        .bind(workout.duration_minutes.map(i64::from))
        .bind(workout.notes.as_deref())
        .bind(encode_timestamp(workout.created_at))
        .bind(encode_timestamp(workout.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create workout: {e}")))?;

        write_entries(&mut tx, workout).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit workout: {e}")))
    }

    async fn replace_workout(&self, workout: &WorkoutRecord) -> AppResult<()> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let result = sqlx::query(
            r"
            UPDATE workouts
            SET name = $1, performed_at = $2, duration_minutes = $3, notes = $4, updated_at = $5
            WHERE id = $6
            ",
        )
        .bind(&workout.name)
        .bind(encode_timestamp(workout.performed_at))
        .bind(workout.duration_minutes.map(i64::from))
        .bind(workout.notes.as_deref())
        .bind(encode_timestamp(workout.updated_at))
        .bind(workout.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update workout: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Workout {}", workout.id)));
        }

        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(workout.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear workout exercises: {e}")))?;

        write_entries(&mut tx, workout).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit workout: {e}")))
    }

    async fn delete_workout(&self, workout_id: Uuid) -> AppResult<bool> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(workout_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout exercises: {e}")))?;

        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(workout_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit delete: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn workout_by_id(&self, workout_id: Uuid) -> AppResult<Option<WorkoutRecord>> {
        let query = format!("{WORKOUT_COLUMNS} WHERE w.id = $1 ORDER BY we.position");
        let rows = sqlx::query(&query)
            .bind(workout_id.to_string())
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get workout: {e}")))?;

        Ok(rows_to_workouts(&rows)?.into_iter().next())
    }

    async fn workouts_for(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<WorkoutRecord>> {
        let query = format!(
            r"{WORKOUT_COLUMNS}
            WHERE w.user_id = $1
              AND ($2 IS NULL OR w.performed_at >= $2)
              AND ($3 IS NULL OR w.performed_at <= $3)
            ORDER BY w.performed_at, w.id, we.position
            "
        );
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(since.map(encode_timestamp))
            .bind(until.map(encode_timestamp))
            .fetch_all(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to list workouts: {e}")))?;

        rows_to_workouts(&rows)
    }
}
