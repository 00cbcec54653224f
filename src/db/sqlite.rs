// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite-backed workout storage.
//!
//! A single `workouts` table holds every record. The schema is created on
//! connect if it does not exist yet.

use crate::error::AppError;
use crate::models::Workout;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 5;

const WORKOUT_COLUMNS: &str =
    "id, workout_date, activity, duration_minutes, notes, created_at, updated_at";

/// Validated values for a new workout row.
#[derive(Debug, Clone)]
pub struct WorkoutInsert {
    pub workout_date: NaiveDate,
    pub activity: String,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}

/// Workout database client.
#[derive(Clone)]
pub struct WorkoutDb {
    pool: SqlitePool,
}

impl WorkoutDb {
    /// Connect to the database at `database_url`, creating the file and the
    /// schema if needed.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        if is_memory_url(database_url) {
            return Self::new_in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("Invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        let db = Self { pool };
        db.create_schema().await?;

        tracing::info!(url = database_url, "Connected to SQLite");
        Ok(db)
    }

    /// Create a private in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    async fn create_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_date TEXT NOT NULL,
                activity TEXT NOT NULL,
                duration_minutes INTEGER,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workouts_workout_date ON workouts (workout_date)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ─── Workout Operations ──────────────────────────────────────

    /// List workouts, newest date first (ties: newest id first), optionally
    /// bounded by an inclusive date range.
    pub async fn list_workouts(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Workout>, AppError> {
        let sql = format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts \
             WHERE (?1 IS NULL OR workout_date >= ?1) \
               AND (?2 IS NULL OR workout_date <= ?2) \
             ORDER BY workout_date DESC, id DESC"
        );

        let workouts = sqlx::query_as::<_, Workout>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(workouts)
    }

    /// Get a workout by id.
    pub async fn get_workout(&self, id: i64) -> Result<Option<Workout>, AppError> {
        let sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?1");

        let workout = sqlx::query_as::<_, Workout>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(workout)
    }

    /// Insert a workout and return the stored row.
    pub async fn insert_workout(&self, new: &WorkoutInsert) -> Result<Workout, AppError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO workouts \
               (workout_date, activity, duration_minutes, notes, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?5) \
             RETURNING {WORKOUT_COLUMNS}"
        );

        let workout = sqlx::query_as::<_, Workout>(&sql)
            .bind(new.workout_date)
            .bind(&new.activity)
            .bind(new.duration_minutes)
            .bind(&new.notes)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(id = workout.id, date = %workout.workout_date, "Inserted workout");
        Ok(workout)
    }

    /// Persist all mutable fields of `workout` and bump `updated_at`.
    ///
    /// Returns `None` if the row no longer exists.
    pub async fn update_workout(&self, workout: &Workout) -> Result<Option<Workout>, AppError> {
        let sql = format!(
            "UPDATE workouts \
             SET workout_date = ?1, activity = ?2, duration_minutes = ?3, notes = ?4, \
                 updated_at = ?5 \
             WHERE id = ?6 \
             RETURNING {WORKOUT_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Workout>(&sql)
            .bind(workout.workout_date)
            .bind(&workout.activity)
            .bind(workout.duration_minutes)
            .bind(&workout.notes)
            .bind(Utc::now())
            .bind(workout.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    /// Delete a workout. Returns whether a row was removed.
    pub async fn delete_workout(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn is_memory_url(url: &str) -> bool {
    url == "sqlite::memory:" || url.contains(":memory:") || url.contains("mode=memory")
}
