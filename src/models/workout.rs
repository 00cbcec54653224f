// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout model for storage and API.

use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored workout row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Workout {
    /// Store-assigned identifier (auto-increment)
    pub id: i64,
    /// Calendar date of the workout
    pub workout_date: NaiveDate,
    /// Short label, never blank
    pub activity: String,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workout as it appears on the wire.
///
/// Dates and timestamps are ISO-8601 strings. The importer deserializes the
/// list endpoint into this same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutResponse {
    pub id: i64,
    pub workout_date: String,
    pub activity: String,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Workout> for WorkoutResponse {
    fn from(w: Workout) -> Self {
        Self {
            id: w.id,
            workout_date: w.workout_date.to_string(),
            activity: w.activity,
            duration_minutes: w.duration_minutes,
            notes: w.notes,
            created_at: format_utc_rfc3339(w.created_at),
            updated_at: format_utc_rfc3339(w.updated_at),
        }
    }
}

/// Body of a create request as sent by API clients such as the importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NewWorkout {
    /// `YYYY-MM-DD`
    pub workout_date: String,
    pub activity: String,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}
