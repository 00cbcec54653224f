// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout CRUD routes.

use crate::db::WorkoutInsert;
use crate::error::{AppError, Result};
use crate::models::WorkoutResponse;
use crate::time_utils::parse_iso_date;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts).post(create_workout))
        .route(
            "/api/workouts/{id}",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
}

// ─── Validation ──────────────────────────────────────────────

fn parse_workout_date(raw: Option<&str>) -> Result<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("workout_date is required (YYYY-MM-DD)".to_string())
        })?;

    parse_iso_date(raw).map_err(|_| {
        AppError::BadRequest("workout_date must be a YYYY-MM-DD date".to_string())
    })
}

fn parse_activity(raw: Option<&str>) -> Result<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest("activity is required".to_string()))
}

fn check_duration(duration_minutes: Option<i64>) -> Result<Option<i64>> {
    match duration_minutes {
        Some(minutes) if minutes < 0 => Err(AppError::BadRequest(
            "duration_minutes must not be negative".to_string(),
        )),
        other => Ok(other),
    }
}

fn parse_range_bound(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            parse_iso_date(s).map_err(|_| {
                AppError::BadRequest(format!("Invalid '{}' parameter: must be YYYY-MM-DD", name))
            })
        })
        .transpose()
}

/// Deserialize a present field (including an explicit `null`) as `Some(..)`,
/// so `Option<Option<T>>` can tell "absent" from "set to null".
fn deserialize_present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ─── List ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ListQuery {
    /// Earliest workout date, inclusive
    from: Option<String>,
    /// Latest workout date, inclusive
    to: Option<String>,
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<WorkoutResponse>>> {
    let from = parse_range_bound("from", params.from.as_deref())?;
    let to = parse_range_bound("to", params.to.as_deref())?;

    tracing::debug!(from = ?from, to = ?to, "Listing workouts");

    let workouts = state.db.list_workouts(from, to).await?;
    Ok(Json(workouts.into_iter().map(Into::into).collect()))
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateWorkoutRequest {
    workout_date: Option<String>,
    activity: Option<String>,
    duration_minutes: Option<i64>,
    notes: Option<String>,
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutResponse>)> {
    let insert = WorkoutInsert {
        workout_date: parse_workout_date(body.workout_date.as_deref())?,
        activity: parse_activity(body.activity.as_deref())?,
        duration_minutes: check_duration(body.duration_minutes)?,
        notes: body.notes,
    };

    let workout = state.db.insert_workout(&insert).await?;
    tracing::info!(id = workout.id, activity = %workout.activity, "Created workout");

    Ok((StatusCode::CREATED, Json(workout.into())))
}

// ─── Read ────────────────────────────────────────────────────

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<WorkoutResponse>> {
    let workout = state
        .db
        .get_workout(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;

    Ok(Json(workout.into()))
}

// ─── Update ──────────────────────────────────────────────────

/// Partial update. Absent fields are left untouched.
#[derive(Deserialize)]
struct UpdateWorkoutRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    workout_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    activity: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    duration_minutes: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    notes: Option<Option<String>>,
}

async fn update_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateWorkoutRequest>,
) -> Result<Json<WorkoutResponse>> {
    let not_found = || AppError::NotFound(format!("Workout {} not found", id));

    let mut workout = state.db.get_workout(id).await?.ok_or_else(not_found)?;

    if let Some(date) = body.workout_date {
        workout.workout_date = parse_workout_date(date.as_deref())?;
    }
    if let Some(activity) = body.activity {
        workout.activity = parse_activity(activity.as_deref())?;
    }
    if let Some(duration) = body.duration_minutes {
        workout.duration_minutes = check_duration(duration)?;
    }
    if let Some(notes) = body.notes {
        workout.notes = notes;
    }

    let updated = state
        .db
        .update_workout(&workout)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(id, "Updated workout");
    Ok(Json(updated.into()))
}

// ─── Delete ──────────────────────────────────────────────────

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if !state.db.delete_workout(id).await? {
        return Err(AppError::NotFound(format!("Workout {} not found", id)));
    }

    tracing::info!(id, "Deleted workout");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_is_trimmed() {
        assert_eq!(parse_activity(Some("  Yoga \n")).unwrap(), "Yoga");
        assert!(matches!(
            parse_activity(Some("   ")),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(parse_activity(None), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_workout_date_validation() {
        assert_eq!(
            parse_workout_date(Some("2024-07-04")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
        );
        assert!(parse_workout_date(Some("")).is_err());
        assert!(parse_workout_date(Some("July 4th")).is_err());
        assert!(parse_workout_date(None).is_err());
    }

    #[test]
    fn test_negative_duration_rejected() {
        assert_eq!(check_duration(Some(0)).unwrap(), Some(0));
        assert_eq!(check_duration(None).unwrap(), None);
        assert!(check_duration(Some(-1)).is_err());
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let body: UpdateWorkoutRequest =
            serde_json::from_str(r#"{"notes": null, "duration_minutes": 40}"#).unwrap();
        assert_eq!(body.notes, Some(None));
        assert_eq!(body.duration_minutes, Some(Some(40)));
        assert_eq!(body.activity, None);
        assert_eq!(body.workout_date, None);
    }
}
