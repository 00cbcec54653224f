// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the Workout Store API, as used by the importer.

use crate::models::{NewWorkout, WorkoutResponse};
use serde::Deserialize;

/// Errors talking to the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Unexpected health response: {0}")]
    Unhealthy(String),
}

/// Workout Store API client.
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `http://localhost:5000`).
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Verify the store answers `{"ok": true}` on its health endpoint.
    pub async fn health(&self) -> Result<(), StoreError> {
        let url = format!("{}/api/health", self.base_url);
        let body: serde_json::Value = self.get_json(&url).await?;

        if body.get("ok") == Some(&serde_json::Value::Bool(true)) {
            Ok(())
        } else {
            Err(StoreError::Unhealthy(body.to_string()))
        }
    }

    /// Fetch every stored workout (no pagination).
    pub async fn list_workouts(&self) -> Result<Vec<WorkoutResponse>, StoreError> {
        let url = format!("{}/api/workouts", self.base_url);
        let workouts: Option<Vec<WorkoutResponse>> = self.get_json(&url).await?;
        Ok(workouts.unwrap_or_default())
    }

    /// Create a workout.
    pub async fn create_workout(
        &self,
        workout: &NewWorkout,
    ) -> Result<WorkoutResponse, StoreError> {
        let url = format!("{}/api/workouts", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(workout)
            .send()
            .await?;

        self.check_response_json(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, StoreError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}
