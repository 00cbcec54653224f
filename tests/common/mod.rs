// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use workout_log::config::Config;
use workout_log::db::WorkoutDb;
use workout_log::routes::create_router;
use workout_log::AppState;

/// Create a test app backed by a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = WorkoutDb::new_in_memory()
        .await
        .expect("Failed to create in-memory database");

    let state = Arc::new(AppState { config, db });

    (create_router(state.clone()), state)
}

/// Serve a test app on an ephemeral local port.
/// Returns the base URL and the shared state.
#[allow(dead_code)]
pub async fn spawn_test_server() -> (String, Arc<AppState>) {
    let (app, state) = create_test_app().await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    (format!("http://{}", addr), state)
}

/// Path to a file under tests/fixtures.
#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// One self-closing `Workout` element.
#[allow(dead_code)]
pub fn workout_element(activity_type: &str, date: &str, duration: &str, unit: &str) -> String {
    format!(
        r#"<Workout workoutActivityType="{activity_type}" duration="{duration}" durationUnit="{unit}" sourceName="Apple Watch" startDate="{date} 07:00:00 +0200" endDate="{date} 08:00:00 +0200"/>"#
    )
}

/// Write a HealthKit export containing `workouts` to a temp file.
#[allow(dead_code)]
pub fn write_export(workouts: &[String]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, r#"<?xml version="1.0" encoding="UTF-8"?>"#).unwrap();
    writeln!(file, r#"<HealthData locale="en_US">"#).unwrap();
    for workout in workouts {
        writeln!(file, "  {}", workout).unwrap();
    }
    writeln!(file, "</HealthData>").unwrap();
    file.flush().unwrap();
    file
}
