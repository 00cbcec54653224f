// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout Log: a personal fitness log.
//!
//! This crate provides the Workout Store API (a CRUD service over a single
//! `workouts` table) and the HealthKit importer that turns an Apple Health
//! export into calls against that API.

pub mod config;
pub mod db;
pub mod error;
pub mod importer;
pub mod models;
pub mod routes;
pub mod time_utils;

use config::Config;
use db::WorkoutDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: WorkoutDb,
}
