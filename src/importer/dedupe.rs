// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity used to decide whether a workout was already imported.

use crate::models::WorkoutResponse;
use std::collections::HashSet;
use std::fmt;

/// `(workout_date, trimmed activity, duration_minutes)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    pub workout_date: String,
    pub activity: String,
    pub duration_minutes: Option<i64>,
}

impl DedupeKey {
    pub fn new(workout_date: &str, activity: &str, duration_minutes: Option<i64>) -> Self {
        Self {
            workout_date: workout_date.to_string(),
            activity: activity.trim().to_string(),
            duration_minutes,
        }
    }
}

impl fmt::Display for DedupeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration_minutes {
            Some(minutes) => write!(f, "({}, {}, {})", self.workout_date, self.activity, minutes),
            None => write!(f, "({}, {}, null)", self.workout_date, self.activity),
        }
    }
}

impl From<&WorkoutResponse> for DedupeKey {
    fn from(w: &WorkoutResponse) -> Self {
        DedupeKey::new(&w.workout_date, &w.activity, w.duration_minutes)
    }
}

/// Keys of every workout known to be in the store.
///
/// Seeded from a snapshot of the store and grown only after a record is
/// confirmed created.
#[derive(Debug, Default, Clone)]
pub struct DedupeSet {
    keys: HashSet<DedupeKey>,
}

impl DedupeSet {
    pub fn from_workouts<'a, I>(workouts: I) -> Self
    where
        I: IntoIterator<Item = &'a WorkoutResponse>,
    {
        Self {
            keys: workouts.into_iter().map(DedupeKey::from).collect(),
        }
    }

    pub fn contains(&self, key: &DedupeKey) -> bool {
        self.keys.contains(key)
    }

    /// Record a key. Returns `false` if it was already present.
    pub fn insert(&mut self, key: DedupeKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
