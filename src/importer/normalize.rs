// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field normalization for HealthKit workouts.

use chrono::{DateTime, FixedOffset};

use crate::time_utils::format_offset_iso8601;

/// Prefix HealthKit puts on every workout activity type.
pub const ACTIVITY_TYPE_PREFIX: &str = "HKWorkoutActivityType";

/// First line of every imported record's notes.
pub const NOTES_HEADER: &str = "Imported from HealthKit";

/// Turn `HKWorkoutActivityTypeTraditionalStrengthTraining` into
/// `Traditional Strength Training`.
///
/// A new word starts at every uppercase letter, so acronyms come out one
/// letter per word (`HIIT` -> `H I I T`).
pub fn friendly_activity(activity_type: &str) -> String {
    let raw = activity_type
        .strip_prefix(ACTIVITY_TYPE_PREFIX)
        .unwrap_or(activity_type);

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in raw.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.join(" ")
}

/// Unit of a HealthKit `duration` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
}

impl DurationUnit {
    /// Parse a unit name, case-insensitively. A missing or empty unit means
    /// minutes, which is what HealthKit writes.
    pub fn parse(unit: Option<&str>) -> Option<Self> {
        let unit = unit.filter(|u| !u.is_empty()).unwrap_or("min");
        match unit.to_ascii_lowercase().as_str() {
            "min" | "mins" | "minute" | "minutes" => Some(Self::Minutes),
            "s" | "sec" | "secs" | "second" | "seconds" => Some(Self::Seconds),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(Self::Hours),
            _ => None,
        }
    }

    fn to_minutes(self, value: f64) -> f64 {
        match self {
            Self::Seconds => value / 60.0,
            Self::Minutes => value,
            Self::Hours => value * 60.0,
        }
    }
}

/// Convert a HealthKit duration to whole minutes.
///
/// Rounds to nearest with ties to even (`1.5` -> `2`, `2.5` -> `2`,
/// `30 sec` -> `0`). Returns `None` ("unknown") when the value is missing,
/// not a finite number, negative, or in an unrecognized unit.
pub fn duration_minutes(duration: Option<&str>, unit: Option<&str>) -> Option<i64> {
    let value: f64 = duration?.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    let unit = DurationUnit::parse(unit)?;
    Some(unit.to_minutes(value).round_ties_even() as i64)
}

/// A measured value worth mentioning in notes: non-empty and, when numeric,
/// not zero.
fn meaningful(value: Option<&str>) -> Option<&str> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.parse::<f64>() {
        Ok(n) if n == 0.0 => None,
        _ => Some(value),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Optional provenance details for the notes of an imported workout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotesExtras<'a> {
    pub source_name: Option<&'a str>,
    pub total_distance: Option<&'a str>,
    pub total_distance_unit: Option<&'a str>,
    pub total_energy_burned: Option<&'a str>,
    pub total_energy_burned_unit: Option<&'a str>,
}

/// Build the provenance notes: header, start, end, then source, distance and
/// energy lines when their value and unit are both present.
pub fn compose_notes(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    extras: &NotesExtras<'_>,
) -> String {
    let mut lines = vec![
        NOTES_HEADER.to_string(),
        format!("Start: {}", format_offset_iso8601(start)),
        format!("End: {}", format_offset_iso8601(end)),
    ];

    if let Some(source) = non_empty(extras.source_name) {
        lines.push(format!("Source: {}", source));
    }
    if let (Some(distance), Some(unit)) = (
        meaningful(extras.total_distance),
        non_empty(extras.total_distance_unit),
    ) {
        lines.push(format!("Distance: {} {}", distance, unit));
    }
    if let (Some(energy), Some(unit)) = (
        meaningful(extras.total_energy_burned),
        non_empty(extras.total_energy_burned_unit),
    ) {
        lines.push(format!("Energy: {} {}", energy, unit));
    }

    lines.join("\n")
}
