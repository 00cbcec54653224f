// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

/// Timestamp layout used by HealthKit exports, e.g. `2018-02-24 17:48:40 -0600`.
pub const HEALTHKIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a fixed-offset timestamp as ISO-8601, keeping its original offset
/// (`2018-02-24T17:48:40-06:00`).
pub fn format_offset_iso8601(date: DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parse a HealthKit export timestamp. The offset is kept as-is; no time zone
/// database lookup happens.
pub fn parse_healthkit_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(raw.trim(), HEALTHKIT_TIMESTAMP_FORMAT)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
}
