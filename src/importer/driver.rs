// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Import driver.
//!
//! Handles the core workflow:
//! 1. Check the store is healthy
//! 2. Snapshot existing workouts into a de-duplication set
//! 3. Stream the export, filtering and normalizing each workout
//! 4. Create new workouts one at a time, in document order
//! 5. Report counters

use crate::importer::client::{StoreClient, StoreError};
use crate::importer::dedupe::{DedupeKey, DedupeSet};
use crate::importer::normalize::{compose_notes, duration_minutes, friendly_activity, NotesExtras};
use crate::importer::xml::{RawWorkout, WorkoutReader, XmlError};
use crate::models::NewWorkout;
use crate::time_utils::parse_healthkit_timestamp;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// Activity types skipped unless the caller says otherwise.
pub const DEFAULT_EXCLUDE_TYPES: &[&str] =
    &["HKWorkoutActivityTypeWalking", "HKWorkoutActivityTypeOther"];

/// Dry runs print at most this many previews.
const PREVIEW_LIMIT: u64 = 10;

/// Fatal import errors.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("API health check failed: {0}")]
    Unhealthy(#[source] StoreError),

    #[error("Failed to fetch existing workouts: {0}")]
    ExistingWorkouts(#[source] StoreError),

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("Workout element is missing {0}")]
    MissingAttribute(&'static str),

    #[error("Invalid {field} {value:?}: {source}")]
    Timestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("POST failed for {key}: {source}")]
    Submit {
        key: DedupeKey,
        #[source]
        source: StoreError,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl ImportError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            ImportError::Unhealthy(_) => 2,
            ImportError::Submit { .. } => 3,
            _ => 1,
        }
    }
}

/// Filtering and run-mode settings.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// When non-empty, only these activity types are imported.
    pub include_types: HashSet<String>,
    pub exclude_types: HashSet<String>,
    /// Stop after this many `Workout` elements (0 = no limit).
    pub max_records: u64,
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            include_types: HashSet::new(),
            exclude_types: DEFAULT_EXCLUDE_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            max_records: 0,
            dry_run: false,
        }
    }
}

impl ImportOptions {
    fn type_allowed(&self, activity_type: &str) -> bool {
        if !self.include_types.is_empty() && !self.include_types.contains(activity_type) {
            return false;
        }
        !self.exclude_types.contains(activity_type)
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// `Workout` elements read, including skipped ones.
    #[serde(rename = "workout_tags_seen")]
    pub seen: u64,
    pub skipped_type: u64,
    pub skipped_dupe: u64,
    pub imported: u64,
    pub dry_run: bool,
}

impl ImportSummary {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A normalized workout ready to be sent, with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedWorkout {
    pub key: DedupeKey,
    pub workout: NewWorkout,
}

impl PreparedWorkout {
    /// One-line dry-run preview.
    pub fn preview_line(&self) -> String {
        let minutes = self
            .workout
            .duration_minutes
            .map(|m| m.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "WOULD IMPORT: {} | {} | {} min",
            self.workout.workout_date, self.workout.activity, minutes
        )
    }
}

/// What to do with one raw workout.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordDecision {
    SkipType,
    SkipDuplicate(DedupeKey),
    Import(PreparedWorkout),
}

fn parse_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<DateTime<FixedOffset>, ImportError> {
    let value = value.ok_or(ImportError::MissingAttribute(field))?;
    parse_healthkit_timestamp(value).map_err(|source| ImportError::Timestamp {
        field,
        value: value.to_string(),
        source,
    })
}

/// Normalize a raw workout into the API payload.
///
/// The workout date is the calendar date of the start time in its own offset.
pub fn prepare_workout(raw: &RawWorkout) -> Result<PreparedWorkout, ImportError> {
    let start = parse_timestamp("startDate", raw.start_date.as_deref())?;
    let end = parse_timestamp("endDate", raw.end_date.as_deref())?;

    let workout_date = start.date_naive().to_string();
    let activity = friendly_activity(raw.activity_type());
    let minutes = duration_minutes(raw.duration.as_deref(), raw.duration_unit.as_deref());

    let notes = compose_notes(
        start,
        end,
        &NotesExtras {
            source_name: raw.source_name.as_deref(),
            total_distance: raw.total_distance.as_deref(),
            total_distance_unit: raw.total_distance_unit.as_deref(),
            total_energy_burned: raw.total_energy_burned.as_deref(),
            total_energy_burned_unit: raw.total_energy_burned_unit.as_deref(),
        },
    );

    Ok(PreparedWorkout {
        key: DedupeKey::new(&workout_date, &activity, minutes),
        workout: NewWorkout {
            workout_date,
            activity,
            duration_minutes: minutes,
            notes: Some(notes),
        },
    })
}

/// Runs a HealthKit import against one store.
pub struct Importer {
    client: StoreClient,
    options: ImportOptions,
}

impl Importer {
    pub fn new(client: StoreClient, options: ImportOptions) -> Self {
        Self { client, options }
    }

    /// Run a full import of the export at `xml_path`.
    ///
    /// Dry-run previews are written to `preview`.
    pub async fn run<W: Write>(
        &self,
        xml_path: &Path,
        preview: &mut W,
    ) -> Result<ImportSummary, ImportError> {
        tracing::info!(
            api = self.client.base_url(),
            xml = %xml_path.display(),
            dry_run = self.options.dry_run,
            "Starting HealthKit import"
        );

        // 1. Health check
        self.client.health().await.map_err(ImportError::Unhealthy)?;
        tracing::debug!("Store is healthy");

        // 2. Snapshot existing keys
        let existing = self
            .client
            .list_workouts()
            .await
            .map_err(ImportError::ExistingWorkouts)?;
        let mut keys = DedupeSet::from_workouts(&existing);
        tracing::info!(existing = keys.len(), "Built de-duplication set");

        // 3-4. Stream and import
        let reader = WorkoutReader::open(xml_path)?;
        let summary = self.import_records(reader, &mut keys, preview).await?;

        // 5. Report
        tracing::info!(
            seen = summary.seen,
            skipped_type = summary.skipped_type,
            skipped_dupe = summary.skipped_dupe,
            imported = summary.imported,
            dry_run = summary.dry_run,
            "Import complete"
        );

        Ok(summary)
    }

    /// Decide what to do with one workout, given the keys already stored.
    pub fn classify(
        &self,
        raw: &RawWorkout,
        keys: &DedupeSet,
    ) -> Result<RecordDecision, ImportError> {
        if !self.options.type_allowed(raw.activity_type()) {
            return Ok(RecordDecision::SkipType);
        }

        let prepared = prepare_workout(raw)?;
        if keys.contains(&prepared.key) {
            return Ok(RecordDecision::SkipDuplicate(prepared.key));
        }

        Ok(RecordDecision::Import(prepared))
    }

    /// Process records in order, growing `keys` with every confirmed create.
    pub async fn import_records<I, W>(
        &self,
        records: I,
        keys: &mut DedupeSet,
        preview: &mut W,
    ) -> Result<ImportSummary, ImportError>
    where
        I: IntoIterator<Item = Result<RawWorkout, XmlError>>,
        W: Write,
    {
        let mut summary = ImportSummary {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        for record in records {
            if self.options.max_records > 0 && summary.seen >= self.options.max_records {
                tracing::info!(max = self.options.max_records, "Record limit reached");
                break;
            }

            let raw = record?;
            summary.seen += 1;

            match self.classify(&raw, keys)? {
                RecordDecision::SkipType => {
                    tracing::debug!(
                        activity_type = raw.activity_type(),
                        "Skipping excluded type"
                    );
                    summary.skipped_type += 1;
                }
                RecordDecision::SkipDuplicate(key) => {
                    tracing::debug!(%key, "Skipping duplicate");
                    summary.skipped_dupe += 1;
                }
                RecordDecision::Import(prepared) if self.options.dry_run => {
                    summary.imported += 1;
                    if summary.imported <= PREVIEW_LIMIT {
                        writeln!(preview, "{}", prepared.preview_line())?;
                    }
                }
                RecordDecision::Import(prepared) => {
                    if let Err(source) = self.client.create_workout(&prepared.workout).await {
                        tracing::error!(
                            key = %prepared.key,
                            imported = summary.imported,
                            "Create failed, aborting import"
                        );
                        return Err(ImportError::Submit {
                            key: prepared.key,
                            source,
                        });
                    }

                    tracing::debug!(key = %prepared.key, "Imported workout");
                    keys.insert(prepared.key);
                    summary.imported += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(activity_type: &str, day: u32, duration: &str, unit: &str) -> RawWorkout {
        RawWorkout {
            workout_activity_type: Some(activity_type.to_string()),
            start_date: Some(format!("2024-05-{:02} 06:30:00 -0700", day)),
            end_date: Some(format!("2024-05-{:02} 07:30:00 -0700", day)),
            duration: Some(duration.to_string()),
            duration_unit: Some(unit.to_string()),
            ..Default::default()
        }
    }

    /// Importer whose client points nowhere; only usable in dry-run or
    /// for classification.
    fn offline_importer(options: ImportOptions) -> Importer {
        Importer::new(StoreClient::new("http://127.0.0.1:9"), options)
    }

    #[test]
    fn test_default_excludes_walking_and_other() {
        let importer = offline_importer(ImportOptions::default());
        let keys = DedupeSet::default();

        for t in DEFAULT_EXCLUDE_TYPES {
            let decision = importer.classify(&raw(t, 1, "30", "min"), &keys).unwrap();
            assert_eq!(decision, RecordDecision::SkipType);
        }
    }

    #[test]
    fn test_include_filter_skips_other_types() {
        let options = ImportOptions {
            include_types: ["HKWorkoutActivityTypeCycling".to_string()].into(),
            ..Default::default()
        };
        let importer = offline_importer(options);
        let keys = DedupeSet::default();

        let running = raw("HKWorkoutActivityTypeRunning", 1, "30", "min");
        assert_eq!(
            importer.classify(&running, &keys).unwrap(),
            RecordDecision::SkipType
        );

        let cycling = raw("HKWorkoutActivityTypeCycling", 1, "30", "min");
        assert!(matches!(
            importer.classify(&cycling, &keys).unwrap(),
            RecordDecision::Import(_)
        ));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let options = ImportOptions {
            include_types: ["HKWorkoutActivityTypeWalking".to_string()].into(),
            ..Default::default()
        };
        let importer = offline_importer(options);
        let walking = raw("HKWorkoutActivityTypeWalking", 1, "30", "min");
        assert_eq!(
            importer.classify(&walking, &DedupeSet::default()).unwrap(),
            RecordDecision::SkipType
        );
    }

    #[test]
    fn test_duplicate_detected() {
        let importer = offline_importer(ImportOptions::default());
        let mut keys = DedupeSet::default();
        keys.insert(DedupeKey::new(
            "2024-05-03",
            "Traditional Strength Training",
            Some(45),
        ));

        let record = raw(
            "HKWorkoutActivityTypeTraditionalStrengthTraining",
            3,
            "45",
            "min",
        );
        assert!(matches!(
            importer.classify(&record, &keys).unwrap(),
            RecordDecision::SkipDuplicate(_)
        ));
    }

    #[test]
    fn test_prepare_workout() {
        let mut record = raw("HKWorkoutActivityTypeCycling", 9, "3600", "sec");
        record.source_name = Some("Apple Watch".to_string());

        let prepared = prepare_workout(&record).unwrap();
        assert_eq!(prepared.workout.workout_date, "2024-05-09");
        assert_eq!(prepared.workout.activity, "Cycling");
        assert_eq!(prepared.workout.duration_minutes, Some(60));
        assert_eq!(
            prepared.workout.notes.as_deref(),
            Some(
                "Imported from HealthKit\n\
                 Start: 2024-05-09T06:30:00-07:00\n\
                 End: 2024-05-09T07:30:00-07:00\n\
                 Source: Apple Watch"
            )
        );
        assert_eq!(
            prepared.key,
            DedupeKey::new("2024-05-09", "Cycling", Some(60))
        );
    }

    #[test]
    fn test_workout_date_uses_local_offset() {
        let record = RawWorkout {
            workout_activity_type: Some("HKWorkoutActivityTypeRunning".to_string()),
            start_date: Some("2024-12-31 23:30:00 -0500".to_string()),
            end_date: Some("2025-01-01 00:10:00 -0500".to_string()),
            ..Default::default()
        };
        let prepared = prepare_workout(&record).unwrap();
        assert_eq!(prepared.workout.workout_date, "2024-12-31");
        assert_eq!(prepared.workout.duration_minutes, None);
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        let mut record = raw("HKWorkoutActivityTypeRunning", 1, "30", "min");
        record.start_date = Some("yesterday".to_string());
        let err = prepare_workout(&record).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Timestamp {
                field: "startDate",
                ..
            }
        ));
        assert_eq!(err.exit_code(), 1);

        record.start_date = None;
        assert!(matches!(
            prepare_workout(&record).unwrap_err(),
            ImportError::MissingAttribute("startDate")
        ));
    }

    #[test]
    fn test_preview_line() {
        let mut prepared =
            prepare_workout(&raw("HKWorkoutActivityTypeRowing", 2, "20", "min")).unwrap();
        assert_eq!(
            prepared.preview_line(),
            "WOULD IMPORT: 2024-05-02 | Rowing | 20 min"
        );

        prepared.workout.duration_minutes = None;
        assert_eq!(
            prepared.preview_line(),
            "WOULD IMPORT: 2024-05-02 | Rowing | unknown min"
        );
    }

    #[test]
    fn test_summary_json_keys() {
        let summary = ImportSummary {
            seen: 3,
            skipped_type: 1,
            skipped_dupe: 0,
            imported: 2,
            dry_run: false,
        };
        let json: serde_json::Value =
            serde_json::from_str(&summary.to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "workout_tags_seen": 3,
                "skipped_type": 1,
                "skipped_dupe": 0,
                "imported": 2,
                "dry_run": false
            })
        );
    }

    #[tokio::test]
    async fn test_dry_run_limits_previews() {
        let options = ImportOptions {
            dry_run: true,
            ..Default::default()
        };
        let importer = offline_importer(options);
        let records: Vec<Result<RawWorkout, XmlError>> = (1..=12)
            .map(|day| Ok(raw("HKWorkoutActivityTypeRunning", day, "30", "min")))
            .collect();

        let mut keys = DedupeSet::default();
        let mut out = Vec::new();
        let summary = importer
            .import_records(records, &mut keys, &mut out)
            .await
            .unwrap();

        assert_eq!(summary.imported, 12);
        assert!(summary.dry_run);
        assert!(keys.is_empty(), "dry run must not record keys");

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 10);
        assert!(text.starts_with("WOULD IMPORT: 2024-05-01 | Running | 30 min\n"));
    }

    #[tokio::test]
    async fn test_max_records_caps_seen() {
        let options = ImportOptions {
            dry_run: true,
            max_records: 3,
            ..Default::default()
        };
        let importer = offline_importer(options);
        let records: Vec<Result<RawWorkout, XmlError>> = (1..=10)
            .map(|day| Ok(raw("HKWorkoutActivityTypeRunning", day, "30", "min")))
            .collect();

        let summary = importer
            .import_records(records, &mut DedupeSet::default(), &mut std::io::sink())
            .await
            .unwrap();

        assert_eq!(summary.seen, 3);
        assert_eq!(summary.imported, 3);
    }

    #[test]
    fn test_exit_codes() {
        let unhealthy = ImportError::Unhealthy(StoreError::Unhealthy("{}".to_string()));
        assert_eq!(unhealthy.exit_code(), 2);

        let submit = ImportError::Submit {
            key: DedupeKey::new("2024-01-01", "Run", None),
            source: StoreError::Unhealthy("boom".to_string()),
        };
        assert_eq!(submit.exit_code(), 3);

        let missing = ImportError::MissingAttribute("endDate");
        assert_eq!(missing.exit_code(), 1);
    }
}
