// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streaming reader for `Workout` elements in a HealthKit export.
//!
//! Exports can run to hundreds of megabytes, so the document is pulled one
//! event at a time. Only the attributes of each `Workout` element are kept;
//! nested children (statistics, events, routes) are read past and dropped.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const WORKOUT_TAG: &[u8] = b"Workout";

/// Errors from reading the export.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("Malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("Malformed XML: {0}")]
    Truncated(&'static str),
}

/// Attributes of one `Workout` element, each kept only if present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawWorkout {
    pub workout_activity_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<String>,
    pub duration_unit: Option<String>,
    pub source_name: Option<String>,
    pub total_distance: Option<String>,
    pub total_distance_unit: Option<String>,
    pub total_energy_burned: Option<String>,
    pub total_energy_burned_unit: Option<String>,
}

impl RawWorkout {
    /// The `workoutActivityType` attribute, or `""` when missing.
    pub fn activity_type(&self) -> &str {
        self.workout_activity_type.as_deref().unwrap_or("")
    }

    fn from_element(element: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut workout = RawWorkout::default();

        for attr in element.attributes() {
            let attr = attr?;
            let slot = match attr.key.as_ref() {
                b"workoutActivityType" => &mut workout.workout_activity_type,
                b"startDate" => &mut workout.start_date,
                b"endDate" => &mut workout.end_date,
                b"duration" => &mut workout.duration,
                b"durationUnit" => &mut workout.duration_unit,
                b"sourceName" => &mut workout.source_name,
                b"totalDistance" => &mut workout.total_distance,
                b"totalDistanceUnit" => &mut workout.total_distance_unit,
                b"totalEnergyBurned" => &mut workout.total_energy_burned,
                b"totalEnergyBurnedUnit" => &mut workout.total_energy_burned_unit,
                _ => continue,
            };
            *slot = Some(attr.unescape_value()?.into_owned());
        }

        Ok(workout)
    }
}

/// Lazy, single-pass sequence of [`RawWorkout`]s in document order.
///
/// Iteration stops after the first error.
pub struct WorkoutReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    skip_buf: Vec<u8>,
    /// Open elements, not counting a `Workout` whose children were skipped.
    depth: usize,
    seen_root: bool,
    finished: bool,
}

impl WorkoutReader<BufReader<File>> {
    /// Open an export file for streaming.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, XmlError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| XmlError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> WorkoutReader<R> {
    pub fn from_reader(inner: R) -> Self {
        Self {
            reader: Reader::from_reader(inner),
            buf: Vec::new(),
            skip_buf: Vec::new(),
            depth: 0,
            seen_root: false,
            finished: false,
        }
    }

    fn next_workout(&mut self) -> Result<Option<RawWorkout>, XmlError> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(element) if element.name().as_ref() == WORKOUT_TAG => {
                    self.seen_root = true;
                    let workout = RawWorkout::from_element(&element)?;
                    self.skip_buf.clear();
                    self.reader.read_to_end_into(element.name(), &mut self.skip_buf)?;
                    return Ok(Some(workout));
                }
                Event::Empty(element) if element.name().as_ref() == WORKOUT_TAG => {
                    self.seen_root = true;
                    return RawWorkout::from_element(&element).map(Some);
                }
                Event::Start(_) => {
                    self.seen_root = true;
                    self.depth += 1;
                }
                Event::Empty(_) => self.seen_root = true,
                Event::End(_) => self.depth = self.depth.saturating_sub(1),
                Event::Eof if !self.seen_root => {
                    return Err(XmlError::Truncated("no element found"));
                }
                Event::Eof if self.depth > 0 => {
                    return Err(XmlError::Truncated("document ends inside an open element"));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for WorkoutReader<R> {
    type Item = Result<RawWorkout, XmlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let next = self.next_workout().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.finished = true;
        }
        next
    }
}
