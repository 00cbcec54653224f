// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HealthKit import pipeline.
//!
//! Handles the flow from an Apple Health `export.xml` to the Workout API:
//! 1. Stream `Workout` elements out of the export
//! 2. Filter by activity type
//! 3. Normalize date, activity name, duration and notes
//! 4. Skip records already in the store (de-duplication)
//! 5. Create the remaining records and report counters

pub mod client;
pub mod dedupe;
pub mod driver;
pub mod normalize;
pub mod xml;

pub use client::{StoreClient, StoreError};
pub use dedupe::{DedupeKey, DedupeSet};
pub use driver::{ImportError, ImportOptions, ImportSummary, Importer, DEFAULT_EXCLUDE_TYPES};
pub use xml::{RawWorkout, WorkoutReader, XmlError};
