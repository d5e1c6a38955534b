// ABOUTME: Personal record models: record types and the append-only record log
// ABOUTME: Each log entry captures the lift that beat the previous best
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Kind of personal record tracked per exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// Heaviest single weight
    MaxWeight,
    /// Largest `sets * reps * weight`
    MaxVolume,
    /// Most total repetitions (`sets * reps`)
    MaxReps,
}

impl RecordType {
    /// Order in which record types are checked for each exercise entry
    pub const CHECK_ORDER: [Self; 3] = [Self::MaxWeight, Self::MaxVolume, Self::MaxReps];

    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MaxWeight => "max_weight",
            Self::MaxVolume => "max_volume",
            Self::MaxReps => "max_reps",
        }
    }

    /// Candidate value of this record type for one set configuration
    #[must_use]
    pub fn candidate_value(&self, sets: u32, reps: u32, weight: f64) -> f64 {
        match self {
            Self::MaxWeight => weight,
            Self::MaxVolume => f64::from(sets) * f64::from(reps) * weight,
            Self::MaxReps => f64::from(sets) * f64::from(reps),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max_weight" => Ok(Self::MaxWeight),
            "max_volume" => Ok(Self::MaxVolume),
            "max_reps" => Ok(Self::MaxReps),
            other => Err(AppError::invalid_input(format!(
                "Unknown record type: {other}"
            ))),
        }
    }
}

/// One entry of a user's personal-record log
///
/// The log is append-only; the current best for an (exercise, type) pair is the
/// maximum `record_value` across its entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecordEntry {
    /// Entry identifier
    pub id: Uuid,
    /// Record holder
    pub user_id: Uuid,
    /// Exercise the record was set on
    pub exercise_id: Uuid,
    /// Which metric improved
    pub record_type: RecordType,
    /// New best value
    pub record_value: f64,
    /// Sets of the record-setting entry
    pub sets: u32,
    /// Reps of the record-setting entry
    pub reps: u32,
    /// Weight of the record-setting entry
    pub weight: f64,
    /// Workout that produced the record
    pub workout_id: Uuid,
    /// Best value before this entry, zero for a first record
    pub previous_record: f64,
    /// When the record was set
    pub achieved_at: DateTime<Utc>,
}

impl PersonalRecordEntry {
    /// Improvement over the previous best
    #[must_use]
    pub fn improvement(&self) -> f64 {
        self.record_value - self.previous_record
    }
}

/// Optional filters for listing personal records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersonalRecordFilter {
    /// Restrict to one exercise
    pub exercise_id: Option<Uuid>,
    /// Restrict to one record type
    pub record_type: Option<RecordType>,
}

/// A log entry joined with its catalog exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecordView {
    /// Log entry
    #[serde(flatten)]
    pub entry: PersonalRecordEntry,
    /// Exercise name, `"Unknown"` if the exercise left the catalog
    pub exercise_name: String,
    /// Muscle group, `"Unknown"` if the exercise left the catalog
    pub muscle_group: String,
}

/// Latest personal records per exercise, grouped by muscle group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecordSummary {
    /// Muscle group name to the latest records of its exercises
    pub by_muscle_group: BTreeMap<String, Vec<PersonalRecordView>>,
    /// Number of distinct exercises with at least one record
    pub total_exercises_with_prs: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_values() {
        assert!((RecordType::MaxWeight.candidate_value(3, 10, 60.0) - 60.0).abs() < f64::EPSILON);
        assert!(
            (RecordType::MaxVolume.candidate_value(3, 10, 60.0) - 1800.0).abs() < f64::EPSILON
        );
        assert!((RecordType::MaxReps.candidate_value(3, 10, 60.0) - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_type_round_trips_through_str() {
        for record_type in RecordType::CHECK_ORDER {
            assert_eq!(record_type.as_str().parse::<RecordType>().unwrap(), record_type);
        }
        assert!("max_speed".parse::<RecordType>().is_err());
    }
}
