// ABOUTME: Service layer coordinating the progression engines around workout mutations
// ABOUTME: Transport-agnostic so any HTTP, CLI or job runner can drive it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

//! Domain service layer
//!
//! The progression engines are pure computations over the store. Services
//! validate caller input, sequence the engines after a workout changes and
//! forward the resulting events to the optional realtime sync target.

/// Workout-change coordinator
pub mod progression;

/// Friend requests
pub mod social;

/// Workout create/update/delete with validation
pub mod workouts;

pub use progression::{ProgressionService, WorkoutChange, WorkoutChangeOutcome};
pub use social::SocialService;
pub use workouts::{ExerciseMapping, WorkoutMutation, WorkoutService};
