// ABOUTME: Core types and constants for the Liftoff progression engine
// ABOUTME: Foundation crate with error handling, domain models, pagination, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

#![deny(unsafe_code)]

//! # Liftoff Core
//!
//! Foundation crate shared by the Liftoff server and CLI. It holds the types
//! every layer agrees on and is designed to change infrequently.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`
//! - **models**: Workouts, rankings, personal records, achievements, challenges, friendships
//! - **pagination**: Offset pagination for leaderboards
//! - **constants**: Scoring defaults and environment variable names

/// Unified error handling system with standard error codes and HTTP statuses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Offset pagination for ranked listings
pub mod pagination;

/// Core domain models
pub mod models;
