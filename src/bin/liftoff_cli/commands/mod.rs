// ABOUTME: Re-exports command modules for liftoff-cli
// ABOUTME: One module per top-level subcommand group
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

pub mod achievements;
pub mod challenges;
pub mod pipeline;
pub mod ranking;
pub mod records;
