// ABOUTME: Re-exports helper modules for liftoff-cli
// ABOUTME: Provides output formatting utilities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

pub mod display;
