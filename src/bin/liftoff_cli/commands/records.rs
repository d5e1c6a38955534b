// ABOUTME: Personal record commands for liftoff-cli
// ABOUTME: Filtered record log and per-muscle-group summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use anyhow::Result;
use liftoff_server::models::{PersonalRecordFilter, RecordType};
use liftoff_server::services::ProgressionService;
use uuid::Uuid;

use crate::helpers::display::print_json;

/// Record log, newest first
pub async fn list(
    service: &ProgressionService,
    user_id: Uuid,
    exercise_id: Option<Uuid>,
    record_type: Option<RecordType>,
) -> Result<()> {
    let filter = PersonalRecordFilter {
        exercise_id,
        record_type,
    };
    let records = service.records().personal_records(user_id, filter).await?;
    print_json(&records)
}

/// Latest records grouped by muscle group
pub async fn summary(service: &ProgressionService, user_id: Uuid) -> Result<()> {
    let summary = service.records().personal_record_summary(user_id).await?;
    print_json(&summary)
}
