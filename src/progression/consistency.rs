// ABOUTME: Consistency score (0-100) from the distribution of workout dates in a trailing window
// ABOUTME: Rewards both density of training days and regular gaps between them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use liftoff_core::constants::scoring::MAX_CONSISTENCY_SCORE;
use liftoff_core::errors::AppResult;
use liftoff_core::models::WorkoutRecord;
use tracing::debug;
use uuid::Uuid;

use crate::config::ConsistencyConfig;
use crate::database::ProgressionStore;

/// Sorted distinct calendar dates of the given workouts
#[must_use]
pub fn distinct_dates(workouts: &[WorkoutRecord]) -> Vec<NaiveDate> {
    workouts
        .iter()
        .map(WorkoutRecord::date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Score sorted, distinct workout dates
///
/// Fewer than two dates score `single_day_points` per date. Otherwise the score
/// is `min(frequency * frequency_weight, frequency_weight)` plus
/// `regularity_weight - variance` of the day gaps when the variance is within
/// `regularity_weight`, rounded and capped at 100.
#[must_use]
pub fn consistency_score(dates: &[NaiveDate], config: &ConsistencyConfig) -> u32 {
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return 0;
    };
    if dates.len() < 2 {
        let points = u32::try_from(dates.len()).unwrap_or(u32::MAX) * config.single_day_points;
        return points.min(MAX_CONSISTENCY_SCORE);
    }

    let total_days = ((*last - *first).num_days() + 1) as f64;
    let frequency = dates.len() as f64 / total_days;

    let gaps: Vec<f64> = dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days() as f64)
        .collect();
    let avg_gap = gaps.iter().sum::<f64>() / gaps.len() as f64;
    let variance = gaps.iter().map(|g| (g - avg_gap).powi(2)).sum::<f64>() / gaps.len() as f64;

    let frequency_score = (frequency * config.frequency_weight).min(config.frequency_weight);
    let regularity_score = if variance <= config.regularity_weight {
        (config.regularity_weight - variance).max(0.0)
    } else {
        0.0
    };

    let score = (frequency_score + regularity_score).round();
    (score.max(0.0) as u32).min(MAX_CONSISTENCY_SCORE)
}

/// Computes a user's consistency score over the configured trailing window
#[derive(Clone)]
pub struct ConsistencyScorer {
    store: Arc<dyn ProgressionStore>,
    config: ConsistencyConfig,
}

impl ConsistencyScorer {
    /// Create a scorer
    #[must_use]
    pub fn new(store: Arc<dyn ProgressionStore>, config: ConsistencyConfig) -> Self {
        Self { store, config }
    }

    /// Start of the trailing window ending at `now`
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.config.window_days))
    }

    /// Consistency score for a user as of `now`
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn score(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u32> {
        let workouts = self
            .store
            .workouts_for(user_id, Some(self.window_start(now)), None)
            .await?;
        let dates = distinct_dates(&workouts);
        let score = consistency_score(&dates, &self.config);
        debug!(user.id = %user_id, days = dates.len(), score, "Computed consistency score");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap() + Duration::days(n)
    }

    fn score(days: &[i64]) -> u32 {
        let dates: Vec<_> = days.iter().map(|d| day(*d)).collect();
        consistency_score(&dates, &ConsistencyConfig::default())
    }

    #[test]
    fn test_empty_and_single_date() {
        assert_eq!(score(&[]), 0);
        assert_eq!(score(&[0]), 10);
    }

    #[test]
    fn test_daily_training_is_perfect() {
        assert_eq!(score(&[0, 1, 2, 3, 4]), 100);
    }

    #[test]
    fn test_every_other_day() {
        // frequency 3/5 -> 36, zero variance -> 40
        assert_eq!(score(&[0, 2, 4]), 76);
    }

    #[test]
    fn test_erratic_gaps_score_lower_than_regular() {
        let regular = score(&[0, 3, 6, 9]);
        let erratic = score(&[0, 1, 8, 9]);
        assert!(regular > erratic, "{regular} should beat {erratic}");
    }

    #[test]
    fn test_high_variance_drops_regularity() {
        // gaps 1 and 20: mean 10.5, variance 90.25
        let s = score(&[0, 1, 21]);
        // frequency 3/22 * 60 = 8.18
        assert_eq!(s, 8);
    }

    #[test]
    fn test_score_bounded() {
        let dates: Vec<i64> = (0..90).collect();
        assert!(score(&dates) <= 100);
    }
}
