// ABOUTME: Challenge models: time-boxed targets, participations and their progress history
// ABOUTME: Progress history is an append-only log owned by the participation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::fmt;
use std::slice;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

// ============================================================================
// Enumerations
// ============================================================================

/// Metric a challenge measures
///
/// Unrecognized stored categories deserialize to [`ChallengeCategory::Other`]
/// and always measure zero progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeCategory {
    /// Number of workouts in the window
    WorkoutCount,
    /// Volume lifted in the window
    Volume,
    /// Distinct training days in the window
    Consistency,
    /// Category this engine does not measure
    #[serde(other)]
    Other,
}

impl ChallengeCategory {
    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WorkoutCount => "workout_count",
            Self::Volume => "volume",
            Self::Consistency => "consistency",
            Self::Other => "other",
        }
    }

    /// Lenient parse used when reading stored rows
    #[must_use]
    pub fn from_stored(s: &str) -> Self {
        s.parse().unwrap_or(Self::Other)
    }
}

impl fmt::Display for ChallengeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workout_count" => Ok(Self::WorkoutCount),
            "volume" => Ok(Self::Volume),
            "consistency" => Ok(Self::Consistency),
            other => Err(AppError::invalid_input(format!(
                "Unknown challenge category: {other}"
            ))),
        }
    }
}

/// Cadence or audience of a challenge
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    /// One-day challenge
    Daily,
    /// One-week challenge
    Weekly,
    /// One-month challenge
    Monthly,
    /// Open community event
    Community,
    /// Invite-only challenge between friends
    FriendBattle,
}

impl ChallengeType {
    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Community => "community",
            Self::FriendBattle => "friend_battle",
        }
    }
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "community" => Ok(Self::Community),
            "friend_battle" => Ok(Self::FriendBattle),
            other => Err(AppError::invalid_input(format!(
                "Unknown challenge type: {other}"
            ))),
        }
    }
}

/// Difficulty label shown to users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Easy
    Easy,
    /// Medium
    #[default]
    Medium,
    /// Hard
    Hard,
    /// Extreme
    Extreme,
}

impl Difficulty {
    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "extreme" => Ok(Self::Extreme),
            other => Err(AppError::invalid_input(format!(
                "Unknown difficulty: {other}"
            ))),
        }
    }
}

/// Filter for listing a user's participations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationStatus {
    /// Joined and not yet completed
    #[default]
    Active,
    /// Completed
    Completed,
    /// Everything
    All,
}

impl FromStr for ParticipationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "all" => Ok(Self::All),
            other => Err(AppError::invalid_input(format!(
                "Invalid participation status: {other}"
            ))),
        }
    }
}

// ============================================================================
// Challenge definition
// ============================================================================

/// A time-boxed numeric target users can join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDefinition {
    /// Challenge identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// What participants have to do
    pub description: String,
    /// Cadence or audience
    pub challenge_type: ChallengeType,
    /// Measured metric
    pub category: ChallengeCategory,
    /// Progress needed to complete
    pub target_value: u64,
    /// Unit label for the target (e.g. "workouts")
    pub target_unit: Option<String>,
    /// Points granted on completion
    pub points_reward: u32,
    /// Difficulty label
    pub difficulty: Difficulty,
    /// First instant of the window
    pub start_date: DateTime<Utc>,
    /// Last instant of the window
    pub end_date: DateTime<Utc>,
    /// Inactive challenges cannot be joined or progressed
    pub is_active: bool,
    /// Global challenges are listed publicly
    pub is_global: bool,
    /// Optional participant cap
    pub max_participants: Option<u32>,
    /// Creator of a friend-only challenge
    pub creator_id: Option<Uuid>,
    /// Users invited to a friend-only challenge
    pub invited_user_ids: Vec<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ChallengeDefinition {
    /// Whether the challenge restricts who may join
    #[must_use]
    pub fn is_friend_only(&self) -> bool {
        self.challenge_type == ChallengeType::FriendBattle || self.creator_id.is_some()
    }

    /// Whether `user_id` is the creator or on the invite list
    #[must_use]
    pub fn is_invited(&self, user_id: Uuid) -> bool {
        self.creator_id == Some(user_id) || self.invited_user_ids.contains(&user_id)
    }

    /// Whether `instant` lies inside the window (both ends inclusive)
    #[must_use]
    pub fn window_contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant <= self.end_date
    }

    /// Active and inside its window at `now`
    #[must_use]
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.window_contains(now)
    }

    /// Whole days left until the window closes, zero once it has
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> u32 {
        u32::try_from((self.end_date - now).num_days().max(0)).unwrap_or(u32::MAX)
    }

    /// Progress as a fraction of the target, clamped to 0..=1
    #[must_use]
    pub fn progress_fraction(&self, progress: u64) -> f64 {
        if self.target_value == 0 {
            return 0.0;
        }
        (progress as f64 / self.target_value as f64).min(1.0)
    }
}

/// Filters for listing joinable challenges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeQuery {
    /// Restrict to one challenge type; friend battles are only listed when asked for
    pub challenge_type: Option<ChallengeType>,
    /// Restrict to one category
    pub category: Option<ChallengeCategory>,
    /// Only challenges that are active and inside their window
    pub active_only: bool,
}

impl Default for ChallengeQuery {
    fn default() -> Self {
        Self {
            challenge_type: None,
            category: None,
            active_only: true,
        }
    }
}

// ============================================================================
// Participation and progress history
// ============================================================================

/// One recorded progress change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressHistoryEntry {
    /// When the change was observed
    pub recorded_at: DateTime<Utc>,
    /// Progress after the change
    pub progress: u64,
    /// Signed change from the previous progress
    pub delta: i64,
}

/// Append-only progress log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressHistory(Vec<ProgressHistoryEntry>);

impl ProgressHistory {
    /// Rebuild a log from stored entries
    #[must_use]
    pub const fn from_entries(entries: Vec<ProgressHistoryEntry>) -> Self {
        Self(entries)
    }

    /// Append an entry
    pub fn append(&mut self, entry: ProgressHistoryEntry) {
        self.0.push(entry);
    }

    /// Entries oldest first
    pub fn iter(&self) -> slice::Iter<'_, ProgressHistoryEntry> {
        self.0.iter()
    }

    /// Most recent entry
    #[must_use]
    pub fn latest(&self) -> Option<&ProgressHistoryEntry> {
        self.0.last()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ProgressHistory {
    type Item = &'a ProgressHistoryEntry;
    type IntoIter = slice::Iter<'a, ProgressHistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A user's membership in a challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChallengeParticipation {
    /// Participation identifier
    pub id: Uuid,
    /// Participant
    pub user_id: Uuid,
    /// Challenge joined
    pub challenge_id: Uuid,
    /// Last computed progress
    pub current_progress: u64,
    /// Set once progress reached the target; never cleared
    pub completed: bool,
    /// When the target was reached
    pub completed_at: Option<DateTime<Utc>>,
    /// When the user joined
    pub joined_at: DateTime<Utc>,
    /// Progress changes, oldest first
    pub progress_history: ProgressHistory,
}

impl UserChallengeParticipation {
    /// Create a fresh participation with zero progress
    #[must_use]
    pub fn new(user_id: Uuid, challenge_id: Uuid, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            challenge_id,
            current_progress: 0,
            completed: false,
            completed_at: None,
            joined_at,
            progress_history: ProgressHistory::default(),
        }
    }

    /// Record a recomputed progress value
    ///
    /// Appends a history entry when the value changed and returns whether it did.
    pub fn record_progress(&mut self, progress: u64, at: DateTime<Utc>) -> bool {
        if progress == self.current_progress {
            return false;
        }
        let delta = i64::try_from(progress)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(self.current_progress).unwrap_or(i64::MAX));
        self.progress_history.append(ProgressHistoryEntry {
            recorded_at: at,
            progress,
            delta,
        });
        self.current_progress = progress;
        true
    }

    /// Mark completed if `target` is reached; returns true on the transition only
    pub fn complete_if_reached(&mut self, target: u64, at: DateTime<Utc>) -> bool {
        if self.completed || self.current_progress < target {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(at);
        true
    }
}

/// A participation that just reached its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedChallenge {
    /// Challenge completed
    pub challenge: ChallengeDefinition,
    /// Participation after completion
    pub participation: UserChallengeParticipation,
    /// Progress value that completed the challenge
    pub final_progress: u64,
}

/// Challenge with participation counters, as listed to users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeListing {
    /// Challenge definition
    pub challenge: ChallengeDefinition,
    /// Number of participants
    pub participant_count: u32,
    /// Whether the participant cap is reached
    pub is_full: bool,
    /// Whole days until the window closes
    pub days_remaining: u32,
}

/// A participation paired with its challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationView {
    /// Challenge definition
    pub challenge: ChallengeDefinition,
    /// The user's participation
    pub participation: UserChallengeParticipation,
    /// Progress as a fraction of the target, clamped to 0..=1
    pub progress_fraction: f64,
    /// Position on the challenge leaderboard
    pub user_rank: Option<u32>,
    /// Whether the user created the challenge
    pub is_creator: bool,
    /// Whole days until the window closes
    pub days_remaining: u32,
}

/// A user's challenges with counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserChallengesOverview {
    /// Participations matching the requested status
    pub challenges: Vec<ParticipationView>,
    /// Number of listed participations
    pub total: u32,
    /// Listed participations not completed and with days remaining
    pub active: u32,
    /// Listed participations completed
    pub completed: u32,
}

/// A friend battle from the point of view of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendBattleView {
    /// Challenge definition
    pub challenge: ChallengeDefinition,
    /// Whether the user created the battle
    pub is_creator: bool,
    /// Whether the user has joined
    pub has_joined: bool,
    /// The user's progress, zero if not joined
    pub current_progress: u64,
    /// Whole days until the window closes
    pub days_remaining: u32,
    /// Standings of every participant
    pub leaderboard: Vec<ChallengeLeaderboardEntry>,
}

/// One row of a challenge leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeLeaderboardEntry {
    /// 1-based position
    pub rank: u32,
    /// Participant
    pub user_id: Uuid,
    /// Progress
    pub current_progress: u64,
    /// Completion flag
    pub completed: bool,
    /// Completion time
    pub completed_at: Option<DateTime<Utc>>,
    /// When the participant joined
    pub joined_at: DateTime<Utc>,
}

/// Input for creating a friend battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendBattleRequest {
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Measured metric
    pub category: ChallengeCategory,
    /// Progress needed to win
    pub target_value: u64,
    /// Unit label
    pub target_unit: Option<String>,
    /// Friends to invite
    pub friend_ids: Vec<Uuid>,
    /// Window length in days
    pub duration_days: Option<u32>,
    /// Completion reward
    pub points_reward: Option<u32>,
    /// Difficulty label
    pub difficulty: Option<Difficulty>,
}
