// ABOUTME: Friendship models used by social achievements and friend battles
// ABOUTME: Friendships are directional requests that become mutual once accepted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Friend connection status
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendStatus {
    /// Request sent, awaiting response
    Pending,
    /// Both users are friends
    Accepted,
    /// Request was declined
    Rejected,
}

impl FriendStatus {
    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(AppError::invalid_input(format!(
                "Invalid friend status: {other}"
            ))),
        }
    }
}

/// Friend connection between two users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    /// Connection identifier
    pub id: Uuid,
    /// User who sent the request
    pub requester_id: Uuid,
    /// User who received the request
    pub addressee_id: Uuid,
    /// Current status
    pub status: FriendStatus,
    /// When the request was sent
    pub created_at: DateTime<Utc>,
    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Create a pending request
    #[must_use]
    pub fn request(requester_id: Uuid, addressee_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            requester_id,
            addressee_id,
            status: FriendStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an accepted friendship
    #[must_use]
    pub fn accepted(requester_id: Uuid, addressee_id: Uuid) -> Self {
        Self {
            status: FriendStatus::Accepted,
            ..Self::request(requester_id, addressee_id)
        }
    }

    /// The other side of the connection, if `user_id` is part of it
    #[must_use]
    pub fn other_user(&self, user_id: Uuid) -> Option<Uuid> {
        if self.requester_id == user_id {
            Some(self.addressee_id)
        } else if self.addressee_id == user_id {
            Some(self.requester_id)
        } else {
            None
        }
    }

    /// Whether the connection is accepted
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self.status, FriendStatus::Accepted)
    }
}
