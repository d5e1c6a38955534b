// ABOUTME: Friend request workflow on top of the friendship repository
// ABOUTME: Accepted friendships feed the friends leaderboard, social achievements and friend battles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftoff Fitness

use std::sync::Arc;

use liftoff_core::errors::{AppError, AppResult};
use liftoff_core::models::{FriendStatus, Friendship};
use tracing::info;
use uuid::Uuid;

use crate::database::ProgressionStore;

/// Sends and answers friend requests
#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn ProgressionStore>,
}

impl SocialService {
    /// Create the service
    #[must_use]
    pub fn new(store: Arc<dyn ProgressionStore>) -> Self {
        Self { store }
    }

    /// Create a pending friend request
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a request to oneself and `ResourceAlreadyExists`
    /// if the two users already have a friendship in either direction
    pub async fn send_request(&self, requester_id: Uuid, addressee_id: Uuid) -> AppResult<Friendship> {
        if requester_id == addressee_id {
            return Err(AppError::invalid_input("Cannot send friend request to yourself"));
        }
        if self
            .store
            .friendship_between(requester_id, addressee_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "Friend connection already exists between these users",
            ));
        }

        let friendship = Friendship::request(requester_id, addressee_id);
        self.store.insert_friendship(&friendship).await?;
        info!(user.id = %requester_id, friend.id = %addressee_id, "Friend request sent");
        Ok(friendship)
    }

    /// Accept or reject a pending request addressed to `user_id`
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if there is no request from `requester_id`
    /// - `PermissionDenied` if `user_id` is not the addressee
    /// - `ResourceAlreadyExists` if the request was already answered
    pub async fn respond(
        &self,
        user_id: Uuid,
        requester_id: Uuid,
        accept: bool,
    ) -> AppResult<FriendStatus> {
        let friendship = self
            .store
            .friendship_between(user_id, requester_id)
            .await?
            .ok_or_else(|| AppError::not_found("Friend request"))?;

        if friendship.addressee_id != user_id {
            return Err(AppError::permission_denied(
                "Only the addressee can answer a friend request",
            ));
        }
        if friendship.status != FriendStatus::Pending {
            return Err(AppError::conflict("Friend request already answered"));
        }

        let status = if accept {
            FriendStatus::Accepted
        } else {
            FriendStatus::Rejected
        };
        self.store
            .update_friendship_status(friendship.id, status)
            .await?;
        info!(user.id = %user_id, friend.id = %requester_id, status = %status, "Friend request answered");
        Ok(status)
    }

    /// Accepted friends of a user
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn friends(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        self.store.accepted_friend_ids(user_id).await
    }
}
