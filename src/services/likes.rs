// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use ulid::Ulid;

use super::{ServiceError, ServiceResult};
use crate::models::{Like, LikeToggle};
use crate::repository::{LikeRepository, PostRepository};

const MAX_TOGGLE_ATTEMPTS: usize = 3;

pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
    posts: Arc<dyn PostRepository>,
}

impl LikeService {
    pub fn new(likes: Arc<dyn LikeRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { likes, posts }
    }

    /// Flip the like state of (`user_id`, `post_id`)
    pub async fn toggle(&self, user_id: &str, post_id: &str) -> ServiceResult<LikeToggle> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("post {}", post_id)));
        }

        for attempt in 1..=MAX_TOGGLE_ATTEMPTS {
            if self.likes.delete_by_user_and_post(user_id, post_id).await? {
                info!("User {} unliked post {}", user_id, post_id);
                return Ok(LikeToggle::Removed);
            }

            let like = Like {
                id: Ulid::new().to_string(),
                user_id: user_id.to_string(),
                post_id: post_id.to_string(),
                created_at: Utc::now(),
            };
            if self.likes.insert_if_absent(&like).await? {
                info!("User {} liked post {}", user_id, post_id);
                return Ok(LikeToggle::Created(like));
            }

            // A concurrent request inserted the like between our two writes
            debug!(
                "Like toggle for user {} on post {} raced (attempt {})",
                user_id, post_id, attempt
            );
        }

        Err(ServiceError::Conflict(
            "like state changed concurrently, try again".to_string(),
        ))
    }
}
