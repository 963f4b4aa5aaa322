// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use ulid::Ulid;

use super::{ServiceError, ServiceResult};
use crate::models::{NewPostContent, Post, PostView};
use crate::repository::{FollowRepository, PostRepository};

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { posts, follows }
    }

    pub async fn create(&self, user_id: &str, content: NewPostContent) -> ServiceResult<Post> {
        if user_id.is_empty() {
            return Err(ServiceError::Validation("post requires an owner".to_string()));
        }

        let image = content.image.filter(|url| !url.trim().is_empty());
        if content.text.trim().is_empty() && image.is_none() {
            return Err(ServiceError::Validation(
                "post must have text or an image".to_string(),
            ));
        }

        let post = Post {
            id: Ulid::new().to_string(),
            user_id: user_id.to_string(),
            text: content.text,
            image,
            created_at: Utc::now(),
        };
        self.posts.create(&post).await?;

        info!("User {} created post {}", post.user_id, post.id);
        Ok(post)
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<PostView>> {
        Ok(self.posts.find_all().await?)
    }

    pub async fn list_by_user(&self, user_id: &str) -> ServiceResult<Vec<PostView>> {
        Ok(self.posts.find_by_user(user_id).await?)
    }

    /// Posts by everyone `user_id` follows, newest first
    pub async fn feed(&self, user_id: &str) -> ServiceResult<Vec<PostView>> {
        let followed: Vec<String> = self
            .follows
            .following_of(user_id)
            .await?
            .into_iter()
            .map(|edge| edge.followed_id)
            .collect();

        if followed.is_empty() {
            debug!("User {} follows nobody, feed is empty", user_id);
            return Ok(Vec::new());
        }

        Ok(self.posts.find_by_users(&followed).await?)
    }

    pub async fn get(&self, post_id: &str) -> ServiceResult<PostView> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("post {}", post_id)))
    }

    /// Delete a post owned by `requester_id`
    pub async fn delete(&self, requester_id: &str, post_id: &str) -> ServiceResult<()> {
        let post = self.get(post_id).await?;
        if post.user_id != requester_id {
            warn!(
                "User {} attempted to delete post {} owned by {}",
                requester_id, post_id, post.user_id
            );
            return Err(ServiceError::Forbidden(
                "only the author can delete this post".to_string(),
            ));
        }

        self.posts.delete(post_id).await?;
        info!("User {} deleted post {}", requester_id, post_id);
        Ok(())
    }
}
