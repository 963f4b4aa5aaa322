// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use ulid::Ulid;

use super::{ServiceError, ServiceResult};
use crate::models::{Comment, NewCommentContent};
use crate::repository::{CommentRepository, PostRepository};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    pub async fn create(
        &self,
        user_id: &str,
        post_id: &str,
        content: NewCommentContent,
    ) -> ServiceResult<Comment> {
        if content.text.trim().is_empty() {
            return Err(ServiceError::Validation(
                "comment text must not be empty".to_string(),
            ));
        }
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("post {}", post_id)));
        }

        let comment = Comment {
            id: Ulid::new().to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            text: content.text,
            created_at: Utc::now(),
        };
        self.comments.create(&comment).await?;

        info!("User {} commented on post {}", user_id, post_id);
        Ok(comment)
    }

    /// Comments on a post in the order they were written
    pub async fn list(&self, post_id: &str) -> ServiceResult<Vec<Comment>> {
        Ok(self.comments.find_by_post(post_id).await?)
    }
}
