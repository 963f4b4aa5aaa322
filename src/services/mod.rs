// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Domain operations on top of the repositories: validation, identifier and
//! timestamp assignment, ownership checks.

pub mod comments;
pub mod follows;
pub mod likes;
pub mod posts;
pub mod summary;
pub mod users;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::auth::AuthError;
use crate::genai::{GeneratorError, TextGenerator};
use crate::repository::{RepoError, Repositories};

pub use comments::CommentService;
pub use follows::FollowService;
pub use likes::LikeService;
pub use posts::PostService;
pub use summary::{SummaryService, UserSummary};
pub use users::UserService;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Why a domain operation failed
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("cannot follow yourself")]
    SelfFollow,

    #[error("upstream service timed out")]
    Timeout,

    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => ServiceError::NotFound(what),
            RepoError::MissingReference(entity) => ServiceError::NotFound(entity.to_string()),
            RepoError::Conflict(constraint) => {
                debug!("Write rejected by {}", constraint);
                ServiceError::Conflict("resource already exists".to_string())
            }
            RepoError::Constraint(detail) => {
                warn!("Write violated a data constraint: {}", detail);
                ServiceError::Validation("request violates a data constraint".to_string())
            }
            other => {
                error!("Repository failure: {}", other);
                ServiceError::Internal(other.to_string())
            }
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::SigningKeys(_) => ServiceError::Internal(err.to_string()),
            other => ServiceError::Unauthenticated(other.to_string()),
        }
    }
}

impl From<GeneratorError> for ServiceError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::Timeout => ServiceError::Timeout,
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

/// All domain services, built once at startup
pub struct Services {
    pub users: UserService,
    pub posts: PostService,
    pub comments: CommentService,
    pub likes: LikeService,
    pub follows: FollowService,
    pub summaries: SummaryService,
}

impl Services {
    pub fn new(repos: &Repositories, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            users: UserService::new(repos.users.clone()),
            posts: PostService::new(repos.posts.clone(), repos.follows.clone()),
            comments: CommentService::new(repos.comments.clone(), repos.posts.clone()),
            likes: LikeService::new(repos.likes.clone(), repos.posts.clone()),
            follows: FollowService::new(repos.follows.clone(), repos.users.clone()),
            summaries: SummaryService::new(repos.posts.clone(), repos.users.clone(), generator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_detail_never_reaches_the_message() {
        let detail = "insert or update on table \"comments\" violates foreign key constraint \"comments_post_id_fkey\"";

        let err = ServiceError::from(RepoError::Constraint(detail.to_string()));
        assert!(matches!(&err, ServiceError::Validation(msg) if !msg.contains("comments")));

        let err = ServiceError::from(RepoError::Conflict("likes_user_post_unique".to_string()));
        assert!(matches!(&err, ServiceError::Conflict(msg) if !msg.contains("likes")));
    }

    #[test]
    fn dangling_reference_is_not_found() {
        let err = ServiceError::from(RepoError::MissingReference("post"));
        assert_eq!(err.to_string(), "post not found");
    }

    #[test]
    fn signing_key_outage_is_internal() {
        let err = ServiceError::from(AuthError::SigningKeys("connection refused".to_string()));
        assert!(matches!(err, ServiceError::Internal(_)));

        let err = ServiceError::from(AuthError::InvalidToken("expired".to_string()));
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::genai::{GeneratorError, TextGenerator};
    use crate::models::User;
    use crate::repository::Repositories;

    /// Returns a fixed reply and counts calls
    pub struct CannedGenerator {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedGenerator {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    pub fn user(user_id: &str, name: &str) -> User {
        User {
            user_id: user_id.to_string(),
            firebase_uid: format!("fb-{}", user_id),
            name: name.to_string(),
            bio: None,
            icon_url: None,
            created_at: Utc::now(),
        }
    }

    /// In-memory repositories pre-populated with `users`
    pub async fn seeded(users: &[(&str, &str)]) -> Repositories {
        let repos = Repositories::in_memory();
        for (id, name) in users {
            repos.users.create(&user(id, name)).await.unwrap();
        }
        repos
    }
}
