// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Persistence access layer.
//!
//! One trait per entity. [`PgStore`] is the PostgreSQL implementation used in
//! production and [`MemoryStore`] keeps everything in process for tests and
//! local runs. Both enforce the same uniqueness rules: one like per
//! (user, post), one follow edge per ordered pair, no self-follow.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use tracing::debug;

use crate::db::Database;
use crate::models::{Comment, Follow, Like, Post, PostView, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    /// Zero rows were affected by a delete
    #[error("{0} not found")]
    NotFound(String),

    /// A uniqueness rule rejected the write
    #[error("duplicate {0}")]
    Conflict(String),

    /// A foreign key points at a row that does not exist. Carries the kind
    /// of the referenced entity (`post` or `user`).
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),

    /// Missing required field or failed check
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("query failed: {0}")]
    Query(DieselError),
}

impl From<DieselError> for RepoError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepoError::Conflict(info.constraint_name().unwrap_or("row").to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                debug!("Foreign key violation: {}", info.message());
                RepoError::MissingReference(referenced_entity(info.constraint_name()))
            }
            DieselError::DatabaseError(
                DatabaseErrorKind::NotNullViolation | DatabaseErrorKind::CheckViolation,
                info,
            ) => RepoError::Constraint(info.message().to_string()),
            other => RepoError::Query(other),
        }
    }
}

/// Map a foreign key constraint name such as `comments_post_id_fkey` to the
/// entity it references
fn referenced_entity(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(name) if name.contains("post_id") => "post",
        _ => "user",
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> RepoResult<Option<User>>;

    async fn find_by_firebase_uid(&self, firebase_uid: &str) -> RepoResult<Option<User>>;

    /// Substring match on name, newest users first
    async fn search_by_name(&self, query: &str) -> RepoResult<Vec<User>>;

    async fn create(&self, user: &User) -> RepoResult<()>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<PostView>>;

    /// Every post, newest first
    async fn find_all(&self) -> RepoResult<Vec<PostView>>;

    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<PostView>>;

    /// Posts authored by any of `user_ids`, newest first
    async fn find_by_users(&self, user_ids: &[String]) -> RepoResult<Vec<PostView>>;

    async fn create(&self, post: &Post) -> RepoResult<()>;

    async fn delete(&self, id: &str) -> RepoResult<()>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> RepoResult<()>;

    /// Comments on a post, oldest first
    async fn find_by_post(&self, post_id: &str) -> RepoResult<Vec<Comment>>;
}

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Insert unless the (user, post) pair already has a like. Returns whether a
    /// row was written.
    async fn insert_if_absent(&self, like: &Like) -> RepoResult<bool>;

    /// Remove the like for (user, post) if present. Returns whether a row was
    /// removed.
    async fn delete_by_user_and_post(&self, user_id: &str, post_id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert unless the edge already exists. Returns whether a row was written.
    async fn insert_if_absent(&self, follow: &Follow) -> RepoResult<bool>;

    /// Remove the edge if present. Returns whether a row was removed.
    async fn delete_edge(&self, follower_id: &str, followed_id: &str) -> RepoResult<bool>;

    async fn exists(&self, follower_id: &str, followed_id: &str) -> RepoResult<bool>;

    /// Edges pointing at `user_id`
    async fn followers_of(&self, user_id: &str) -> RepoResult<Vec<Follow>>;

    /// Edges starting at `user_id`
    async fn following_of(&self, user_id: &str) -> RepoResult<Vec<Follow>>;
}

/// Repository handles shared by the service layer
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    /// Wire every repository to the PostgreSQL store
    pub fn postgres(db: Arc<Database>) -> Self {
        Self::from_store(Arc::new(PgStore::new(db)))
    }

    /// Wire every repository to a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + PostRepository
            + CommentRepository
            + LikeRepository
            + FollowRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            likes: store.clone(),
            follows: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_names_map_to_referenced_entity() {
        assert_eq!(referenced_entity(Some("comments_post_id_fkey")), "post");
        assert_eq!(referenced_entity(Some("likes_post_id_fkey")), "post");
        assert_eq!(referenced_entity(Some("follows_followed_id_fkey")), "user");
        assert_eq!(referenced_entity(Some("comments_user_id_fkey")), "user");
        assert_eq!(referenced_entity(None), "user");
    }
}
