// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Follow graph operations.
//!
//! Edges are directed (`follower_id` -> `followed_id`). A user can never follow
//! themselves and an ordered pair has at most one edge; both rules are also
//! enforced by the store, so the checks here only produce friendlier errors.

use std::sync::Arc;

use chrono::Utc;
use futures::future::{join_all, try_join};
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::AuthUser;
use crate::models::{Follow, FollowCounts, User};
use crate::repository::{FollowRepository, UserRepository};

pub struct FollowService {
    follows: Arc<dyn FollowRepository>,
    users: Arc<dyn UserRepository>,
}

impl FollowService {
    pub fn new(follows: Arc<dyn FollowRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { follows, users }
    }

    pub async fn follow(&self, follower_id: &str, target_id: &str) -> ServiceResult<Follow> {
        if follower_id == target_id {
            return Err(ServiceError::SelfFollow);
        }
        if self.users.find_by_id(target_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("user {}", target_id)));
        }
        if self.follows.exists(follower_id, target_id).await? {
            return Err(ServiceError::Conflict("already following".to_string()));
        }

        let edge = Follow {
            id: Uuid::new_v4(),
            follower_id: follower_id.to_string(),
            followed_id: target_id.to_string(),
            created_at: Utc::now(),
        };
        if !self.follows.insert_if_absent(&edge).await? {
            return Err(ServiceError::Conflict("already following".to_string()));
        }

        info!("User {} followed {}", follower_id, target_id);
        Ok(edge)
    }

    pub async fn unfollow(&self, follower_id: &str, target_id: &str) -> ServiceResult<()> {
        if !self.follows.delete_edge(follower_id, target_id).await? {
            return Err(ServiceError::NotFound("follow relationship".to_string()));
        }

        info!("User {} unfollowed {}", follower_id, target_id);
        Ok(())
    }

    /// Whether the viewer follows `target_id`; an anonymous or unregistered
    /// viewer follows nobody.
    pub async fn is_following(
        &self,
        viewer: Option<&AuthUser>,
        target_id: &str,
    ) -> ServiceResult<bool> {
        let Some(viewer) = viewer else {
            return Ok(false);
        };
        let Some(user) = self.users.find_by_firebase_uid(&viewer.firebase_uid).await? else {
            return Ok(false);
        };

        Ok(self.follows.exists(&user.user_id, target_id).await?)
    }

    /// Users following `user_id`
    pub async fn followers(&self, user_id: &str) -> ServiceResult<Vec<User>> {
        let edges = self.follows.followers_of(user_id).await?;
        let ids = edges.into_iter().map(|e| e.follower_id).collect();
        Ok(self.load_users(ids).await)
    }

    /// Users that `user_id` follows
    pub async fn following(&self, user_id: &str) -> ServiceResult<Vec<User>> {
        let edges = self.follows.following_of(user_id).await?;
        let ids = edges.into_iter().map(|e| e.followed_id).collect();
        Ok(self.load_users(ids).await)
    }

    pub async fn follow_counts(&self, user_id: &str) -> ServiceResult<FollowCounts> {
        let (following, followers) = try_join(
            self.follows.following_of(user_id),
            self.follows.followers_of(user_id),
        )
        .await?;

        Ok(FollowCounts {
            following_count: following.len(),
            followers_count: followers.len(),
        })
    }

    // Lookups that fail or come back empty are skipped
    async fn load_users(&self, user_ids: Vec<String>) -> Vec<User> {
        let lookups = user_ids.iter().map(|id| self.users.find_by_id(id));
        let results = join_all(lookups).await;

        user_ids
            .iter()
            .zip(results)
            .filter_map(|(id, result)| match result {
                Ok(Some(user)) => Some(user),
                Ok(None) => {
                    warn!("Skipping user {}: profile not found", id);
                    None
                }
                Err(e) => {
                    warn!("Skipping user {}: lookup failed: {}", id, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{RepoError, RepoResult, Repositories};
    use crate::services::testing::seeded;
    use async_trait::async_trait;
    use tracing_test::traced_test;

    async fn setup() -> (FollowService, Repositories) {
        let repos = seeded(&[("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")]).await;
        (
            FollowService::new(repos.follows.clone(), repos.users.clone()),
            repos,
        )
    }

    fn viewer(uid: &str) -> AuthUser {
        AuthUser {
            firebase_uid: uid.to_string(),
        }
    }

    #[tokio::test]
    async fn follow_round_trip() {
        let (follows, _) = setup().await;

        follows.follow("alice", "bob").await.unwrap();
        assert!(follows.is_following(Some(&viewer("fb-alice")), "bob").await.unwrap());
        assert!(!follows.is_following(Some(&viewer("fb-bob")), "alice").await.unwrap());

        follows.unfollow("alice", "bob").await.unwrap();
        assert!(!follows.is_following(Some(&viewer("fb-alice")), "bob").await.unwrap());
    }

    #[tokio::test]
    async fn self_follow_is_rejected_before_lookups() {
        let (follows, _) = setup().await;
        assert!(matches!(
            follows.follow("ghost", "ghost").await,
            Err(ServiceError::SelfFollow)
        ));
    }

    #[tokio::test]
    async fn duplicate_follow_conflicts() {
        let (follows, _) = setup().await;
        follows.follow("alice", "bob").await.unwrap();
        assert!(matches!(
            follows.follow("alice", "bob").await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn follow_unknown_target_and_unfollow_without_edge() {
        let (follows, _) = setup().await;
        assert!(matches!(
            follows.follow("alice", "nobody").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            follows.unfollow("alice", "bob").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unresolved_viewer_follows_nobody() {
        let (follows, _) = setup().await;
        follows.follow("alice", "bob").await.unwrap();
        assert!(!follows.is_following(None, "bob").await.unwrap());
        assert!(!follows
            .is_following(Some(&viewer("fb-unregistered")), "bob")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn counts_agree_with_lists() {
        let (follows, _) = setup().await;
        follows.follow("alice", "bob").await.unwrap();
        follows.follow("carol", "bob").await.unwrap();
        follows.follow("bob", "alice").await.unwrap();

        for id in ["alice", "bob", "carol"] {
            let counts = follows.follow_counts(id).await.unwrap();
            assert_eq!(counts.followers_count, follows.followers(id).await.unwrap().len());
            assert_eq!(counts.following_count, follows.following(id).await.unwrap().len());
        }

        let bob = follows.follow_counts("bob").await.unwrap();
        assert_eq!((bob.following_count, bob.followers_count), (1, 2));
    }

    /// Delegates to a real store but fails lookups for one id
    struct FailingLookup {
        inner: Arc<dyn UserRepository>,
        broken_id: &'static str,
    }

    #[async_trait]
    impl UserRepository for FailingLookup {
        async fn find_by_id(&self, user_id: &str) -> RepoResult<Option<User>> {
            if user_id == self.broken_id {
                return Err(RepoError::Pool("connection reset".to_string()));
            }
            self.inner.find_by_id(user_id).await
        }

        async fn find_by_firebase_uid(&self, firebase_uid: &str) -> RepoResult<Option<User>> {
            self.inner.find_by_firebase_uid(firebase_uid).await
        }

        async fn search_by_name(&self, query: &str) -> RepoResult<Vec<User>> {
            self.inner.search_by_name(query).await
        }

        async fn create(&self, user: &User) -> RepoResult<()> {
            self.inner.create(user).await
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_user_lookups_are_skipped_with_warning() {
        let (follows, repos) = setup().await;
        follows.follow("alice", "bob").await.unwrap();
        follows.follow("carol", "bob").await.unwrap();

        let flaky = FollowService::new(
            repos.follows.clone(),
            Arc::new(FailingLookup {
                inner: repos.users.clone(),
                broken_id: "carol",
            }),
        );

        let followers = flaky.followers("bob").await.unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].user_id, "alice");
        assert!(logs_contain("Skipping user carol"));
    }
}
