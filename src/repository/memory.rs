// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{
    CommentRepository, FollowRepository, LikeRepository, PostRepository, RepoError, RepoResult,
    UserRepository,
};
use crate::models::{Comment, Follow, Like, Post, PostView, User};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    posts: HashMap<String, Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    follows: Vec<Follow>,
}

impl Tables {
    fn view(&self, post: &Post) -> PostView {
        let author = self.users.get(&post.user_id);
        PostView {
            id: post.id.clone(),
            user_id: post.user_id.clone(),
            user_name: author.map(|u| u.name.clone()),
            icon_url: author.and_then(|u| u.icon_url.clone()),
            text: post.text.clone(),
            image: post.image.clone(),
            created_at: post.created_at,
            like_count: self.likes.iter().filter(|l| l.post_id == post.id).count() as i64,
            comment_count: self.comments.iter().filter(|c| c.post_id == post.id).count() as i64,
        }
    }

    fn views<'a>(&self, posts: impl Iterator<Item = &'a Post>) -> Vec<PostView> {
        let mut views: Vec<PostView> = posts.map(|p| self.view(p)).collect();
        views.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        views
    }

    fn require_user(&self, user_id: &str) -> RepoResult<()> {
        if self.users.contains_key(user_id) {
            Ok(())
        } else {
            Err(RepoError::MissingReference("user"))
        }
    }

    fn require_post(&self, post_id: &str) -> RepoResult<()> {
        if self.posts.contains_key(post_id) {
            Ok(())
        } else {
            Err(RepoError::MissingReference("post"))
        }
    }
}

/// In-process store with the same constraints as the PostgreSQL schema
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, user_id: &str) -> RepoResult<Option<User>> {
        Ok(self.tables.lock().users.get(user_id).cloned())
    }

    async fn find_by_firebase_uid(&self, firebase_uid: &str) -> RepoResult<Option<User>> {
        let tables = self.tables.lock();
        Ok(tables
            .users
            .values()
            .find(|u| u.firebase_uid == firebase_uid)
            .cloned())
    }

    async fn search_by_name(&self, query: &str) -> RepoResult<Vec<User>> {
        let tables = self.tables.lock();
        let mut found: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.name.contains(query))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        if tables.users.contains_key(&user.user_id) {
            return Err(RepoError::Conflict("users_pkey".to_string()));
        }
        if tables
            .users
            .values()
            .any(|u| u.firebase_uid == user.firebase_uid)
        {
            return Err(RepoError::Conflict("users_firebase_uid_key".to_string()));
        }
        tables.users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<PostView>> {
        let tables = self.tables.lock();
        Ok(tables.posts.get(id).map(|p| tables.view(p)))
    }

    async fn find_all(&self) -> RepoResult<Vec<PostView>> {
        let tables = self.tables.lock();
        Ok(tables.views(tables.posts.values()))
    }

    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<PostView>> {
        let tables = self.tables.lock();
        Ok(tables.views(tables.posts.values().filter(|p| p.user_id == user_id)))
    }

    async fn find_by_users(&self, user_ids: &[String]) -> RepoResult<Vec<PostView>> {
        let tables = self.tables.lock();
        Ok(tables.views(
            tables
                .posts
                .values()
                .filter(|p| user_ids.contains(&p.user_id)),
        ))
    }

    async fn create(&self, post: &Post) -> RepoResult<()> {
        if post.user_id.is_empty() {
            return Err(RepoError::Constraint("post has no owning user".to_string()));
        }
        let mut tables = self.tables.lock();
        tables.require_user(&post.user_id)?;
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Conflict("posts_pkey".to_string()));
        }
        tables.posts.insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        if tables.posts.remove(id).is_none() {
            return Err(RepoError::NotFound(format!("post {}", id)));
        }
        // ON DELETE CASCADE
        tables.comments.retain(|c| c.post_id != id);
        tables.likes.retain(|l| l.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        tables.require_post(&comment.post_id)?;
        tables.require_user(&comment.user_id)?;
        tables.comments.push(comment.clone());
        Ok(())
    }

    async fn find_by_post(&self, post_id: &str) -> RepoResult<Vec<Comment>> {
        let tables = self.tables.lock();
        let mut found: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn insert_if_absent(&self, like: &Like) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        tables.require_user(&like.user_id)?;
        tables.require_post(&like.post_id)?;
        if tables
            .likes
            .iter()
            .any(|l| l.user_id == like.user_id && l.post_id == like.post_id)
        {
            return Ok(false);
        }
        tables.likes.push(like.clone());
        Ok(true)
    }

    async fn delete_by_user_and_post(&self, user_id: &str, post_id: &str) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.user_id == user_id && l.post_id == post_id));
        Ok(tables.likes.len() < before)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn insert_if_absent(&self, follow: &Follow) -> RepoResult<bool> {
        if follow.follower_id == follow.followed_id {
            return Err(RepoError::Constraint("follows_no_self_follow".to_string()));
        }
        let mut tables = self.tables.lock();
        tables.require_user(&follow.follower_id)?;
        tables.require_user(&follow.followed_id)?;
        if tables
            .follows
            .iter()
            .any(|f| f.follower_id == follow.follower_id && f.followed_id == follow.followed_id)
        {
            return Ok(false);
        }
        tables.follows.push(follow.clone());
        Ok(true)
    }

    async fn delete_edge(&self, follower_id: &str, followed_id: &str) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.followed_id == followed_id));
        Ok(tables.follows.len() < before)
    }

    async fn exists(&self, follower_id: &str, followed_id: &str) -> RepoResult<bool> {
        let tables = self.tables.lock();
        Ok(tables
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.followed_id == followed_id))
    }

    async fn followers_of(&self, user_id: &str) -> RepoResult<Vec<Follow>> {
        let tables = self.tables.lock();
        let mut edges: Vec<Follow> = tables
            .follows
            .iter()
            .filter(|f| f.followed_id == user_id)
            .cloned()
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(edges)
    }

    async fn following_of(&self, user_id: &str) -> RepoResult<Vec<Follow>> {
        let tables = self.tables.lock();
        let mut edges: Vec<Follow> = tables
            .follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .cloned()
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn user(id: &str, name: &str) -> User {
        User {
            user_id: id.to_string(),
            firebase_uid: format!("fb-{}", id),
            name: name.to_string(),
            bio: None,
            icon_url: None,
            created_at: Utc::now(),
        }
    }

    fn post(id: &str, user_id: &str, minutes_ago: i64) -> Post {
        Post {
            id: id.to_string(),
            user_id: user_id.to_string(),
            text: format!("post {}", id),
            image: None,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn lookups_distinguish_missing_rows_from_errors() {
        let store = MemoryStore::new();
        assert!(UserRepository::find_by_id(&store, "nobody").await.unwrap().is_none());
        assert!(PostRepository::find_by_id(&store, "nothing").await.unwrap().is_none());
        assert!(PostRepository::find_all(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn post_listing_is_newest_first_with_counts() {
        let store = MemoryStore::new();
        UserRepository::create(&store, &user("u1", "alice")).await.unwrap();
        PostRepository::create(&store, &post("p-old", "u1", 10)).await.unwrap();
        PostRepository::create(&store, &post("p-new", "u1", 1)).await.unwrap();

        let like = Like {
            id: "l1".to_string(),
            user_id: "u1".to_string(),
            post_id: "p-old".to_string(),
            created_at: Utc::now(),
        };
        assert!(LikeRepository::insert_if_absent(&store, &like).await.unwrap());

        let all = PostRepository::find_all(&store).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p-new", "p-old"]);
        assert_eq!(all[1].like_count, 1);
        assert_eq!(all[1].user_name.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn post_without_owner_is_a_constraint_violation() {
        let store = MemoryStore::new();
        let err = PostRepository::create(&store, &post("p1", "", 0)).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn comment_on_deleted_post_is_a_missing_reference() {
        let store = MemoryStore::new();
        UserRepository::create(&store, &user("u1", "alice")).await.unwrap();
        PostRepository::create(&store, &post("p1", "u1", 0)).await.unwrap();
        PostRepository::delete(&store, "p1").await.unwrap();

        let comment = Comment {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            user_id: "u1".to_string(),
            text: "late".to_string(),
            created_at: Utc::now(),
        };
        let err = CommentRepository::create(&store, &comment).await.unwrap_err();
        assert!(matches!(err, RepoError::MissingReference("post")));
    }

    #[tokio::test]
    async fn deleting_missing_post_reports_not_found() {
        let store = MemoryStore::new();
        let err = PostRepository::delete(&store, "ghost").await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_like_is_not_inserted() {
        let store = MemoryStore::new();
        UserRepository::create(&store, &user("u1", "alice")).await.unwrap();
        PostRepository::create(&store, &post("p1", "u1", 0)).await.unwrap();

        let like = |id: &str| Like {
            id: id.to_string(),
            user_id: "u1".to_string(),
            post_id: "p1".to_string(),
            created_at: Utc::now(),
        };
        assert!(LikeRepository::insert_if_absent(&store, &like("l1")).await.unwrap());
        assert!(!LikeRepository::insert_if_absent(&store, &like("l2")).await.unwrap());
        assert!(LikeRepository::delete_by_user_and_post(&store, "u1", "p1").await.unwrap());
        assert!(!LikeRepository::delete_by_user_and_post(&store, "u1", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_follow_edge_is_not_inserted() {
        let store = MemoryStore::new();
        UserRepository::create(&store, &user("u1", "alice")).await.unwrap();
        UserRepository::create(&store, &user("u2", "bob")).await.unwrap();

        let edge = || Follow {
            id: Uuid::new_v4(),
            follower_id: "u1".to_string(),
            followed_id: "u2".to_string(),
            created_at: Utc::now(),
        };
        assert!(FollowRepository::insert_if_absent(&store, &edge()).await.unwrap());
        assert!(!FollowRepository::insert_if_absent(&store, &edge()).await.unwrap());
        assert_eq!(FollowRepository::followers_of(&store, "u2").await.unwrap().len(), 1);
        assert_eq!(FollowRepository::following_of(&store, "u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_user_for_same_identity_conflicts() {
        let store = MemoryStore::new();
        UserRepository::create(&store, &user("u1", "alice")).await.unwrap();

        let mut twin = user("u9", "alice again");
        twin.firebase_uid = "fb-u1".to_string();
        let err = UserRepository::create(&store, &twin).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }
}
