// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Array, Text};
use diesel_async::RunQueryDsl;
use tracing::{debug, error};

use super::{
    CommentRepository, FollowRepository, LikeRepository, PostRepository, RepoError, RepoResult,
    UserRepository,
};
use crate::db::{Database, DbConnection};
use crate::models::{Comment, Follow, Like, Post, PostView, User};
use crate::schema::{comments, follows, likes, posts, users};

// Like and comment counts are derived per row rather than stored
const POST_VIEW_SELECT: &str = "SELECT p.id, p.user_id, u.name AS user_name, u.icon_url, \
     p.text, p.image, p.created_at, \
     (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count, \
     (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count \
     FROM posts p LEFT JOIN users u ON u.user_id = p.user_id";

const NEWEST_FIRST: &str = " ORDER BY p.created_at DESC, p.id DESC";

/// PostgreSQL implementation of every repository trait
pub struct PgStore {
    db: Arc<Database>,
}

impl PgStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get a database connection from the pool
    async fn get_connection(&self) -> RepoResult<DbConnection> {
        self.db.get_connection().await.map_err(|e| {
            error!("Database connection error: {}", e);
            RepoError::Pool(e.to_string())
        })
    }
}

/// Escape LIKE wildcards so the search term matches literally
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, user_id: &str) -> RepoResult<Option<User>> {
        let mut conn = self.get_connection().await?;

        let user = users::table
            .filter(users::user_id.eq(user_id))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(user)
    }

    async fn find_by_firebase_uid(&self, firebase_uid: &str) -> RepoResult<Option<User>> {
        let mut conn = self.get_connection().await?;

        let user = users::table
            .filter(users::firebase_uid.eq(firebase_uid))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(user)
    }

    async fn search_by_name(&self, query: &str) -> RepoResult<Vec<User>> {
        let mut conn = self.get_connection().await?;
        let pattern = format!("%{}%", escape_like(query));

        debug!("Searching users with name pattern {:?}", pattern);

        let found = users::table
            .filter(users::name.like(pattern))
            .order_by(users::created_at.desc())
            .select(User::as_select())
            .load(&mut conn)
            .await?;

        Ok(found)
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut conn = self.get_connection().await?;

        diesel::insert_into(users::table)
            .values(user)
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<PostView>> {
        let mut conn = self.get_connection().await?;

        let post = diesel::sql_query(format!("{} WHERE p.id = $1", POST_VIEW_SELECT))
            .bind::<Text, _>(id)
            .get_result::<PostView>(&mut conn)
            .await
            .optional()?;

        Ok(post)
    }

    async fn find_all(&self) -> RepoResult<Vec<PostView>> {
        let mut conn = self.get_connection().await?;

        let found = diesel::sql_query(format!("{}{}", POST_VIEW_SELECT, NEWEST_FIRST))
            .load::<PostView>(&mut conn)
            .await?;

        debug!("Loaded {} posts", found.len());
        Ok(found)
    }

    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<PostView>> {
        let mut conn = self.get_connection().await?;

        let found = diesel::sql_query(format!(
            "{} WHERE p.user_id = $1{}",
            POST_VIEW_SELECT, NEWEST_FIRST
        ))
        .bind::<Text, _>(user_id)
        .load::<PostView>(&mut conn)
        .await?;

        Ok(found)
    }

    async fn find_by_users(&self, user_ids: &[String]) -> RepoResult<Vec<PostView>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_connection().await?;

        let found = diesel::sql_query(format!(
            "{} WHERE p.user_id = ANY($1){}",
            POST_VIEW_SELECT, NEWEST_FIRST
        ))
        .bind::<Array<Text>, _>(user_ids.to_vec())
        .load::<PostView>(&mut conn)
        .await?;

        Ok(found)
    }

    async fn create(&self, post: &Post) -> RepoResult<()> {
        if post.user_id.is_empty() {
            return Err(RepoError::Constraint("post has no owning user".to_string()));
        }

        let mut conn = self.get_connection().await?;

        diesel::insert_into(posts::table)
            .values(post)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let mut conn = self.get_connection().await?;

        let deleted = diesel::delete(posts::table.filter(posts::id.eq(id)))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(RepoError::NotFound(format!("post {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        let mut conn = self.get_connection().await?;

        diesel::insert_into(comments::table)
            .values(comment)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn find_by_post(&self, post_id: &str) -> RepoResult<Vec<Comment>> {
        let mut conn = self.get_connection().await?;

        let found = comments::table
            .filter(comments::post_id.eq(post_id))
            .order_by((comments::created_at.asc(), comments::id.asc()))
            .select(Comment::as_select())
            .load(&mut conn)
            .await?;

        Ok(found)
    }
}

#[async_trait]
impl LikeRepository for PgStore {
    async fn insert_if_absent(&self, like: &Like) -> RepoResult<bool> {
        let mut conn = self.get_connection().await?;

        let inserted = diesel::insert_into(likes::table)
            .values(like)
            .on_conflict((likes::user_id, likes::post_id))
            .do_nothing()
            .execute(&mut conn)
            .await?;

        Ok(inserted > 0)
    }

    async fn delete_by_user_and_post(&self, user_id: &str, post_id: &str) -> RepoResult<bool> {
        let mut conn = self.get_connection().await?;

        let deleted = diesel::delete(
            likes::table
                .filter(likes::user_id.eq(user_id))
                .filter(likes::post_id.eq(post_id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(deleted > 0)
    }
}

#[async_trait]
impl FollowRepository for PgStore {
    async fn insert_if_absent(&self, follow: &Follow) -> RepoResult<bool> {
        let mut conn = self.get_connection().await?;

        let inserted = diesel::insert_into(follows::table)
            .values(follow)
            .on_conflict((follows::follower_id, follows::followed_id))
            .do_nothing()
            .execute(&mut conn)
            .await?;

        Ok(inserted > 0)
    }

    async fn delete_edge(&self, follower_id: &str, followed_id: &str) -> RepoResult<bool> {
        let mut conn = self.get_connection().await?;

        let deleted = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(follower_id))
                .filter(follows::followed_id.eq(followed_id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(deleted > 0)
    }

    async fn exists(&self, follower_id: &str, followed_id: &str) -> RepoResult<bool> {
        let mut conn = self.get_connection().await?;

        let count = follows::table
            .filter(follows::follower_id.eq(follower_id))
            .filter(follows::followed_id.eq(followed_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok(count > 0)
    }

    async fn followers_of(&self, user_id: &str) -> RepoResult<Vec<Follow>> {
        let mut conn = self.get_connection().await?;

        let edges = follows::table
            .filter(follows::followed_id.eq(user_id))
            .order_by(follows::created_at.desc())
            .select(Follow::as_select())
            .load(&mut conn)
            .await?;

        Ok(edges)
    }

    async fn following_of(&self, user_id: &str) -> RepoResult<Vec<Follow>> {
        let mut conn = self.get_connection().await?;

        let edges = follows::table
            .filter(follows::follower_id.eq(user_id))
            .order_by(follows::created_at.desc())
            .select(Follow::as_select())
            .load(&mut conn)
            .await?;

        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_leaves_plain_terms_alone() {
        assert_eq!(escape_like("alice"), "alice");
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
