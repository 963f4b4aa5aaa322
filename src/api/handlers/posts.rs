// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use super::HandlerResult;
use crate::api::extract::CurrentUser;
use crate::api::{AppError, AppState};
use crate::models::{NewPostContent, Post, PostView};

/// GET /api/posts
pub async fn list_posts(State(state): State<AppState>) -> HandlerResult<Vec<PostView>> {
    let posts = state.services.posts.list_all().await?;
    debug!("Returning {} posts", posts.len());
    Ok(Json(posts))
}

/// GET /api/posts/following
///
/// Posts from every user the caller follows.
pub async fn following_feed(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<Vec<PostView>> {
    Ok(Json(state.services.posts.feed(&user.user_id).await?))
}

/// GET /api/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> HandlerResult<PostView> {
    Ok(Json(state.services.posts.get(&post_id).await?))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(content): Json<NewPostContent>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = state.services.posts.create(&user.user_id, content).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// DELETE /api/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.services.posts.delete(&user.user_id, &post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/:id/posts
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> HandlerResult<Vec<PostView>> {
    Ok(Json(state.services.posts.list_by_user(&user_id).await?))
}

/// GET /api/users/me/posts
pub async fn list_my_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<Vec<PostView>> {
    Ok(Json(state.services.posts.list_by_user(&user.user_id).await?))
}
