// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use super::HandlerResult;
use crate::api::dto::IsFollowingResponse;
use crate::api::extract::CurrentUser;
use crate::api::{AppError, AppState};
use crate::auth::AuthUser;
use crate::models::{FollowCounts, User};

/// POST /api/users/:id/follow
pub async fn follow_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(target_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .follows
        .follow(&user.user_id, &target_id)
        .await?;
    state.metrics.record_follow_change("follow");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/:id/follow
pub async fn unfollow_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(target_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .follows
        .unfollow(&user.user_id, &target_id)
        .await?;
    state.metrics.record_follow_change("unfollow");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/:id/is-following
///
/// Anonymous callers and callers without a profile get `false`.
pub async fn is_following(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(target_id): Path<String>,
) -> HandlerResult<IsFollowingResponse> {
    let is_following = state
        .services
        .follows
        .is_following(viewer.as_ref(), &target_id)
        .await?;
    Ok(Json(IsFollowingResponse { is_following }))
}

/// GET /api/users/:id/followers
pub async fn get_followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> HandlerResult<Vec<User>> {
    let followers = state.services.follows.followers(&user_id).await?;
    debug!("User {} has {} followers", user_id, followers.len());
    Ok(Json(followers))
}

/// GET /api/users/:id/following
pub async fn get_following(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> HandlerResult<Vec<User>> {
    let following = state.services.follows.following(&user_id).await?;
    debug!("User {} follows {} users", user_id, following.len());
    Ok(Json(following))
}

/// GET /api/users/:id/follow-counts
pub async fn get_follow_counts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> HandlerResult<FollowCounts> {
    Ok(Json(state.services.follows.follow_counts(&user_id).await?))
}
