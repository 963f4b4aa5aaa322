// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::HandlerResult;
use crate::api::extract::CurrentUser;
use crate::api::{AppError, AppState};
use crate::models::{Comment, NewCommentContent};

/// POST /api/posts/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
    Json(content): Json<NewCommentContent>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = state
        .services
        .comments
        .create(&user.user_id, &post_id, content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/posts/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> HandlerResult<Vec<Comment>> {
    Ok(Json(state.services.comments.list(&post_id).await?))
}
