// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::dto::MessageResponse;
use crate::api::extract::CurrentUser;
use crate::api::{AppError, AppState};
use crate::models::LikeToggle;

/// POST /api/posts/:id/like
///
/// 201 with the new like, or 200 with a message when an existing like was
/// removed.
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let outcome = state.services.likes.toggle(&user.user_id, &post_id).await?;

    let response = match outcome {
        LikeToggle::Created(like) => {
            state.metrics.record_like_toggle("liked");
            (StatusCode::CREATED, Json(like)).into_response()
        }
        LikeToggle::Removed => {
            state.metrics.record_like_toggle("unliked");
            (StatusCode::OK, Json(MessageResponse::new("Like removed"))).into_response()
        }
    };
    Ok(response)
}
