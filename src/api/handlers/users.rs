// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::HandlerResult;
use crate::api::dto::{RegisterResponse, SearchQuery};
use crate::api::extract::CurrentUser;
use crate::api::{AppError, AppState};
use crate::auth::AuthUser;
use crate::models::{NewUserProfile, User};

/// POST /api/users
///
/// Creates the profile for the authenticated identity.
pub async fn register_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(profile): Json<NewUserProfile>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = state.services.users.register(&auth, profile).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.user_id,
        }),
    ))
}

/// GET /api/search?q=
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<Vec<User>> {
    Ok(Json(state.services.users.search(&query.q).await?))
}

/// GET /api/users/me
pub async fn get_me(CurrentUser(user): CurrentUser) -> HandlerResult<User> {
    Ok(Json(user))
}

/// GET /api/users/id/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> HandlerResult<User> {
    Ok(Json(state.services.users.get_by_id(&user_id).await?))
}
