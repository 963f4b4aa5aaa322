// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use super::HandlerResult;
use crate::api::extract::CurrentUser;
use crate::api::AppState;
use crate::services::{ServiceResult, UserSummary};

/// POST /api/users/:id/summary
pub async fn generate_summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> HandlerResult<UserSummary> {
    info!("Summary requested for user {}", user_id);
    let result = state.services.summaries.generate(&user_id).await;
    Ok(Json(record(&state, result)?))
}

/// POST /api/users/me/summary
pub async fn generate_my_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<UserSummary> {
    info!("Summary requested by user {} for themselves", user.user_id);
    let result = state.services.summaries.generate(&user.user_id).await;
    Ok(Json(record(&state, result)?))
}

fn record(state: &AppState, result: ServiceResult<UserSummary>) -> ServiceResult<UserSummary> {
    state
        .metrics
        .record_summary(if result.is_ok() { "ok" } else { "error" });
    result
}
