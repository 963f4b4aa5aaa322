// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
};
use prometheus::TEXT_FORMAT;

use crate::api::{AppError, AppState};

/// Prometheus scrape endpoint
pub async fn get_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::Internal(format!("metrics encoding failed: {}", e)))?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, TEXT_FORMAT)], body))
}
