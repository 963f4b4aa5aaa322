// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::auth::AuthError;
use crate::services::ServiceError;

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Error returned by handlers
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Timeout,
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::new("UNAUTHORIZED", msg))
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                ApiError::new("UPSTREAM_TIMEOUT", "upstream service timed out"),
            ),
            AppError::Internal(detail) => {
                // Detail stays in the logs
                error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", "internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => AppError::BadRequest(msg),
            ServiceError::SelfFollow => AppError::BadRequest(err.to_string()),
            ServiceError::Unauthenticated(msg) => AppError::Unauthorized(msg),
            ServiceError::Forbidden(msg) => AppError::Forbidden(msg),
            ServiceError::NotFound(_) => AppError::NotFound(err.to_string()),
            ServiceError::Conflict(msg) => AppError::Conflict(msg),
            ServiceError::Timeout => AppError::Timeout,
            ServiceError::Upstream(_) | ServiceError::Internal(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        ServiceError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepoError;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, ApiError) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::SelfFollow, StatusCode::BAD_REQUEST),
            (ServiceError::Unauthenticated("no".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (ServiceError::NotFound("post p1".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("dup".into()), StatusCode::CONFLICT),
            (ServiceError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (ServiceError::Upstream("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let (status, _) = render(err.into()).await;
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn constraint_text_stays_out_of_response_bodies() {
        let detail = "insert or update on table \"comments\" violates foreign key constraint \"comments_post_id_fkey\"";
        let (status, body) =
            render(ServiceError::from(RepoError::Constraint(detail.to_string())).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.message.contains("comments"));

        let (status, body) =
            render(ServiceError::from(RepoError::Conflict("follows_pair_unique".to_string())).into())
                .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(!body.message.contains("follows"));

        let (status, body) =
            render(ServiceError::from(RepoError::MissingReference("post")).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "post not found");
    }

    #[tokio::test]
    async fn unreachable_signing_keys_are_a_server_error() {
        let err = AuthError::SigningKeys("error sending request for url (https://keys)".to_string());
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.message.contains("https://keys"));
    }

    #[tokio::test]
    async fn internal_detail_is_not_exposed() {
        let (status, body) =
            render(AppError::Internal("relation \"posts\" does not exist".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.message.contains("posts"));
    }
}
