// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod comments;
pub mod health;
pub mod likes;
pub mod metrics;
pub mod posts;
pub mod social_graph;
pub mod summary;
pub mod users;

use axum::Json;

use super::AppError;

/// Result type for handlers that answer 200 with a JSON body
pub type HandlerResult<T> = Result<Json<T>, AppError>;
