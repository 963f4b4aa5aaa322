// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Request extractors for the caller's identity.
//!
//! [`AuthUser`] verifies the bearer token and rejects with 401. Wrapping it in
//! `Option` makes authentication optional. [`CurrentUser`] additionally
//! resolves the identity to a registered profile and rejects with 404 when
//! none exists.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::error::AppError;
use super::state::AppState;
use crate::auth::{bearer_token, AuthUser};
use crate::models::User;

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers).map_err(|e| {
            warn!("Rejected request to {}: {}", parts.uri.path(), e);
            AppError::from(e)
        })?;

        let firebase_uid = state.verifier.verify(token).await.map_err(|e| {
            warn!("Token verification failed for {}: {}", parts.uri.path(), e);
            AppError::from(e)
        })?;

        let user = AuthUser { firebase_uid };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Registered profile of the authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let user = state.services.users.resolve(&auth).await?;
        Ok(CurrentUser(user))
    }
}
