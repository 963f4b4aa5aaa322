// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::{ServiceError, ServiceResult};
use crate::auth::AuthUser;
use crate::models::{NewUserProfile, User};
use crate::repository::{RepoError, UserRepository};

pub const MAX_NAME_CHARS: usize = 50;

/// Path segments under `/users` that can never be user ids
const RESERVED_USER_IDS: [&str; 2] = ["me", "id"];

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Create the profile for an authenticated identity
    pub async fn register(&self, auth: &AuthUser, profile: NewUserProfile) -> ServiceResult<User> {
        let user_id = profile.user_id.trim();
        if user_id.is_empty() {
            return Err(ServiceError::Validation("userId is required".to_string()));
        }
        if RESERVED_USER_IDS.contains(&user_id) {
            return Err(ServiceError::Validation(format!(
                "userId '{}' is reserved",
                user_id
            )));
        }
        if auth.firebase_uid.is_empty() {
            return Err(ServiceError::Validation(
                "external identity is required".to_string(),
            ));
        }
        validate_name(&profile.name)?;

        let user = User {
            user_id: user_id.to_string(),
            firebase_uid: auth.firebase_uid.clone(),
            name: profile.name,
            bio: profile.bio,
            icon_url: profile.icon_url,
            created_at: Utc::now(),
        };

        self.users.create(&user).await.map_err(|e| match e {
            RepoError::Conflict(_) => {
                ServiceError::Conflict("user already registered".to_string())
            }
            other => other.into(),
        })?;

        info!("Registered user {}", user.user_id);
        Ok(user)
    }

    pub async fn search(&self, query: &str) -> ServiceResult<Vec<User>> {
        if query.is_empty() {
            return Err(ServiceError::Validation(
                "search query must not be empty".to_string(),
            ));
        }
        let found = self.users.search_by_name(query).await?;
        debug!("Search {:?} matched {} users", query, found.len());
        Ok(found)
    }

    pub async fn get_by_id(&self, user_id: &str) -> ServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))
    }

    /// Profile registered for the authenticated identity
    pub async fn resolve(&self, auth: &AuthUser) -> ServiceResult<User> {
        self.users
            .find_by_firebase_uid(&auth.firebase_uid)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user profile".to_string()))
    }
}

fn validate_name(name: &str) -> ServiceResult<()> {
    let chars = name.chars().count();
    if chars == 0 || chars > MAX_NAME_CHARS {
        return Err(ServiceError::Validation(format!(
            "name must be between 1 and {} characters",
            MAX_NAME_CHARS
        )));
    }
    Ok(())
}
