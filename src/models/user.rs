// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::users;

/// Registered application user.
///
/// `firebase_uid` links the row to the identity provider and is only used for
/// lookups; it is never serialized into API responses.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(skip_serializing)]
    pub firebase_uid: String,
    pub name: String,
    pub bio: Option<String>,
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile fields supplied by the client at registration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserProfile {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub bio: Option<String>,
    pub icon_url: Option<String>,
}
