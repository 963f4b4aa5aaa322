// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Timestamptz};
use serde::{Deserialize, Serialize};

use crate::schema::posts;

/// Stored post row
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post as returned to clients: author details plus like and comment counts
/// computed at read time.
#[derive(Debug, Clone, PartialEq, QueryableByName, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[diesel(sql_type = Text)]
    pub id: String,
    #[diesel(sql_type = Text)]
    pub user_id: String,
    // Author name, missing when the author row is gone
    #[diesel(sql_type = Nullable<Text>)]
    #[serde(rename = "name")]
    pub user_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub icon_url: Option<String>,
    #[diesel(sql_type = Text)]
    pub text: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub image: Option<String>,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = BigInt)]
    pub like_count: i64,
    #[diesel(sql_type = BigInt)]
    pub comment_count: i64,
}

/// Request body for creating a post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPostContent {
    #[serde(default)]
    pub text: String,
    pub image: Option<String>,
}
