// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

// Import diesel table macros
use diesel::allow_tables_to_appear_in_same_query;
use diesel::joinable;
use diesel::table;

table! {
    users (user_id) {
        user_id -> Varchar,
        firebase_uid -> Varchar,
        name -> Varchar,
        bio -> Nullable<Text>,
        icon_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

table! {
    posts (id) {
        id -> Varchar,
        user_id -> Varchar,
        text -> Text,
        image -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

table! {
    comments (id) {
        id -> Varchar,
        post_id -> Varchar,
        user_id -> Varchar,
        text -> Text,
        created_at -> Timestamptz,
    }
}

table! {
    likes (id) {
        id -> Varchar,
        user_id -> Varchar,
        post_id -> Varchar,
        created_at -> Timestamptz,
    }
}

// Follow edges reference users twice, so no joinable! for them
table! {
    follows (id) {
        id -> Uuid,
        follower_id -> Varchar,
        followed_id -> Varchar,
        created_at -> Timestamptz,
    }
}

joinable!(posts -> users (user_id));
joinable!(comments -> posts (post_id));
joinable!(likes -> posts (post_id));

allow_tables_to_appear_in_same_query!(
    users,
    posts,
    comments,
    likes,
    follows,
);
