// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod comment;
pub mod follow;
pub mod like;
pub mod post;
pub mod user;

pub use comment::{Comment, NewCommentContent};
pub use follow::{Follow, FollowCounts};
pub use like::{Like, LikeToggle};
pub use post::{NewPostContent, Post, PostView};
pub use user::{NewUserProfile, User};
