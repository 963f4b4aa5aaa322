// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Profile summaries generated from a user's posts.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ServiceError, ServiceResult};
use crate::genai::TextGenerator;
use crate::repository::{PostRepository, UserRepository};

const NO_POSTS_SUMMARY: &str = "No posts yet.";
const NO_POSTS_PERSONALITY: &str = "Not enough posts to analyze personality.";
const NO_TEXT_SUMMARY: &str = "No text posts yet.";
const NO_TEXT_PERSONALITY: &str = "Not enough text posts to analyze personality.";
const PENDING: &str = "analyzing...";

// First `{` through last `}`, across newlines
static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub user_name: String,
    pub summary: String,
    pub interests: Vec<String>,
    pub personality: String,
}

/// Shape the model is asked to reply with
#[derive(Debug, Deserialize)]
struct GeneratedProfile {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    interests: Vec<String>,
    #[serde(default)]
    personality: String,
}

pub struct SummaryService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    generator: Arc<dyn TextGenerator>,
}

impl SummaryService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            posts,
            users,
            generator,
        }
    }

    pub async fn generate(&self, user_id: &str) -> ServiceResult<UserSummary> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))?;

        let posts = self.posts.find_by_user(user_id).await?;
        let summary = |summary: &str, interests: Vec<String>, personality: &str| UserSummary {
            user_id: user.user_id.clone(),
            user_name: user.name.clone(),
            summary: summary.to_string(),
            interests,
            personality: personality.to_string(),
        };

        if posts.is_empty() {
            debug!("User {} has no posts, skipping generation", user_id);
            return Ok(summary(NO_POSTS_SUMMARY, Vec::new(), NO_POSTS_PERSONALITY));
        }

        let texts: Vec<&str> = posts
            .iter()
            .map(|p| p.text.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        if texts.is_empty() {
            debug!("User {} has no text posts, skipping generation", user_id);
            return Ok(summary(NO_TEXT_SUMMARY, Vec::new(), NO_TEXT_PERSONALITY));
        }

        let reply = self.generator.generate(&build_prompt(&texts.join("\n\n"))).await?;
        info!("Generated summary for user {} from {} posts", user_id, texts.len());

        Ok(match parse_profile(&reply) {
            Some(profile) => summary(&profile.summary, profile.interests, &profile.personality),
            None => {
                warn!("Could not parse generated summary for user {}, returning raw text", user_id);
                summary(&reply, vec![PENDING.to_string()], PENDING)
            }
        })
    }
}

fn build_prompt(posts: &str) -> String {
    format!(
        r#"Analyze the following user's posts and reply with JSON in this format:

{{
  "summary": "a summary of the user's posts in at most 200 characters",
  "interests": ["topics the user is interested in, as an array"],
  "personality": "personality traits visible in the posts, in at most 100 characters"
}}

User's posts:
{}

Reply with the JSON only."#,
        posts
    )
}

fn parse_profile(reply: &str) -> Option<GeneratedProfile> {
    let candidate = JSON_OBJECT.find(reply)?;
    serde_json::from_str(candidate.as_str()).ok()
}
