// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use mys_social_api::api::{create_router, AppState};
use mys_social_api::auth::{AuthError, TokenVerifier};
use mys_social_api::config::ServerConfig;
use mys_social_api::genai::{GeneratorError, TextGenerator};
use mys_social_api::metrics::Metrics;
use mys_social_api::repository::Repositories;
use mys_social_api::services::Services;

/// Accepts tokens of the form `token-<uid>`
pub struct StaticTokenVerifier;

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        token
            .strip_prefix("token-")
            .filter(|uid| !uid.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AuthError::InvalidToken("unknown test token".to_string()))
    }
}

/// Replies with a fixed string, optionally after a delay, and counts calls
pub struct CountingGenerator {
    reply: String,
    delay: Duration,
    calls: AtomicUsize,
}

impl CountingGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for CountingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.reply.clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub generator: Arc<CountingGenerator>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_reply(r#"{"summary": "test", "interests": ["testing"], "personality": "thorough"}"#)
    }

    pub fn with_reply(reply: &str) -> Self {
        Self::with_generator(CountingGenerator::new(reply), &ServerConfig::default())
    }

    pub fn with_generator(generator: CountingGenerator, config: &ServerConfig) -> Self {
        let generator = Arc::new(generator);
        let services = Services::new(&Repositories::in_memory(), generator.clone());
        let metrics = Metrics::new().unwrap();
        let state = AppState::new(
            Arc::new(services),
            Arc::new(StaticTokenVerifier),
            Arc::new(metrics),
        );

        Self {
            router: create_router(state, config),
            generator,
        }
    }

    /// Send a request; `uid` adds a bearer token for that identity
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        uid: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(uid) = uid {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer token-{}", uid));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, uid: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, uid, None).await
    }

    pub async fn post(&self, uri: &str, uid: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.send(Method::POST, uri, uid, body).await
    }

    pub async fn delete(&self, uri: &str, uid: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, uid, None).await
    }

    /// Register `user_id` for identity `uid`
    pub async fn register(&self, uid: &str, user_id: &str, name: &str) {
        let (status, body) = self
            .post(
                "/api/users",
                Some(uid),
                Some(serde_json::json!({ "userId": user_id, "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {}: {}", user_id, body);
    }
}
