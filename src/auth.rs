// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Bearer token verification against Firebase Authentication.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use parking_lot::Mutex;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::AuthConfig;

const BEARER_SCHEME: &str = "Bearer";
const SIGNING_KEY_TTL: Duration = Duration::from_secs(60 * 60);
/// Minimum spacing between two fetches of the key set
const MIN_KEY_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Identity resolved for the current request.
///
/// Only the provider's stable identifier is carried; the raw token never
/// leaves the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub firebase_uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Invalid Authorization header format. Expected 'Bearer <token>'")]
    MalformedHeader,

    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("Signing keys unavailable: {0}")]
    SigningKeys(String),
}

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if *scheme == BEARER_SCHEME && !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Verifies an ID token and yields the provider's user identifier
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Firebase ID tokens against Google's published signing keys
pub struct FirebaseVerifier {
    http: reqwest::Client,
    project_id: String,
    jwks_url: String,
    keys: RwLock<Option<CachedKeys>>,
    last_refresh: Mutex<Option<Instant>>,
}

impl FirebaseVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            project_id: config.firebase_project_id.clone(),
            jwks_url: config.jwks_url.clone(),
            keys: RwLock::new(None),
            last_refresh: Mutex::new(None),
        })
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    async fn cached_key(&self, kid: &str) -> Result<Option<DecodingKey>, AuthError> {
        let guard = self.keys.read().await;
        let Some(cached) = guard.as_ref() else {
            return Ok(None);
        };
        if cached.fetched_at.elapsed() > SIGNING_KEY_TTL {
            return Ok(None);
        }
        cached
            .keys
            .find(kid)
            .map(|jwk| DecodingKey::from_jwk(jwk).map_err(|e| AuthError::SigningKeys(e.to_string())))
            .transpose()
    }

    /// Claim the right to fetch keys now. Fails when the last attempt was
    /// less than [`MIN_KEY_REFRESH_INTERVAL`] ago.
    fn try_start_refresh(&self) -> bool {
        let mut last = self.last_refresh.lock();
        if matches!(*last, Some(at) if at.elapsed() < MIN_KEY_REFRESH_INTERVAL) {
            return false;
        }
        *last = Some(Instant::now());
        true
    }

    async fn refresh_keys(&self) -> Result<(), AuthError> {
        debug!("Fetching signing keys from {}", self.jwks_url);

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::SigningKeys(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::SigningKeys(format!(
                "key endpoint returned {}",
                response.status()
            )));
        }

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::SigningKeys(e.to_string()))?;

        info!("Loaded {} signing keys", keys.keys.len());
        *self.keys.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.cached_key(kid).await? {
            return Ok(key);
        }

        // Unknown kid usually means Google rotated its keys
        if self.try_start_refresh() {
            self.refresh_keys().await?;
        } else if self.keys.read().await.is_none() {
            return Err(AuthError::SigningKeys(
                "signing keys not loaded, refresh attempted recently".to_string(),
            ));
        } else {
            debug!("Skipping key refresh for unknown kid {}", kid);
        }
        self.cached_key(kid)
            .await?
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown signing key {}", kid)))
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token has no key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);

        let data = decode::<FirebaseClaims>(token, &key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_rejected() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingHeader));
    }

    #[test]
    fn well_formed_bearer_header_yields_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for value in ["Bearer", "Basic abc", "bearer abc", "Bearer a b", "Bearer  abc", "abc"] {
            assert_eq!(
                bearer_token(&headers(value)),
                Err(AuthError::MalformedHeader),
                "header {:?}",
                value
            );
        }
    }

    fn unreachable_verifier() -> FirebaseVerifier {
        FirebaseVerifier::new(&AuthConfig {
            firebase_project_id: "demo-project".to_string(),
            jwks_url: "http://127.0.0.1:9/unreachable".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn garbage_token_fails_before_any_key_fetch() {
        let verifier = unreachable_verifier();

        let err = verifier.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
        assert!(verifier.keys.read().await.is_none());
    }

    #[tokio::test]
    async fn unknown_key_ids_do_not_refetch_within_interval() {
        let verifier = unreachable_verifier();
        // {"alg":"RS256","kid":"k1","typ":"JWT"} with an empty payload
        let token = "eyJhbGciOiJSUzI1NiIsImtpZCI6ImsxIiwidHlwIjoiSldUIn0.e30.c2ln";

        let first = verifier.verify(token).await.unwrap_err();
        assert!(matches!(&first, AuthError::SigningKeys(msg) if !msg.contains("recently")));
        let attempted_at = verifier.last_refresh.lock().expect("refresh was attempted");

        let second = verifier.verify(token).await.unwrap_err();
        assert!(matches!(&second, AuthError::SigningKeys(msg) if msg.contains("recently")));
        assert_eq!(*verifier.last_refresh.lock(), Some(attempted_at));
    }
}
