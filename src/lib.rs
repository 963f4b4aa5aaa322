// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod genai;
pub mod metrics;
pub mod models;
pub mod repository;
pub mod schema;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::AppState;
use crate::auth::FirebaseVerifier;
use crate::config::{Config, StorageBackend};
use crate::db::init_database;
use crate::genai::GeminiClient;
use crate::metrics::Metrics;
use crate::repository::Repositories;
use crate::services::Services;

/// Wire storage, identity verification, text generation and metrics into the
/// state shared by every handler.
pub async fn build_app_state(config: &Config) -> Result<AppState> {
    let (repositories, database) = match config.storage {
        StorageBackend::Postgres => {
            let db = Arc::new(init_database(&config.database).await?);
            info!("Connected to database");
            (Repositories::postgres(db.clone()), Some(db))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            (Repositories::in_memory(), None)
        }
    };

    let verifier = FirebaseVerifier::new(&config.auth).context("Failed to build token verifier")?;
    let generator = GeminiClient::new(&config.genai).context("Failed to build Gemini client")?;
    let metrics = Metrics::new().context("Failed to register metrics")?;

    let services = Services::new(&repositories, Arc::new(generator));
    let state = AppState::new(Arc::new(services), Arc::new(verifier), Arc::new(metrics));

    Ok(match database {
        Some(db) => state.with_database(db),
        None => state,
    })
}
