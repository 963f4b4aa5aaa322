// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mys_social_api::api;
use mys_social_api::build_app_state;
use mys_social_api::config::{Config, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (also reads .env if present)
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,mys_social_api=debug".into()),
    );
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
    info!("Initialized configuration ({:?} storage)", config.storage);

    let state = build_app_state(&config).await?;

    if let Err(e) = api::start_api_server(state, &config.server).await {
        error!("API server error: {}", e);
        return Err(e);
    }

    info!("MySocial API shutdown complete");
    Ok(())
}
