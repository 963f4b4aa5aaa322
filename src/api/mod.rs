// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

mod dto;
mod error;
mod extract;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;

pub use dto::{IsFollowingResponse, MessageResponse, RegisterResponse};
pub use error::{ApiError, AppError};
pub use extract::CurrentUser;
pub use state::AppState;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Post routes
        .route(
            "/posts",
            get(handlers::posts::list_posts).post(handlers::posts::create_post),
        )
        .route("/posts/following", get(handlers::posts::following_feed))
        .route(
            "/posts/:id",
            get(handlers::posts::get_post).delete(handlers::posts::delete_post),
        )
        .route(
            "/posts/:id/comments",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        .route("/posts/:id/like", post(handlers::likes::toggle_like))
        // Caller's own profile
        .route("/users", post(handlers::users::register_user))
        .route("/users/me", get(handlers::users::get_me))
        .route("/users/me/posts", get(handlers::posts::list_my_posts))
        .route("/users/me/summary", post(handlers::summary::generate_my_summary))
        .route("/users/id/:id", get(handlers::users::get_user))
        // Social graph routes
        .route(
            "/users/:id/follow",
            post(handlers::social_graph::follow_user).delete(handlers::social_graph::unfollow_user),
        )
        .route("/users/:id/is-following", get(handlers::social_graph::is_following))
        .route("/users/:id/followers", get(handlers::social_graph::get_followers))
        .route("/users/:id/following", get(handlers::social_graph::get_following))
        .route(
            "/users/:id/follow-counts",
            get(handlers::social_graph::get_follow_counts),
        )
        .route("/users/:id/posts", get(handlers::posts::list_user_posts))
        .route("/users/:id/summary", post(handlers::summary::generate_summary))
        .route("/search", get(handlers::users::search_users))
}

/// Build the application router with all routes and middleware
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))
        .nest("/api", api_routes())
        .layer(from_fn_with_state(state.clone(), middleware::track_requests))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

/// Start the API server and run until ctrl-c
pub async fn start_api_server(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = create_router(state, config);

    // Get bind address
    let addr = format!("{}:{}", config.host, config.port).parse::<SocketAddr>()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Starting API server on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, shutting down"),
        Err(e) => warn!("Unable to listen for shutdown signal: {}", e),
    }
}
