// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::db::Database;
use crate::metrics::Metrics;
use crate::services::Services;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub metrics: Arc<Metrics>,
    /// Present when running against PostgreSQL; used by the health check
    pub database: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        services: Arc<Services>,
        verifier: Arc<dyn TokenVerifier>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            services,
            verifier,
            metrics,
            database: None,
        }
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }
}
