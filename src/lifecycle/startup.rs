//! Startup orchestration.
//!
//! # Responsibilities
//! - Build collaborators (record store, token verifier) from configuration
//! - Compile the route table and assemble the dispatcher
//! - Wrap the dispatcher in the configured host adapter
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Collaborators are constructed explicitly and passed down, never global

use std::sync::Arc;

use axum::Router;
use thiserror::Error;

use crate::auth::{build_verifier, VerifyError};
use crate::config::{AdapterKind, AppConfig};
use crate::context::AppContext;
use crate::handlers::route_table;
use crate::http::{FunctionHandler, HttpServer, RequestLimits};
use crate::routing::{Dispatcher, RouteTableError};
use crate::security::CorsPolicy;
use crate::store::{MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load record store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to build token verifier: {0}")]
    Verifier(#[from] VerifyError),

    #[error("invalid route table: {0}")]
    Routes(#[from] RouteTableError),
}

/// Everything a running process needs, fully wired.
pub struct Application {
    config: AppConfig,
    store: Arc<MemoryStore>,
    dispatcher: Dispatcher,
    cors: CorsPolicy,
}

impl Application {
    /// Build the application from a validated configuration.
    pub fn build(config: AppConfig) -> Result<Self, StartupError> {
        let store = match &config.store.seed_path {
            Some(path) => MemoryStore::load_from_file(path)?,
            None => MemoryStore::new(),
        };
        let store = Arc::new(store);

        let verifier = build_verifier(&config.auth)?;
        let table = route_table(&config.api.base_path)?;
        tracing::info!(
            routes = table.len(),
            base_path = %config.api.base_path,
            provider = ?config.auth.provider,
            "Route table compiled"
        );

        let context = AppContext::new(store.clone(), verifier);
        let dispatcher = Dispatcher::new(table, context);
        let cors = CorsPolicy::from_config(&config.cors);

        Ok(Self {
            config,
            store,
            dispatcher,
            cors,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The Axum router for the configured adapter.
    pub fn router(&self) -> Router {
        match self.config.adapter {
            AdapterKind::Server => {
                HttpServer::new(self.dispatcher.clone(), self.cors.clone(), &self.config).into_router()
            }
            AdapterKind::Serverless => FunctionHandler::new(
                self.dispatcher.clone(),
                self.cors.clone(),
                RequestLimits::from_config(&self.config),
            )
            .into_router(),
        }
    }

    /// Persist the store if configured to.
    pub fn shutdown(&self) {
        if !self.config.store.snapshot_on_shutdown {
            return;
        }
        if let Err(e) = self.store.snapshot() {
            tracing::error!(error = %e, "Failed to write record store snapshot");
        }
    }
}
