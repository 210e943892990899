//! API Handlers
//!
//! HTTP request handlers for the gateway routes and operational endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, Uri},
    Json,
};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::{CacheMiddleware, Dispatcher, GatewayResponse, RouteTable, UpstreamForwarder};
use crate::models::{HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Creates a new AppState serving `routes` through `cache`.
    pub fn new(routes: RouteTable, cache: CacheStore) -> Result<Self> {
        let middleware = CacheMiddleware::new(cache, UpstreamForwarder::new()?);
        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(routes, middleware)),
        })
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses the standard route table and a cache sized by `max_entries`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            RouteTable::standard(config),
            CacheStore::new(config.max_entries),
        )
    }

    pub fn middleware(&self) -> &CacheMiddleware {
        self.dispatcher.middleware()
    }
}

/// Handler for every gateway route.
///
/// Matches the path against the route table; errors become JSON error
/// responses so the client always gets an answer.
pub async fn gateway_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<GatewayResponse> {
    state.dispatcher.dispatch(&method, &uri).await
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let middleware = state.middleware();
    let stats = middleware.stats().await;

    Json(StatsResponse::new(&stats, middleware.in_flight_len()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
