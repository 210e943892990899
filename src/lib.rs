//! API Cache Gateway - caching forwarder for third-party JSON APIs
//!
//! Receives client requests, injects the upstream credential, forwards them,
//! and caches successful replies for a per-route TTL.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{GatewayError, Result};
pub use tasks::spawn_cleanup_task;
