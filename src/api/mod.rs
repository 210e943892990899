//! API Module
//!
//! HTTP handlers and routing for the gateway.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Cache statistics
//! - `GET /<routePrefix>...` - Cached forwarding to the route's upstream

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
