//! Gateway Module
//!
//! Route descriptors, upstream forwarding, response caching and dispatch.
//!
//! Control flow per request:
//! `Dispatcher` → `CacheMiddleware` → cache hit, or `UpstreamForwarder` then
//! cache write.

mod dispatcher;
mod forwarder;
mod key;
mod middleware;
mod route;
mod table;

pub use dispatcher::Dispatcher;
pub use forwarder::{UpstreamForwarder, UpstreamResponse};
pub use key::CacheKey;
pub use middleware::{CacheMiddleware, CacheStatus, GatewayResponse};
pub use route::{
    Credential, CredentialPlacement, PathBuilder, RouteDescriptor, RouteTable, UpstreamRequest,
    DEFAULT_UPSTREAM_TIMEOUT,
};
pub use table::WEBCAM_HOST;
