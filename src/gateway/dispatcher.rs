//! Gateway Dispatcher
//!
//! Maps an incoming request onto its route and hands it to the cache middleware.

use axum::http::{Method, Uri};
use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::gateway::{CacheKey, CacheMiddleware, GatewayResponse, RouteTable};

pub struct Dispatcher {
    routes: RouteTable,
    middleware: CacheMiddleware,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, middleware: CacheMiddleware) -> Self {
        Self { routes, middleware }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn middleware(&self) -> &CacheMiddleware {
        &self.middleware
    }

    /// Resolves and serves one request.
    ///
    /// Unknown paths are `RouteNotFound`; gateway routes only accept GET.
    pub async fn dispatch(&self, method: &Method, uri: &Uri) -> Result<GatewayResponse> {
        let path = uri.path();
        let (route, remainder) = self
            .routes
            .find(path)
            .ok_or_else(|| GatewayError::RouteNotFound(path.to_string()))?;

        if *method != Method::GET {
            return Err(GatewayError::MethodNotAllowed(format!(
                "{} {}",
                method, route.path_prefix
            )));
        }

        let request = route.upstream_request(remainder, uri.query())?;
        let key = CacheKey::from_request(method, uri);
        debug!(route = %route.path_prefix, %key, "dispatching");

        self.middleware.handle(route, key, request).await
    }
}
