//! Cache Middleware
//!
//! Answers from the response cache when it can, otherwise forwards upstream
//! and records successful replies under the route's TTL.
//!
//! Concurrent misses for the same key share one upstream fetch. Waiters hold
//! the only strong handles to that fetch, so when every waiting client goes
//! away the outbound request is dropped with them.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;
use crate::gateway::{CacheKey, RouteDescriptor, UpstreamForwarder, UpstreamRequest, UpstreamResponse};

type FetchFuture = BoxFuture<'static, Result<UpstreamResponse>>;
type InFlight = Arc<Mutex<HashMap<String, WeakShared<FetchFuture>>>>;

/// How a response was produced, reported in the `X-Cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Route does not cache
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

// == Gateway Response ==
/// JSON reply relayed to the client.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub cache_control: Option<String>,
    pub cache_status: CacheStatus,
}

impl GatewayResponse {
    fn new(route: &RouteDescriptor, status: StatusCode, body: Bytes, cache_status: CacheStatus) -> Self {
        Self {
            status,
            body,
            cache_control: route.cache_control(),
            cache_status,
        }
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-cache", HeaderValue::from_static(self.cache_status.as_str()));
        if self.status.is_success() {
            if let Some(value) = self
                .cache_control
                .and_then(|v| HeaderValue::from_str(&v).ok())
            {
                headers.insert(header::CACHE_CONTROL, value);
            }
        }

        response
    }
}

// == Cache Middleware ==
#[derive(Clone)]
pub struct CacheMiddleware {
    cache: Arc<RwLock<CacheStore>>,
    forwarder: UpstreamForwarder,
    in_flight: InFlight,
}

impl CacheMiddleware {
    pub fn new(cache: CacheStore, forwarder: UpstreamForwarder) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            forwarder,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn cache(&self) -> &Arc<RwLock<CacheStore>> {
        &self.cache
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    // == Handle ==
    /// Serves one request for `route`.
    ///
    /// Zero-TTL routes always go upstream and never touch the cache. Only
    /// 2xx upstream replies are stored; errors propagate uncached.
    pub async fn handle(
        &self,
        route: Arc<RouteDescriptor>,
        key: CacheKey,
        request: UpstreamRequest,
    ) -> Result<GatewayResponse> {
        if route.ttl_seconds == 0 {
            let upstream = self.forwarder.fetch(&route, &request).await?;
            return Ok(GatewayResponse::new(
                &route,
                upstream.status,
                upstream.body,
                CacheStatus::Bypass,
            ));
        }

        let cached = self.cache.write().await.get(key.as_str());
        if let Some(body) = cached {
            debug!(%key, "cache hit");
            return Ok(GatewayResponse::new(&route, StatusCode::OK, body, CacheStatus::Hit));
        }

        debug!(%key, "cache miss");
        let upstream = self.join_or_start(Arc::clone(&route), key, request).await?;
        Ok(GatewayResponse::new(
            &route,
            upstream.status,
            upstream.body,
            CacheStatus::Miss,
        ))
    }

    /// Joins the live fetch for `key`, or registers a new one.
    fn join_or_start(
        &self,
        route: Arc<RouteDescriptor>,
        key: CacheKey,
        request: UpstreamRequest,
    ) -> Shared<FetchFuture> {
        let mut in_flight = self.in_flight.lock();
        if let Some(existing) = in_flight.get(key.as_str()).and_then(WeakShared::upgrade) {
            debug!(%key, "joining in-flight upstream fetch");
            return existing;
        }

        let fetch = fetch_and_store(
            self.forwarder.clone(),
            Arc::clone(&self.cache),
            Arc::clone(&self.in_flight),
            route,
            key.clone(),
            request,
        )
        .boxed()
        .shared();

        if let Some(weak) = fetch.downgrade() {
            in_flight.insert(key.into(), weak);
        }
        fetch
    }

    /// Number of upstream fetches that still have a waiting client.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight
            .lock()
            .values()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }

    /// Forgets fetches abandoned by every client, returning how many.
    pub fn prune_in_flight(&self) -> usize {
        let mut in_flight = self.in_flight.lock();
        let before = in_flight.len();
        in_flight.retain(|_, weak| weak.upgrade().is_some());
        before - in_flight.len()
    }
}

async fn fetch_and_store(
    forwarder: UpstreamForwarder,
    cache: Arc<RwLock<CacheStore>>,
    in_flight: InFlight,
    route: Arc<RouteDescriptor>,
    key: CacheKey,
    request: UpstreamRequest,
) -> Result<UpstreamResponse> {
    let result = forwarder.fetch(&route, &request).await;

    if let Ok(upstream) = &result {
        if upstream.status.is_success() {
            let stored = cache
                .write()
                .await
                .put(key.to_string(), upstream.body.clone(), route.ttl_seconds);
            if let Err(e) = stored {
                warn!(%key, error = %e, "response not cached");
            }
        }
    }

    // Deregister only after the cache holds the body so late arrivals hit it
    in_flight.lock().remove(key.as_str());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::Credential;

    fn middleware() -> CacheMiddleware {
        CacheMiddleware::new(CacheStore::new(10), UpstreamForwarder::new().unwrap())
    }

    fn key(s: &str) -> CacheKey {
        CacheKey::from_request(&axum::http::Method::GET, &s.parse().unwrap())
    }

    fn empty_request() -> UpstreamRequest {
        UpstreamRequest {
            path: String::new(),
            query: vec![],
        }
    }

    #[test]
    fn test_gateway_response_headers() {
        let route = RouteDescriptor::new("/r", "https://r.test", Credential::query("k", "v"))
            .with_ttl(720)
            .with_cache_control(3600);

        let response = GatewayResponse::new(
            &route,
            StatusCode::OK,
            Bytes::from_static(b"{}"),
            CacheStatus::Hit,
        )
        .into_response();

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::CACHE_CONTROL], "max-age=3600");
        assert_eq!(headers["x-cache"], "HIT");
    }

    #[test]
    fn test_error_status_omits_cache_control() {
        let route = RouteDescriptor::new("/r", "https://r.test", Credential::query("k", "v"))
            .with_cache_control(3600);

        let response = GatewayResponse::new(
            &route,
            StatusCode::NOT_FOUND,
            Bytes::from_static(b"{}"),
            CacheStatus::Miss,
        )
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn test_cached_body_served_without_upstream() {
        let middleware = middleware();
        // Unroutable upstream: a hit must never reach it
        let route = Arc::new(
            RouteDescriptor::new("/r", "http://127.0.0.1:1", Credential::query("k", "v"))
                .with_ttl(60),
        );
        middleware
            .cache()
            .write()
            .await
            .put("GET /r?a=1".into(), Bytes::from_static(br#"{"a":1}"#), 60)
            .unwrap();

        let response = middleware
            .handle(route, key("/r?a=1"), empty_request())
            .await
            .unwrap();

        assert_eq!(response.cache_status, CacheStatus::Hit);
        assert_eq!(response.body, Bytes::from_static(br#"{"a":1}"#));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached_and_deregisters() {
        let middleware = middleware();
        let route = Arc::new(
            RouteDescriptor::new("/r", "http://127.0.0.1:1", Credential::query("k", "v"))
                .with_ttl(60),
        );

        let result = middleware.handle(route, key("/r"), empty_request()).await;

        assert!(matches!(result, Err(GatewayError::UpstreamUnreachable(_))));
        assert!(middleware.cache().read().await.is_empty());
        assert_eq!(middleware.in_flight_len(), 0);
        assert_eq!(middleware.prune_in_flight(), 0);
    }
}
