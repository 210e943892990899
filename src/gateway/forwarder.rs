//! Upstream Forwarder
//!
//! Builds the outbound request for a route, issues it, and validates the
//! aggregated body as JSON.

use axum::http::StatusCode;
use bytes::Bytes;
use tracing::{debug, warn};
use url::Url;

use crate::error::{GatewayError, Result};
use crate::gateway::{CredentialPlacement, RouteDescriptor, UpstreamRequest};

/// A JSON reply captured from an upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// Canonical re-serialization of the upstream body
    pub body: Bytes,
}

/// Issues upstream requests through one shared connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamForwarder {
    client: reqwest::Client,
}

impl UpstreamForwarder {
    /// Creates a forwarder with its own HTTP client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Resolves the full upstream URL, credential included when it travels
    /// in the query.
    pub fn build_url(route: &RouteDescriptor, request: &UpstreamRequest) -> Result<Url> {
        let raw = format!(
            "{}{}",
            route.upstream_base_url.trim_end_matches('/'),
            request.path
        );
        let mut url = Url::parse(&raw).map_err(|e| {
            GatewayError::InvalidRequest(format!("cannot build upstream URL '{}': {}", raw, e))
        })?;

        let credential_param = route.credential.query_param();

        if !request.query.is_empty() || credential_param.is_some() {
            let mut pairs = url.query_pairs_mut();
            pairs.extend_pairs(request.query.iter());
            if let Some(name) = credential_param {
                pairs.append_pair(name, &route.credential.value);
            }
        }

        Ok(url)
    }

    /// Fetches `request` from the route's upstream.
    ///
    /// Fails with `MissingCredential` before any I/O when the route has no
    /// credential, `UpstreamUnreachable` on connection or timeout failures,
    /// and `UpstreamInvalidBody` when the body is not JSON.
    pub async fn fetch(
        &self,
        route: &RouteDescriptor,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse> {
        if route.credential.is_missing() {
            warn!(route = %route.path_prefix, "refusing upstream call without credential");
            return Err(GatewayError::MissingCredential(route.path_prefix.clone()));
        }

        let url = Self::build_url(route, request)?;
        debug!(route = %route.path_prefix, path = %url.path(), "forwarding upstream");

        let mut outbound = self.client.get(url).timeout(route.timeout);
        if let CredentialPlacement::Header(name) = &route.credential.placement {
            outbound = outbound.header(name.as_str(), route.credential.value.as_str());
        }
        for (name, value) in &route.extra_headers {
            outbound = outbound.header(name.as_str(), value.as_str());
        }

        let response = outbound
            .send()
            .await
            .map_err(|e| upstream_failure(route, e))?;
        let status = response.status();
        let raw = response
            .bytes()
            .await
            .map_err(|e| upstream_failure(route, e))?;

        let parsed: serde_json::Value = serde_json::from_slice(&raw).map_err(|e| {
            warn!(route = %route.path_prefix, %status, error = %e, "upstream body is not JSON");
            GatewayError::UpstreamInvalidBody(e.to_string())
        })?;
        let body = serde_json::to_vec(&parsed)
            .map_err(|e| GatewayError::Internal(format!("failed to re-serialize body: {}", e)))?;

        if !status.is_success() {
            warn!(route = %route.path_prefix, %status, "upstream answered with an error status");
        }

        Ok(UpstreamResponse {
            status,
            body: Bytes::from(body),
        })
    }
}

fn upstream_failure(route: &RouteDescriptor, err: reqwest::Error) -> GatewayError {
    if err.is_builder() {
        warn!(route = %route.path_prefix, error = %err, "invalid upstream request");
        return GatewayError::Internal(format!("invalid upstream request: {}", err));
    }

    let message = if err.is_timeout() {
        format!("timed out after {}ms", route.timeout.as_millis())
    } else {
        err.to_string()
    };
    warn!(route = %route.path_prefix, error = %message, "upstream unreachable");
    GatewayError::UpstreamUnreachable(message)
}
