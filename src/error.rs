//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Gateway Error Enum ==
/// Unified error type for the gateway.
///
/// Variants carry owned messages so a single upstream outcome can be cloned
/// out to every request waiting on the same fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Connection, DNS or timeout failure reaching the upstream
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Upstream answered with a body that is not JSON
    #[error("Upstream returned an invalid body: {0}")]
    UpstreamInvalidBody(String),

    /// Credential for the route is empty or unset
    #[error("Missing credential for route {0}")]
    MissingCredential(String),

    /// No route matches the request path
    #[error("No route for path: {0}")]
    RouteNotFound(String),

    /// Gateway routes only serve GET
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Value exceeds the cacheable size
    #[error("Value of {0} bytes exceeds the maximum cacheable size")]
    ValueTooLarge(usize),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status the client sees for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamUnreachable(_) | GatewayError::UpstreamInvalidBody(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::ValueTooLarge(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;
