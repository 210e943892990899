//! Request and Response models for the gateway
//!
//! Typed query parameters for routes with custom path building, and the
//! bodies of the gateway's own endpoints.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{WebcamQuery, WEBCAM_COUNTRY_CODES};
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
