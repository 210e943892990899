//! Response DTOs for the gateway's own endpoints
//!
//! Upstream replies are relayed as raw JSON bytes; these cover health,
//! statistics and error bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses, expired reads included
    pub misses: u64,
    /// Misses caused by an expired entry
    pub expired: u64,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Entries currently held
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Upstream fetches currently shared by waiting clients
    pub in_flight: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, in_flight: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            in_flight,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_from_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            expired: 5,
            evictions: 2,
            total_entries: 40,
        };

        let resp = StatsResponse::new(&stats, 3);

        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.expired, 5);
        assert_eq!(resp.in_flight, 3);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(&CacheStats::default(), 0);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Upstream unreachable");
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"error":"Upstream unreachable"}"#);
    }
}
