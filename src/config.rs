//! Configuration Module
//!
//! Handles loading gateway configuration and upstream credentials from
//! environment variables.

use std::env;

/// Credentials for the upstream APIs, one per provider.
///
/// Values are opaque; an empty string means the credential is unset.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Time-zone lookup key (`timeDateAPIKey`)
    pub time_date: String,
    /// News key shared by both news routes (`newsAPIKey`)
    pub news: String,
    /// Weather key shared by current and forecast routes (`weatherAPIKey`)
    pub weather: String,
    /// Webcam imagery key sent as a header (`webCamAPIKey`)
    pub webcam: String,
    /// Photo search key (`unsplashAPIKey`)
    pub pictures: String,
}

impl Credentials {
    /// Reads every credential from the environment, defaulting to empty.
    pub fn from_env() -> Self {
        Self {
            time_date: env::var("timeDateAPIKey").unwrap_or_default(),
            news: env::var("newsAPIKey").unwrap_or_default(),
            weather: env::var("weatherAPIKey").unwrap_or_default(),
            webcam: env::var("webCamAPIKey").unwrap_or_default(),
            pictures: env::var("unsplashAPIKey").unwrap_or_default(),
        }
    }
}

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of responses the cache can hold
    pub max_entries: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Upstream request timeout in seconds, applied to every route
    pub upstream_timeout: u64,
    /// Upstream API credentials
    pub credentials: Credentials,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cached responses (default: 1000)
    /// - `PORT` - HTTP server port (default: 5000)
    /// - `CLEANUP_INTERVAL` - Expired-entry sweep frequency in seconds (default: 60)
    /// - `UPSTREAM_TIMEOUT` - Upstream timeout in seconds (default: 10)
    /// - `timeDateAPIKey`, `newsAPIKey`, `weatherAPIKey`, `webCamAPIKey`,
    ///   `unsplashAPIKey` - upstream credentials (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            server_port: parse_var("PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            upstream_timeout: parse_var("UPSTREAM_TIMEOUT").unwrap_or(defaults.upstream_timeout),
            credentials: Credentials::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            server_port: 5000,
            cleanup_interval: 60,
            upstream_timeout: 10,
            credentials: Credentials::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
