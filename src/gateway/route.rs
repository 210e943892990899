//! Route Descriptors
//!
//! Static description of one upstream target and the table that maps request
//! paths onto them.

use std::sync::Arc;
use std::time::Duration;

use url::form_urlencoded;

use crate::error::{GatewayError, Result};
use crate::models::WebcamQuery;

/// Timeout used when a route does not set its own.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

// == Credential ==
/// Where the upstream expects its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPlacement {
    /// Appended as a query parameter with this name
    QueryParam(String),
    /// Sent as a request header with this name
    Header(String),
}

/// A secret injected into every upstream request of a route.
#[derive(Debug, Clone)]
pub struct Credential {
    pub placement: CredentialPlacement,
    pub value: String,
}

impl Credential {
    pub fn query(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            placement: CredentialPlacement::QueryParam(param.into()),
            value: value.into(),
        }
    }

    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            placement: CredentialPlacement::Header(name.into()),
            value: value.into(),
        }
    }

    /// True when no usable value was configured.
    pub fn is_missing(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Name of the query parameter carrying the credential, if it travels
    /// in the query.
    pub(crate) fn query_param(&self) -> Option<&str> {
        match &self.placement {
            CredentialPlacement::QueryParam(name) => Some(name),
            CredentialPlacement::Header(_) => None,
        }
    }
}

// == Upstream Request ==
/// Path and query to send upstream, before the credential is injected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    /// Appended verbatim to the route's base URL; empty or starting with `/`
    pub path: String,
    /// Decoded query pairs, re-encoded when the URL is built
    pub query: Vec<(String, String)>,
}

// == Path Builder ==
/// How the upstream path is derived from the incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathBuilder {
    /// Forward the path remainder and the client's query pairs
    #[default]
    Passthrough,
    /// Webcam listing chosen by country code or coordinates
    Webcam,
}

// == Route Descriptor ==
/// Immutable description of one upstream target.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub path_prefix: String,
    pub upstream_base_url: String,
    pub credential: Credential,
    /// Internal cache lifetime; `0` disables caching for the route
    pub ttl_seconds: u64,
    /// `max-age` advertised to clients, independent of `ttl_seconds`
    pub cache_control_max_age: Option<u64>,
    pub extra_headers: Vec<(String, String)>,
    pub path_builder: PathBuilder,
    pub timeout: Duration,
}

impl RouteDescriptor {
    /// Creates an uncached route with passthrough paths and the default timeout.
    pub fn new(
        path_prefix: impl Into<String>,
        upstream_base_url: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            upstream_base_url: upstream_base_url.into(),
            credential,
            ttl_seconds: 0,
            cache_control_max_age: None,
            extra_headers: Vec::new(),
            path_builder: PathBuilder::Passthrough,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_cache_control(mut self, max_age: u64) -> Self {
        self.cache_control_max_age = Some(max_age);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_path_builder(mut self, path_builder: PathBuilder) -> Self {
        self.path_builder = path_builder;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Value of the `Cache-Control` header sent to clients, if any.
    pub fn cache_control(&self) -> Option<String> {
        self.cache_control_max_age
            .map(|max_age| format!("max-age={}", max_age))
    }

    /// Returns the path remainder when `path` belongs to this route.
    ///
    /// The prefix must end at a segment boundary.
    pub fn match_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        let remainder = path.strip_prefix(self.path_prefix.as_str())?;
        if remainder.is_empty() || remainder.starts_with('/') {
            Some(remainder)
        } else {
            None
        }
    }

    /// Builds the upstream path and query for an incoming request.
    ///
    /// Client pairs named like the credential parameter are dropped so the
    /// injected credential cannot be overridden. A remainder holding `.` or
    /// `..` segments is rejected; it would resolve outside the base URL.
    pub fn upstream_request(&self, remainder: &str, query: Option<&str>) -> Result<UpstreamRequest> {
        if has_dot_segment(remainder) {
            return Err(GatewayError::InvalidRequest(format!(
                "path '{}' leaves {}",
                remainder, self.path_prefix
            )));
        }

        let query = query.unwrap_or_default();
        match self.path_builder {
            PathBuilder::Passthrough => {
                let credential_param = self.credential.query_param();
                let pairs = form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .filter(|(name, _)| Some(name.as_str()) != credential_param)
                    .collect();

                Ok(UpstreamRequest {
                    path: remainder.to_string(),
                    query: pairs,
                })
            }
            PathBuilder::Webcam => WebcamQuery::parse(query).upstream_request(),
        }
    }
}

/// True when any segment is `.` or `..`, percent-encoded or not.
///
/// Backslashes count as separators since URL parsing treats them as `/`.
fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

// == Route Table ==
/// The set of routes served by the gateway.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<RouteDescriptor>>,
}

impl RouteTable {
    /// Builds a table; longer prefixes are matched first.
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        let mut routes: Vec<Arc<RouteDescriptor>> = routes.into_iter().map(Arc::new).collect();
        routes.sort_by(|a, b| b.path_prefix.len().cmp(&a.path_prefix.len()));
        Self { routes }
    }

    /// Finds the route owning `path` together with the path remainder.
    pub fn find<'a>(&self, path: &'a str) -> Option<(Arc<RouteDescriptor>, &'a str)> {
        self.routes
            .iter()
            .find_map(|route| route.match_path(path).map(|rest| (Arc::clone(route), rest)))
    }

    /// Prefixes of routes whose credential is unset.
    pub fn missing_credentials(&self) -> Vec<&str> {
        self.routes
            .iter()
            .filter(|route| route.credential.is_missing())
            .map(|route| route.path_prefix.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RouteDescriptor>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
