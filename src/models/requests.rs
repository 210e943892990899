//! Request models for the gateway
//!
//! Typed views over incoming query strings for routes that do more than
//! pass the query through.

use url::form_urlencoded;

use crate::error::{GatewayError, Result};
use crate::gateway::UpstreamRequest;

/// Country codes served by the webcam "list by country" listing.
pub const WEBCAM_COUNTRY_CODES: &[&str] = &["ma", "cn", "in"];

/// Radius in kilometres of the "list by coordinates" search
const WEBCAM_NEARBY_RADIUS_KM: u32 = 50;

/// Query parameters of the webcam route.
///
/// # Fields
/// - `country_code`: `countryCode`, honored only when in [`WEBCAM_COUNTRY_CODES`]
/// - `lat` / `lon`: coordinates used otherwise
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebcamQuery {
    pub country_code: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl WebcamQuery {
    /// Extracts the webcam parameters from a raw query string.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            match name.as_ref() {
                "countryCode" => parsed.country_code = Some(value.into_owned()),
                "lat" => parsed.lat = Some(value.into_owned()),
                "lon" => parsed.lon = Some(value.into_owned()),
                _ => {}
            }
        }
        parsed
    }

    /// The lower-cased country code if it is on the allow-list.
    pub fn allowed_country(&self) -> Option<String> {
        let code = self.country_code.as_deref()?.to_ascii_lowercase();
        WEBCAM_COUNTRY_CODES
            .contains(&code.as_str())
            .then_some(code)
    }

    /// Chooses the upstream listing: by country when allowed, otherwise by
    /// coordinates, which must then both be finite numbers.
    pub fn upstream_request(&self) -> Result<UpstreamRequest> {
        let path = match self.allowed_country() {
            Some(country) => format!("/webcams/list/country={}/orderby=random", country),
            None => {
                let lat = coordinate("lat", self.lat.as_deref())?;
                let lon = coordinate("lon", self.lon.as_deref())?;
                format!(
                    "/webcams/list/nearby={},{},{}/orderby=random/limit=1",
                    lat, lon, WEBCAM_NEARBY_RADIUS_KM
                )
            }
        };

        Ok(UpstreamRequest {
            path,
            query: vec![
                ("show".to_string(), "webcams:image,location".to_string()),
                ("lang".to_string(), "en".to_string()),
            ],
        })
    }
}

fn coordinate<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            GatewayError::InvalidRequest(format!(
                "'{}' is required unless countryCode is one of {:?}",
                name, WEBCAM_COUNTRY_CODES
            ))
        })?;

    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(value),
        _ => Err(GatewayError::InvalidRequest(format!(
            "'{}' must be a number, got '{}'",
            name, value
        ))),
    }
}
