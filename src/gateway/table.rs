//! The gateway's upstream routes.
//!
//! TTLs and advertised `max-age` values are separate settings; several routes
//! deliberately differ (forecast caches 360s but advertises 21600s).

use std::time::Duration;

use crate::config::Config;
use crate::gateway::{Credential, PathBuilder, RouteDescriptor, RouteTable};

pub const WEBCAM_HOST: &str = "webcamstravel.p.rapidapi.com";

impl RouteTable {
    /// Builds the production route table from configuration.
    pub fn standard(config: &Config) -> Self {
        let creds = &config.credentials;
        let timeout = Duration::from_secs(config.upstream_timeout);

        let routes = vec![
            RouteDescriptor::new(
                "/TimeDateEndpoint",
                "https://api.timezonedb.com/v2.1/get-time-zone",
                Credential::query("key", &creds.time_date),
            ),
            RouteDescriptor::new(
                "/topHeadlinesEndpoint",
                "https://newsapi.org/v2/top-headlines",
                Credential::query("apiKey", &creds.news),
            )
            .with_ttl(720)
            .with_cache_control(3600),
            RouteDescriptor::new(
                "/everythingNewsEndpoint",
                "https://newsapi.org/v2/everything",
                Credential::query("apiKey", &creds.news),
            )
            .with_cache_control(3600),
            RouteDescriptor::new(
                "/weatherEndpoint",
                "https://api.openweathermap.org/data/2.5/weather",
                Credential::query("appid", &creds.weather),
            )
            .with_ttl(360)
            .with_cache_control(3600),
            RouteDescriptor::new(
                "/forecastEndpoint",
                "https://api.openweathermap.org/data/2.5/forecast",
                Credential::query("appid", &creds.weather),
            )
            .with_ttl(360)
            .with_cache_control(21600),
            RouteDescriptor::new(
                "/webcamEndpoint",
                format!("https://{}", WEBCAM_HOST),
                Credential::header("X-RapidAPI-Key", &creds.webcam),
            )
            .with_header("X-RapidAPI-Host", WEBCAM_HOST)
            .with_path_builder(PathBuilder::Webcam)
            .with_ttl(10080),
            RouteDescriptor::new(
                "/picturesEndpoint",
                "https://api.unsplash.com/search/photos",
                Credential::query("client_id", &creds.pictures),
            )
            .with_ttl(720),
        ];

        RouteTable::new(
            routes
                .into_iter()
                .map(|route| route.with_timeout(timeout))
                .collect(),
        )
    }
}
