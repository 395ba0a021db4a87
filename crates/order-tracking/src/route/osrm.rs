//! HTTP routing provider speaking the OSRM `route` service protocol.
//!
//! `GET {base}/route/v1/{profile}/{lng},{lat};{lng},{lat}?overview=full&geometries=geojson`
//!
//! OSRM reports failures in the body (`"code": "NoRoute"`, often with a 4xx status),
//! so the body is parsed before the HTTP status is judged.

use crate::model::Coordinate;
use crate::route::{RouteLeg, RoutingError, RoutingProvider};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org/";
pub const DEFAULT_PROFILE: &str = "driving";

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    duration: f64,
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// `[lng, lat]` pairs.
    coordinates: Vec<[f64; 2]>,
}

/// Client for an OSRM-compatible routing server.
///
/// Use [`OsrmRouter::new`] for the public demo server or
/// [`OsrmRouter::with_base_url`] to point at your own deployment (or a mock server
/// in tests).
pub struct OsrmRouter {
    client: Client,
    base_url: Url,
    profile: String,
    timeout: Duration,
}

impl OsrmRouter {
    pub fn new(timeout: Duration) -> Result<Self, RoutingError> {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_PROFILE, timeout)
    }

    /// # Errors
    ///
    /// Returns [`RoutingError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`RoutingError::BadResponse`] if `base_url` is not a valid URL.
    pub fn with_base_url(base_url: &str, profile: &str, timeout: Duration) -> Result<Self, RoutingError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent("order-tracking/0.1")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| RoutingError::BadResponse(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            profile: profile.to_string(),
            timeout,
        })
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> Result<Url, RoutingError> {
        let path = format!(
            "route/v1/{}/{},{};{},{}",
            self.profile, origin.lng, origin.lat, destination.lng, destination.lat
        );
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| RoutingError::BadResponse(format!("invalid route URL '{path}': {e}")))?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        Ok(url)
    }

    fn map_http_error(&self, e: reqwest::Error) -> RoutingError {
        if e.is_timeout() {
            RoutingError::Timeout(self.timeout)
        } else {
            RoutingError::Http(e)
        }
    }
}

#[async_trait]
impl RoutingProvider for OsrmRouter {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<RouteLeg, RoutingError> {
        let url = self.route_url(origin, destination)?;
        debug!(%url, "Requesting route");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_http_error(e))?;

        let parsed: OsrmResponse = serde_json::from_str(&body)
            .map_err(|e| RoutingError::BadResponse(format!("HTTP {status}: {e}")))?;

        if parsed.code != "Ok" {
            let detail = match parsed.message {
                Some(m) => format!("{}: {m}", parsed.code),
                None => parsed.code,
            };
            return Err(RoutingError::NoRoute(detail));
        }

        let route = parsed
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::NoRoute("empty route list".to_string()))?;

        let duration = Duration::try_from_secs_f64(route.duration)
            .map_err(|e| RoutingError::BadResponse(format!("duration {}: {e}", route.duration)))?;
        if !route.distance.is_finite() || route.distance < 0.0 {
            return Err(RoutingError::BadResponse(format!("distance {}", route.distance)));
        }

        let path = route
            .geometry
            .coordinates
            .into_iter()
            .filter_map(|[lng, lat]| Coordinate::checked(lat, lng))
            .collect();

        Ok(RouteLeg {
            path,
            duration,
            distance_meters: route.distance,
        })
    }
}
