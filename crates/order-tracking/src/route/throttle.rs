use crate::fulfillment::FulfillmentStatus;
use crate::model::Coordinate;
use crate::resolver::ResolvedPoints;
use crate::route::{RouteLeg, RoutingError, RoutingProvider};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Which point the courier is heading to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationRole {
    Vendor,
    Delivery,
}

impl DestinationRole {
    /// The delivery point once the order is out for delivery, the vendor before that.
    pub fn for_status(status: FulfillmentStatus) -> Self {
        match status {
            FulfillmentStatus::OutForDelivery => Self::Delivery,
            _ => Self::Vendor,
        }
    }

    pub fn point(&self, points: &ResolvedPoints) -> Option<Coordinate> {
        match self {
            Self::Vendor => points.vendor_point(),
            Self::Delivery => points.delivery_point(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Delivery => "delivery",
        }
    }
}

/// A computed route, cached between recomputes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub path: Vec<Coordinate>,
    pub duration: Duration,
    pub distance_meters: f64,
    pub computed_at: DateTime<Utc>,
    /// Courier position the route was computed from.
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub role: DestinationRole,
}

impl RouteResult {
    /// Estimated arrival: `computed_at + duration`.
    pub fn eta(&self) -> Option<DateTime<Utc>> {
        chrono::Duration::from_std(self.duration)
            .ok()
            .and_then(|d| self.computed_at.checked_add_signed(d))
    }
}

/// Outcome of [`RouteThrottle::maybe_recompute`].
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    /// A provider call was made and succeeded.
    Fresh(RouteResult),
    /// No call was made, or it failed; this is whatever was cached.
    Cached(Option<RouteResult>),
}

impl RouteDecision {
    pub fn route(&self) -> Option<&RouteResult> {
        match self {
            Self::Fresh(r) => Some(r),
            Self::Cached(r) => r.as_ref(),
        }
    }

    pub fn into_route(self) -> Option<RouteResult> {
        match self {
            Self::Fresh(r) => Some(r),
            Self::Cached(r) => r,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

/// Rate-limits and caches calls to a [`RoutingProvider`] for one tracking session.
///
/// A role change drops the cached route as soon as it is seen, whether or not a new
/// request can be issued. A request is issued only when a courier point and the
/// destination for the current status are both present and either `interval` has
/// passed since the last successful computation or nothing is cached.
///
/// Failures keep the cached route and leave `last_computed_at` untouched, so the next
/// tick retries.
pub struct RouteThrottle<P> {
    provider: P,
    interval: Duration,
    timeout: Duration,
    cached: Option<RouteResult>,
    last_computed_at: Option<DateTime<Utc>>,
}

impl<P: RoutingProvider> RouteThrottle<P> {
    pub fn new(provider: P, interval: Duration, timeout: Duration) -> Self {
        Self {
            provider,
            interval,
            timeout,
            cached: None,
            last_computed_at: None,
        }
    }

    pub fn last_computed_at(&self) -> Option<DateTime<Utc>> {
        self.last_computed_at
    }

    pub fn cached(&self) -> Option<&RouteResult> {
        self.cached.as_ref()
    }

    pub async fn maybe_recompute(
        &mut self,
        points: &ResolvedPoints,
        status: FulfillmentStatus,
        now: DateTime<Utc>,
    ) -> RouteDecision {
        let role = DestinationRole::for_status(status);
        if self.cached.as_ref().is_some_and(|r| r.role != role) {
            info!(role = role.as_str(), "Destination changed, invalidating cached route");
            self.cached = None;
        }

        let Some(origin) = points.courier_point() else {
            return self.unchanged();
        };
        let Some(destination) = role.point(points) else {
            debug!(role = role.as_str(), "No destination point, skipping route");
            return self.unchanged();
        };

        // An empty cache retries on every tick until a route lands.
        if self.cached.is_some() && !self.interval_elapsed(now) {
            return self.unchanged();
        }

        match self.request(origin, destination).await {
            Ok(leg) => {
                let result = RouteResult {
                    path: leg.path,
                    duration: leg.duration,
                    distance_meters: leg.distance_meters,
                    computed_at: now,
                    origin,
                    destination,
                    role,
                };
                debug!(
                    role = role.as_str(),
                    duration_secs = result.duration.as_secs(),
                    distance_meters = result.distance_meters,
                    "Route recomputed"
                );
                self.cached = Some(result.clone());
                self.last_computed_at = Some(now);
                RouteDecision::Fresh(result)
            }
            Err(e) => {
                warn!(role = role.as_str(), error = %e, "Routing unavailable, keeping cached route");
                self.unchanged()
            }
        }
    }

    async fn request(&self, origin: Coordinate, destination: Coordinate) -> Result<RouteLeg, RoutingError> {
        tokio::time::timeout(self.timeout, self.provider.route(origin, destination))
            .await
            .map_err(|_| RoutingError::Timeout(self.timeout))?
    }

    fn interval_elapsed(&self, now: DateTime<Utc>) -> bool {
        match self.last_computed_at {
            None => true,
            Some(last) => now
                .signed_duration_since(last)
                .to_std()
                .is_ok_and(|elapsed| elapsed >= self.interval),
        }
    }

    fn unchanged(&self) -> RouteDecision {
        RouteDecision::Cached(self.cached.clone())
    }
}
