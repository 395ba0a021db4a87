use crate::model::Coordinate;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// What a routing provider returns for one origin/destination pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    /// Path geometry from origin to destination.
    pub path: Vec<Coordinate>,
    pub duration: Duration,
    pub distance_meters: f64,
}

#[derive(Debug, Error)]
pub enum RoutingError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("routing request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered but found no usable route.
    #[error("no route: {0}")]
    NoRoute(String),

    #[error("unexpected routing response: {0}")]
    BadResponse(String),
}

/// An external routing service.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<RouteLeg, RoutingError>;
}

#[async_trait]
impl<P: RoutingProvider + ?Sized> RoutingProvider for Arc<P> {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<RouteLeg, RoutingError> {
        (**self).route(origin, destination).await
    }
}
