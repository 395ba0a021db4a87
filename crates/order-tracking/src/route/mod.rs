//! # Route Throttle
//!
//! Route and ETA computation delegated to an external [`RoutingProvider`], gated by a
//! per-session [`RouteThrottle`]. [`OsrmRouter`] is the HTTP implementation.

pub mod osrm;
pub mod provider;
pub mod throttle;

pub use osrm::OsrmRouter;
pub use provider::{RouteLeg, RoutingError, RoutingProvider};
pub use throttle::{DestinationRole, RouteDecision, RouteResult, RouteThrottle};
