//! # Tracking Session
//!
//! The orchestrator. One session subscribes to one order and, for every notification:
//!
//! 1. normalizes the document into an [`OrderSnapshot`](crate::model::OrderSnapshot)
//! 2. classifies the status into step states
//! 3. resolves points (at most one secondary lookup per role)
//! 4. recomputes the route if the throttle allows it
//! 5. refits the viewport if the points moved
//! 6. emits a [`TrackingView`] to its [`Observer`]
//!
//! ```text
//! Idle ──start()──▶ Subscribed ──stop() / final view / feed closed──▶ Terminated
//! ```

pub mod pipeline;
pub mod tracker;
pub mod view;

pub use pipeline::{system_clock, Clock, Pipeline};
pub use tracker::{Observer, OrderFeed, SessionHandle, SessionState, TrackingSession};
pub use view::{CourierCard, OrderTracking, Progress, TrackingView, CANCELLED_BANNER};
