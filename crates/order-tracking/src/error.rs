//! Error types for the tracking engine.
//!
//! Only [`TrackingError`] ever reaches a caller of the public session API. Lookup
//! and routing failures are absorbed where they happen and degrade the view
//! instead (see [`resolver`](crate::resolver) and [`route`](crate::route)).

use order_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// A secondary (vendor/courier profile) lookup failed.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("profile store error: {0}")]
    Store(#[from] StoreError),

    #[error("profile lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors surfaced by [`TrackingSession`](crate::session::TrackingSession) and the
/// [`TrackingSystem`](crate::lifecycle::TrackingSystem).
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The order feed could not be opened.
    #[error("could not subscribe to order {order_id}: {source}")]
    Subscribe {
        order_id: String,
        #[source]
        source: StoreError,
    },

    /// Writing to the order store failed.
    #[error("order store error: {0}")]
    Store(#[from] StoreError),

    /// The session task panicked or was aborted.
    #[error("session task failed: {0}")]
    TaskFailed(String),

    #[error("routing client could not be built: {0}")]
    RouterSetup(String),
}
