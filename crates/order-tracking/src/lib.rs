//! # Order Tracking
//!
//! Turns the stream of mutations to one order (status changes, courier position
//! updates, address edits) into a continuously updated "where is my order" view.
//!
//! ## Components (leaves first)
//!
//! - **[model]**: raw stored documents and the normalized [`OrderSnapshot`]
//! - **[fulfillment]**: the status state machine, step states and eligibility rules
//! - **[resolver]**: vendor, delivery and courier points with legacy-field fallbacks
//! - **[route]**: the throttled, cached routing provider calls (route and ETA)
//! - **[viewport]**: the map region covering every known point
//! - **[session]**: the orchestrator that drives all of the above per notification
//!
//! Around them: typed store [`clients`], [`config`], and the [`lifecycle`] layer that
//! runs the document collections and sets up tracing.
//!
//! ## Failure policy
//!
//! Only a missing order surfaces to the observer ([`TrackingView::NotFound`]). Failed
//! lookups, routing outages and malformed statuses are logged and degrade the view.

pub mod clients;
pub mod config;
pub mod error;
pub mod fulfillment;
pub mod lifecycle;
pub mod model;
pub mod resolver;
pub mod route;
pub mod session;
pub mod viewport;

pub use clients::{OrderClient, ProfileClient};
pub use config::{load_tracking_config, TerminalPolicy, TrackingConfig};
pub use error::{LookupError, TrackingError};
pub use fulfillment::FulfillmentStatus;
pub use lifecycle::TrackingSystem;
pub use model::{Coordinate, OrderId, OrderSnapshot};
pub use session::{Observer, SessionHandle, SessionState, TrackingSession, TrackingView};
