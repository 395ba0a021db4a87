//! # System Lifecycle
//!
//! [`TrackingSystem`] wires the three document collections to typed clients and
//! starts sessions; [`setup_tracing`] initializes logging.
//!
//! ## Shutdown
//!
//! 1. **Drop all clients**: the collection channels close
//! 2. **Actors detect closure**: `receiver.recv()` returns `None`, subscriber feeds close
//! 3. **Sessions terminate**: each sees its feed end and exits
//! 4. **Await completion**: every collection task is joined
//!
//! Subscriptions hold only weak senders, so a live session never keeps a
//! collection running after the system shuts down.

pub mod tracing;
pub mod tracking_system;

pub use self::tracing::setup_tracing;
pub use tracking_system::TrackingSystem;
