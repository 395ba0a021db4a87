//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden; events carry `order_id`, `status`, `role`
//! and `collection` fields instead.
//!
//! ```bash
//! RUST_LOG=info cargo run      # lifecycle and absorbed failures
//! RUST_LOG=debug cargo run     # every request, view and route decision
//! ```
//!
//! With `RUST_LOG=info`, one order walking through the demo looks like:
//!
//! ```text
//! INFO Store actor started collection="RawOrder"
//! INFO Tracking session started order_id=order-1001
//! INFO Destination changed, invalidating cached route role="delivery"
//! WARN Routing unavailable, keeping cached route role="delivery" error=no route: NoRoute
//! INFO Tracking session terminated order_id=order-1001 reason="final view emitted"
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
