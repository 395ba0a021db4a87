//! Typed clients over the order-store collections.

pub mod order_client;
pub mod profile_client;

pub use order_client::OrderClient;
pub use profile_client::ProfileClient;
