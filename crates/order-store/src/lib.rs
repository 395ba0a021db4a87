//! # Order Store
//!
//! An in-memory, actor-based document store with push subscriptions. It backs the
//! order, vendor and courier collections the tracking engine reads from.
//!
//! ## Architecture Overview
//!
//! 1. **Document Layer** ([`StoreDocument`]) - what a record is and how a patch mutates it
//! 2. **Runtime Layer** ([`DocumentActor`]) - one Tokio task per collection, sequential processing
//! 3. **Interface Layer** ([`StoreClient`], [`Subscription`]) - cloneable, type-safe access
//!
//! ## Concurrency Model
//!
//! - Each collection runs in its own task and owns its documents exclusively (no locks).
//! - Requests are processed one at a time, so notifications for one document are
//!   delivered in exactly the order its mutations were applied.
//! - Subscribers receive the full document after each mutation on an unbounded
//!   feed, so a slow subscriber never stalls the collection.
//!
//! ## Testing
//!
//! The [`mock`] module provides [`mock::MockStore`], an expectation-driven stand-in
//! that also counts requests, plus raw-channel helpers for playing the actor by hand.

pub mod actor;
pub mod client;
pub mod document;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::DocumentActor;
pub use client::{StoreClient, Subscription};
pub use document::StoreDocument;
pub use error::StoreError;
pub use message::{FeedSender, Response, StoreRequest, SubscriptionId};
