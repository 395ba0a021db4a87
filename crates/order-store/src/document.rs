//! # StoreDocument Trait
//!
//! The `StoreDocument` trait is the contract every stored record (orders, vendor profiles,
//! courier profiles, ...) implements to be kept by the generic [`DocumentActor`](crate::DocumentActor).
//!
//! # Architecture Note
//! The actor loop is written *once* against this trait. Each document type only says
//! what identifies it and how a partial mutation (`Patch`) is applied to the current
//! value. Subscribers always receive the full document after a mutation, never the
//! patch itself.
//!
//! We use associated types so a collection only accepts its own patches: an order
//! collection cannot be sent a vendor patch, the compiler rejects it.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any document must implement to be managed by a `DocumentActor`.
pub trait StoreDocument: Clone + Send + Sync + 'static {
    /// The unique identifier of the document (e.g. an order id).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// A partial mutation applied in place by [`StoreDocument::apply`].
    ///
    /// Read-only collections use an uninhabited type such as
    /// [`std::convert::Infallible`].
    type Patch: Send + Sync + Debug;

    /// The error returned when a patch is rejected.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Applies a patch to the current document.
    ///
    /// On `Err` the actor keeps the previous version and notifies nobody, so an
    /// implementation must not leave `self` half-mutated.
    fn apply(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
}
