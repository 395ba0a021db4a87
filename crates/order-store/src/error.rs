//! # Store Errors
//!
//! Errors produced by the store plumbing itself. Document-specific rejections are
//! boxed into [`StoreError::Rejected`] so callers can still downcast them.

/// Errors that can occur while talking to a `DocumentActor`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store actor closed")]
    ActorClosed,
    #[error("Store actor dropped response channel")]
    ActorDropped,
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Document rejected patch: {0}")]
    Rejected(Box<dyn std::error::Error + Send + Sync>),
}
