//! # Store Messages
//!
//! The request enum exchanged between a [`StoreClient`](crate::StoreClient) and its
//! [`DocumentActor`](crate::DocumentActor).

use crate::document::StoreDocument;
use crate::error::StoreError;
use tokio::sync::{mpsc, oneshot};

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Sender half of a push subscription.
///
/// Every message is the *full* current document, or `None` when the document does
/// not exist (yet, or any more).
pub type FeedSender<D> = mpsc::UnboundedSender<Option<D>>;

/// Identifier handed out for each registered subscription.
pub type SubscriptionId = u64;

/// Internal message type sent to the actor.
///
/// Besides the classic reads and writes (`Get`, `Put`, `Patch`, `Delete`) a collection
/// supports push subscriptions: `Subscribe` registers a feed that receives the current
/// state immediately and then once after every successful mutation of that document.
#[derive(Debug)]
pub enum StoreRequest<D: StoreDocument> {
    Get {
        id: D::Id,
        respond_to: Response<Option<D>>,
    },
    Put {
        id: D::Id,
        document: D,
        respond_to: Response<()>,
    },
    Patch {
        id: D::Id,
        patch: D::Patch,
        respond_to: Response<D>,
    },
    Delete {
        id: D::Id,
        respond_to: Response<()>,
    },
    Subscribe {
        id: D::Id,
        feed: FeedSender<D>,
        respond_to: Response<SubscriptionId>,
    },
    Unsubscribe {
        id: D::Id,
        subscription: SubscriptionId,
    },
}
