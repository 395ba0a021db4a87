//! # Store Client
//!
//! The cloneable handle used to talk to a [`DocumentActor`](crate::DocumentActor), and the
//! [`Subscription`] it hands out for push notifications.

use crate::document::StoreDocument;
use crate::error::StoreError;
use crate::message::{StoreRequest, SubscriptionId};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// A type-safe client for a `DocumentActor`.
///
/// Holds only the request sender, so cloning is cheap and clones can be moved into
/// other tasks freely. The actor stops once every clone has been dropped.
pub struct StoreClient<D: StoreDocument> {
    sender: mpsc::Sender<StoreRequest<D>>,
}

impl<D: StoreDocument> Clone for StoreClient<D> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<D: StoreDocument> StoreClient<D> {
    pub fn new(sender: mpsc::Sender<StoreRequest<D>>) -> Self {
        Self { sender }
    }

    /// One-shot read of the current document (`getOnce`).
    pub async fn get(&self, id: D::Id) -> Result<Option<D>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Get { id, respond_to })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    /// Inserts or replaces a whole document.
    pub async fn put(&self, id: D::Id, document: D) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Put {
                id,
                document,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    /// Applies a patch and returns the resulting document.
    pub async fn patch(&self, id: D::Id, patch: D::Patch) -> Result<D, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Patch {
                id,
                patch,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    pub async fn delete(&self, id: D::Id) -> Result<(), StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Delete { id, respond_to })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    /// Registers for push notifications on one document.
    ///
    /// The first message on the returned subscription is the current state
    /// (`None` if the document does not exist).
    pub async fn subscribe(&self, id: D::Id) -> Result<Subscription<D>, StoreError> {
        let (feed, receiver) = mpsc::unbounded_channel();
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Subscribe {
                id: id.clone(),
                feed,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        let subscription = response.await.map_err(|_| StoreError::ActorDropped)??;
        Ok(Subscription {
            id,
            subscription,
            receiver,
            sender: Some(self.sender.downgrade()),
        })
    }
}

/// A live push subscription to one document.
///
/// Dropping it unregisters from the actor (best effort; the actor also prunes
/// subscribers whose receiver is gone). A subscription does not keep the actor
/// alive: once every [`StoreClient`] is dropped the actor stops and the feed closes.
pub struct Subscription<D: StoreDocument> {
    id: D::Id,
    subscription: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<Option<D>>,
    sender: Option<mpsc::WeakSender<StoreRequest<D>>>,
}

impl<D: StoreDocument> Subscription<D> {
    /// Builds a subscription that is not attached to any actor.
    ///
    /// Useful for feeding documents by hand, e.g. from a test or from an adapter
    /// over another push source.
    pub fn detached(id: D::Id, receiver: mpsc::UnboundedReceiver<Option<D>>) -> Self {
        Self {
            id,
            subscription: 0,
            receiver,
            sender: None,
        }
    }

    pub fn document_id(&self) -> &D::Id {
        &self.id
    }

    /// Waits for the next notification.
    ///
    /// Returns `None` once the feed is closed (the actor shut down or the
    /// subscription was released); `Some(None)` means the document does not exist.
    pub async fn next(&mut self) -> Option<Option<D>> {
        self.receiver.recv().await
    }
}

impl<D: StoreDocument> Drop for Subscription<D> {
    fn drop(&mut self) {
        let Some(sender) = self.sender.take().and_then(|weak| weak.upgrade()) else {
            return;
        };
        let request = StoreRequest::Unsubscribe {
            id: self.id.clone(),
            subscription: self.subscription,
        };
        if sender.try_send(request).is_err() {
            debug!(id = %self.id, "Unsubscribe deferred to lazy pruning");
        }
    }
}
