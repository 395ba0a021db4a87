//! # Document Actor
//!
//! The `DocumentActor` owns one collection of documents and the push subscriptions
//! registered against them. It is the "server" half of the store: requests are
//! processed sequentially in a single Tokio task, so neither the documents nor the
//! subscriber lists need a lock.

use crate::client::StoreClient;
use crate::document::StoreDocument;
use crate::error::StoreError;
use crate::message::{FeedSender, StoreRequest, SubscriptionId};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct Watcher<D> {
    id: SubscriptionId,
    feed: FeedSender<D>,
}

/// The generic actor that manages a collection of documents.
///
/// # Notifications
///
/// Every successful `Put`, `Patch` or `Delete` pushes the resulting document (or
/// `None` after a delete) to all live watchers of that id, in the order the mutations
/// were processed. Watchers whose receiving side was dropped are pruned on the next
/// notification of their document, or on the next `Subscribe` to any document.
///
/// ```rust
/// use order_store::{DocumentActor, StoreDocument};
/// use std::convert::Infallible;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Note { text: String }
///
/// impl StoreDocument for Note {
///     type Id = String;
///     type Patch = Infallible;
///     type Error = Infallible;
///     fn apply(&mut self, patch: Infallible) -> Result<(), Infallible> { match patch {} }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = DocumentActor::<Note>::new(8);
///     tokio::spawn(actor.run());
///
///     let mut sub = client.subscribe("n1".to_string()).await.unwrap();
///     assert_eq!(sub.next().await, Some(None));
///
///     client.put("n1".to_string(), Note { text: "hi".into() }).await.unwrap();
///     assert_eq!(sub.next().await, Some(Some(Note { text: "hi".into() })));
/// }
/// ```
pub struct DocumentActor<D: StoreDocument> {
    receiver: mpsc::Receiver<StoreRequest<D>>,
    documents: HashMap<D::Id, D>,
    watchers: HashMap<D::Id, Vec<Watcher<D>>>,
    next_subscription: SubscriptionId,
}

impl<D: StoreDocument> DocumentActor<D> {
    /// Creates a new `DocumentActor` and its associated `StoreClient`.
    ///
    /// `buffer_size` bounds the request channel; when it is full, client calls wait.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<D>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            documents: HashMap::new(),
            watchers: HashMap::new(),
            next_subscription: 1,
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the actor's event loop until every client has been dropped.
    pub async fn run(mut self) {
        // "RawOrder" instead of "order_tracking::model::raw::RawOrder"
        let collection = std::any::type_name::<D>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(collection, "Store actor started");

        while let Some(msg) = self.receiver.recv().await {
            self.handle(collection, msg);
        }

        info!(collection, size = self.documents.len(), "Store actor shutdown");
    }

    fn handle(&mut self, collection: &str, msg: StoreRequest<D>) {
        match msg {
            StoreRequest::Get { id, respond_to } => {
                let document = self.documents.get(&id).cloned();
                debug!(collection, %id, found = document.is_some(), "Get");
                let _ = respond_to.send(Ok(document));
            }
            StoreRequest::Put {
                id,
                document,
                respond_to,
            } => {
                debug!(collection, %id, "Put");
                self.documents.insert(id.clone(), document.clone());
                self.notify(&id, Some(document));
                info!(collection, %id, size = self.documents.len(), "Stored");
                let _ = respond_to.send(Ok(()));
            }
            StoreRequest::Patch {
                id,
                patch,
                respond_to,
            } => {
                debug!(collection, %id, ?patch, "Patch");
                let Some(current) = self.documents.get(&id) else {
                    warn!(collection, %id, "Not found");
                    let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                    return;
                };
                // Apply to a copy so a rejected patch leaves the stored version intact.
                let mut next = current.clone();
                if let Err(e) = next.apply(patch) {
                    warn!(collection, %id, error = %e, "Patch rejected");
                    let _ = respond_to.send(Err(StoreError::Rejected(Box::new(e))));
                    return;
                }
                self.documents.insert(id.clone(), next.clone());
                self.notify(&id, Some(next.clone()));
                info!(collection, %id, "Patched");
                let _ = respond_to.send(Ok(next));
            }
            StoreRequest::Delete { id, respond_to } => {
                debug!(collection, %id, "Delete");
                if self.documents.remove(&id).is_some() {
                    self.notify(&id, None);
                    info!(collection, %id, size = self.documents.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                } else {
                    warn!(collection, %id, "Not found");
                    let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                }
            }
            StoreRequest::Subscribe {
                id,
                feed,
                respond_to,
            } => {
                let subscription = self.next_subscription;
                self.next_subscription += 1;
                self.prune_closed();

                // Initial state first, so a missing document is reported right away.
                let current = self.documents.get(&id).cloned();
                if feed.send(current).is_err() {
                    debug!(collection, %id, "Subscriber gone before registration");
                    let _ = respond_to.send(Ok(subscription));
                    return;
                }
                self.watchers.entry(id.clone()).or_default().push(Watcher {
                    id: subscription,
                    feed,
                });
                info!(collection, %id, subscription, "Subscribed");
                let _ = respond_to.send(Ok(subscription));
            }
            StoreRequest::Unsubscribe { id, subscription } => {
                if let Some(list) = self.watchers.get_mut(&id) {
                    list.retain(|w| w.id != subscription);
                    if list.is_empty() {
                        self.watchers.remove(&id);
                    }
                }
                info!(collection, %id, subscription, "Unsubscribed");
            }
        }
    }

    /// Drops watchers whose receiver is gone, across every document.
    fn prune_closed(&mut self) {
        self.watchers.retain(|_, list| {
            list.retain(|w| !w.feed.is_closed());
            !list.is_empty()
        });
    }

    fn notify(&mut self, id: &D::Id, document: Option<D>) {
        let Some(list) = self.watchers.get_mut(id) else {
            return;
        };
        list.retain(|w| w.feed.send(document.clone()).is_ok());
        debug!(%id, watchers = list.len(), "Notified");
        if list.is_empty() {
            self.watchers.remove(id);
        }
    }
}
