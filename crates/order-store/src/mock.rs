//! # Mock Store & Testing Guide
//!
//! `MockStore<D>` hands out a real [`StoreClient<D>`] whose requests are answered from
//! a queue of expectations instead of a running [`DocumentActor`](crate::DocumentActor).
//! Use it to test code that *reads* from the store (lookups, fallbacks) without
//! seeding a collection, and to assert how many requests that code issued.
//!
//! | Feature | MockStore | Real DocumentActor |
//! |---------|-----------|--------------------|
//! | **State** | None (expectations) | Real documents and subscriptions |
//! | **Error injection** | Easy (`return_err`) | Hard |
//! | **Call counting** | Built in ([`MockStore::calls`]) | No |
//!
//! ```rust
//! use order_store::mock::MockStore;
//! use order_store::{StoreDocument, StoreError};
//! use std::convert::Infallible;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Vendor { name: String }
//!
//! impl StoreDocument for Vendor {
//!     type Id = String;
//!     type Patch = Infallible;
//!     type Error = Infallible;
//!     fn apply(&mut self, patch: Infallible) -> Result<(), Infallible> { match patch {} }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::<Vendor>::new();
//!     mock.expect_get("v1".to_string()).return_ok(Some(Vendor { name: "Cafe".into() }));
//!     mock.expect_get("v2".to_string()).return_err(StoreError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert!(client.get("v1".to_string()).await.unwrap().is_some());
//!     assert!(client.get("v2".to_string()).await.is_err());
//!
//!     mock.verify();
//!     assert_eq!(mock.calls(), 2);
//! }
//! ```
//!
//! A request that arrives with no matching expectation is answered with
//! [`StoreError::NotFound`] and recorded as unexpected; [`MockStore::verify`] then panics.
//!
//! For driving subscriptions by hand, use [`create_mock_store`] together with
//! [`expect_subscribe`].

use crate::client::StoreClient;
use crate::document::StoreDocument;
use crate::error::StoreError;
use crate::message::{FeedSender, StoreRequest};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

enum Expectation<D: StoreDocument> {
    Get {
        id: D::Id,
        response: Result<Option<D>, StoreError>,
    },
}

struct MockState<D: StoreDocument> {
    expectations: Mutex<VecDeque<Expectation<D>>>,
    unexpected: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

/// A mock store with expectation tracking and call counting.
pub struct MockStore<D: StoreDocument> {
    client: StoreClient<D>,
    state: Arc<MockState<D>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<D: StoreDocument> Default for MockStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: StoreDocument> MockStore<D> {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<D>>(100);
        let state = Arc::new(MockState {
            expectations: Mutex::new(VecDeque::new()),
            unexpected: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        });
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                task_state.calls.fetch_add(1, Ordering::SeqCst);
                let expectation = task_state
                    .expectations
                    .lock()
                    .map(|mut q| q.pop_front())
                    .unwrap_or(None);

                match (request, expectation) {
                    (
                        StoreRequest::Get { id, respond_to },
                        Some(Expectation::Get {
                            id: expected,
                            response,
                        }),
                    ) => {
                        if id != expected {
                            task_state.record(format!("get({id}) while expecting get({expected})"));
                        }
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::Get { id, respond_to }, None) => {
                        task_state.record(format!("unexpected get({id})"));
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                    }
                    (other, _) => {
                        task_state.record(format!("unsupported request {}", request_kind(&other)));
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> StoreClient<D> {
        self.client.clone()
    }

    /// Expects a `get` for `id`.
    pub fn expect_get(&mut self, id: D::Id) -> GetExpectationBuilder<D> {
        GetExpectationBuilder {
            id,
            state: self.state.clone(),
        }
    }

    /// Number of requests received so far, expected or not.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Panics unless every expectation was consumed and nothing unexpected arrived.
    pub fn verify(&self) {
        let remaining = self.state.expectations.lock().map(|q| q.len()).unwrap_or(0);
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
        let unexpected = self
            .state
            .unexpected
            .lock()
            .map(|u| u.clone())
            .unwrap_or_default();
        if !unexpected.is_empty() {
            panic!("Unexpected requests: {unexpected:?}");
        }
    }
}

impl<D: StoreDocument> MockState<D> {
    fn record(&self, what: String) {
        if let Ok(mut u) = self.unexpected.lock() {
            u.push(what);
        }
    }
}

fn request_kind<D: StoreDocument>(request: &StoreRequest<D>) -> &'static str {
    match request {
        StoreRequest::Get { .. } => "get",
        StoreRequest::Put { .. } => "put",
        StoreRequest::Patch { .. } => "patch",
        StoreRequest::Delete { .. } => "delete",
        StoreRequest::Subscribe { .. } => "subscribe",
        StoreRequest::Unsubscribe { .. } => "unsubscribe",
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<D: StoreDocument> {
    id: D::Id,
    state: Arc<MockState<D>>,
}

impl<D: StoreDocument> GetExpectationBuilder<D> {
    pub fn return_ok(self, value: Option<D>) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: StoreError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Option<D>, StoreError>) {
        if let Ok(mut q) = self.state.expectations.lock() {
            q.push_back(Expectation::Get {
                id: self.id,
                response,
            });
        }
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// The test plays the actor: it pulls requests with helpers such as
/// [`expect_subscribe`] and answers them itself.
pub fn create_mock_store<D: StoreDocument>(
    buffer_size: usize,
) -> (StoreClient<D>, mpsc::Receiver<StoreRequest<D>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Takes the next request and, if it is a `Subscribe`, acknowledges it and
/// returns the id and the feed the test can push documents into.
pub async fn expect_subscribe<D: StoreDocument>(
    receiver: &mut mpsc::Receiver<StoreRequest<D>>,
) -> Option<(D::Id, FeedSender<D>)> {
    match receiver.recv().await {
        Some(StoreRequest::Subscribe {
            id,
            feed,
            respond_to,
        }) => {
            let _ = respond_to.send(Ok(1));
            Some((id, feed))
        }
        _ => None,
    }
}

/// Takes the next request and, if it is a `Get`, returns the id and responder.
pub async fn expect_get<D: StoreDocument>(
    receiver: &mut mpsc::Receiver<StoreRequest<D>>,
) -> Option<(D::Id, oneshot::Sender<Result<Option<D>, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Debug, PartialEq)]
    struct Courier {
        photo: Option<String>,
    }

    impl StoreDocument for Courier {
        type Id = String;
        type Patch = Infallible;
        type Error = Infallible;
        fn apply(&mut self, patch: Infallible) -> Result<(), Infallible> {
            match patch {}
        }
    }

    #[tokio::test]
    async fn test_expectations_are_answered_in_order() {
        let mut mock = MockStore::<Courier>::new();
        mock.expect_get("c1".to_string()).return_ok(Some(Courier {
            photo: Some("a.png".into()),
        }));
        mock.expect_get("c1".to_string()).return_ok(None);

        let client = mock.client();
        let first = client.get("c1".to_string()).await.unwrap();
        let second = client.get("c1".to_string()).await.unwrap();

        assert_eq!(first.unwrap().photo.as_deref(), Some("a.png"));
        assert!(second.is_none());
        assert_eq!(mock.calls(), 2);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn test_unexpected_get_fails_verification() {
        let mock = MockStore::<Courier>::new();
        let result = mock.client().get("c9".to_string()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        mock.verify();
    }

    #[tokio::test]
    async fn test_raw_subscribe_helper_hands_out_feed() {
        let (client, mut receiver) = create_mock_store::<Courier>(4);

        let task = tokio::spawn(async move {
            let mut sub = client.subscribe("c1".to_string()).await.unwrap();
            sub.next().await
        });

        let (id, feed) = expect_subscribe(&mut receiver).await.expect("Expected Subscribe");
        assert_eq!(id, "c1");
        feed.send(Some(Courier { photo: None })).unwrap();

        let got = task.await.unwrap();
        assert_eq!(got, Some(Some(Courier { photo: None })));
    }

    #[tokio::test]
    async fn test_raw_get_helper_lets_test_answer() {
        let (client, mut receiver) = create_mock_store::<Courier>(4);

        let task = tokio::spawn(async move { client.get("c2".to_string()).await });

        let (id, respond_to) = expect_get(&mut receiver).await.expect("Expected Get");
        assert_eq!(id, "c2");
        respond_to
            .send(Ok(Some(Courier {
                photo: Some("b.png".into()),
            })))
            .unwrap();

        let got = task.await.unwrap().unwrap();
        assert_eq!(got.and_then(|c| c.photo).as_deref(), Some("b.png"));
    }
}
