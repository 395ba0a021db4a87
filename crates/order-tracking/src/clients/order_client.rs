//! # Order Client
//!
//! Typed access to the order collection. Writers (the demo, tests, upstream services)
//! use it to create and mutate orders; sessions use it as their [`OrderFeed`].

use crate::model::{OrderId, OrderPatch, RawOrder};
use crate::session::OrderFeed;
use async_trait::async_trait;
use order_store::{StoreClient, StoreError, Subscription};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct OrderClient {
    inner: StoreClient<RawOrder>,
}

impl OrderClient {
    pub fn new(inner: StoreClient<RawOrder>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, order), fields(order_id = %id))]
    pub async fn put_order(&self, id: OrderId, order: RawOrder) -> Result<(), StoreError> {
        debug!(?order, "put_order called");
        self.inner.put(id, order).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Option<RawOrder>, StoreError> {
        debug!("Sending request");
        self.inner.get(id).await
    }

    /// Applies a patch and returns the updated document.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<RawOrder, StoreError> {
        debug!("Sending request");
        self.inner.patch(id, patch).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), StoreError> {
        debug!("Sending request");
        self.inner.delete(id).await
    }
}

#[async_trait]
impl OrderFeed for OrderClient {
    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn subscribe(&self, order_id: &OrderId) -> Result<Subscription<RawOrder>, StoreError> {
        debug!("Subscribing");
        self.inner.subscribe(order_id.clone()).await
    }
}
