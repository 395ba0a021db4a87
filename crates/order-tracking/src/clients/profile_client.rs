//! # Profile Client
//!
//! Read access to vendor and courier profiles, backing the resolver's secondary
//! lookups. Profiles are seeded with `put_vendor`/`put_courier` and never patched.

use crate::error::LookupError;
use crate::model::{RawCourier, RawVendor};
use crate::resolver::ProfileLookup;
use async_trait::async_trait;
use order_store::{StoreClient, StoreError};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct ProfileClient {
    vendors: StoreClient<RawVendor>,
    couriers: StoreClient<RawCourier>,
}

impl ProfileClient {
    pub fn new(vendors: StoreClient<RawVendor>, couriers: StoreClient<RawCourier>) -> Self {
        Self { vendors, couriers }
    }

    #[instrument(skip(self, vendor))]
    pub async fn put_vendor(&self, id: &str, vendor: RawVendor) -> Result<(), StoreError> {
        debug!(?vendor, "put_vendor called");
        self.vendors.put(id.to_string(), vendor).await
    }

    #[instrument(skip(self, courier))]
    pub async fn put_courier(&self, id: &str, courier: RawCourier) -> Result<(), StoreError> {
        debug!(?courier, "put_courier called");
        self.couriers.put(id.to_string(), courier).await
    }
}

#[async_trait]
impl ProfileLookup for ProfileClient {
    #[instrument(skip(self))]
    async fn vendor(&self, id: &str) -> Result<Option<RawVendor>, LookupError> {
        debug!("Sending request");
        Ok(self.vendors.get(id.to_string()).await?)
    }

    #[instrument(skip(self))]
    async fn courier(&self, id: &str) -> Result<Option<RawCourier>, LookupError> {
        debug!("Sending request");
        Ok(self.couriers.get(id.to_string()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderId, OrderSnapshot, RawCoordinate, RawOrder};
    use crate::resolver::{CoordinateResolver, Provenance};
    use order_store::mock::MockStore;
    use std::time::Duration;

    fn snapshot(vendor_id: &str, courier_id: &str) -> OrderSnapshot {
        let raw = RawOrder {
            status: Some("courier_assigned".into()),
            vendor_id: Some(vendor_id.into()),
            courier_id: Some(courier_id.into()),
            ..Default::default()
        };
        OrderSnapshot::normalize(OrderId::from("o1"), raw)
    }

    #[tokio::test]
    async fn test_one_lookup_per_role_across_repeated_snapshots() {
        let mut vendors = MockStore::<RawVendor>::new();
        let mut couriers = MockStore::<RawCourier>::new();
        vendors.expect_get("v1".to_string()).return_ok(Some(RawVendor {
            geo: Some(RawCoordinate::new(19.45, -70.69)),
            ..Default::default()
        }));
        couriers.expect_get("c1".to_string()).return_ok(Some(RawCourier {
            photo_url: Some("https://img/c1.png".into()),
            ..Default::default()
        }));

        let client = ProfileClient::new(vendors.client(), couriers.client());
        let mut resolver = CoordinateResolver::new(client, Duration::from_secs(10));

        for _ in 0..4 {
            let res = resolver.resolve(&snapshot("v1", "c1")).await;
            let vendor = res.points.vendor.unwrap();
            assert_eq!(vendor.provenance, Provenance::Fallback("geo"));
            assert_eq!(res.courier_photo.unwrap().value, "https://img/c1.png");
        }

        assert_eq!(vendors.calls(), 1);
        assert_eq!(couriers.calls(), 1);
        vendors.verify();
        couriers.verify();
    }

    #[tokio::test]
    async fn test_store_errors_degrade_and_are_retried() {
        let mut vendors = MockStore::<RawVendor>::new();
        let mut couriers = MockStore::<RawCourier>::new();
        vendors.expect_get("v1".to_string()).return_err(StoreError::ActorDropped);
        vendors.expect_get("v1".to_string()).return_ok(None);
        couriers.expect_get("c1".to_string()).return_ok(None);

        let client = ProfileClient::new(vendors.client(), couriers.client());
        let mut resolver = CoordinateResolver::new(client, Duration::from_secs(10));

        let first = resolver.resolve(&snapshot("v1", "c1")).await;
        assert!(first.points.vendor.is_none());
        let second = resolver.resolve(&snapshot("v1", "c1")).await;
        assert!(second.points.vendor.is_none());
        // Not-found is remembered; the third snapshot issues nothing.
        resolver.resolve(&snapshot("v1", "c1")).await;

        assert_eq!(vendors.calls(), 2);
        assert_eq!(couriers.calls(), 1);
        vendors.verify();
        couriers.verify();
    }
}
