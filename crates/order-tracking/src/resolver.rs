//! # Coordinate Resolver
//!
//! Produces the best-known vendor, delivery and courier points for a snapshot.
//!
//! | Role | Primary source | Fallback |
//! |------|----------------|----------|
//! | Vendor | `vendorCoordinates` on the order | vendor profile, legacy fields in [`VENDOR_COORDINATE_FIELDS`] order |
//! | Delivery | `deliveryAddress.coordinates` | none |
//! | Courier | `courierLocation` | none |
//!
//! The courier photo follows the same pattern (order field, then the courier
//! profile via [`COURIER_PHOTO_FIELDS`]).
//!
//! Lookups never fail the resolution: an error or timeout leaves the point absent
//! and is logged. A resolver lives as long as one tracking session and remembers
//! the last successful lookup per role, keyed by the id it looked up, so an unchanged
//! vendor or courier id costs at most one fetch no matter how many snapshots arrive.
//! Failed lookups are not remembered; the next snapshot may try again.

use crate::error::LookupError;
use crate::model::{Coordinate, OrderSnapshot, RawCourier, RawVendor};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Secondary lookups the resolver falls back to (the store's `getOnce`).
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn vendor(&self, id: &str) -> Result<Option<RawVendor>, LookupError>;
    async fn courier(&self, id: &str) -> Result<Option<RawCourier>, LookupError>;
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "field", rename_all = "snake_case")]
pub enum Provenance {
    /// A field on the order document itself.
    Primary(&'static str),
    /// A field on a separately fetched profile document.
    Fallback(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Sourced<T> {
    pub fn primary(value: T, field: &'static str) -> Self {
        Self {
            value,
            provenance: Provenance::Primary(field),
        }
    }

    pub fn fallback(value: T, field: &'static str) -> Self {
        Self {
            value,
            provenance: Provenance::Fallback(field),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedPoints {
    pub vendor: Option<Sourced<Coordinate>>,
    pub delivery: Option<Sourced<Coordinate>>,
    pub courier: Option<Sourced<Coordinate>>,
}

impl ResolvedPoints {
    pub fn vendor_point(&self) -> Option<Coordinate> {
        self.vendor.as_ref().map(|s| s.value)
    }

    pub fn delivery_point(&self) -> Option<Coordinate> {
        self.delivery.as_ref().map(|s| s.value)
    }

    pub fn courier_point(&self) -> Option<Coordinate> {
        self.courier.as_ref().map(|s| s.value)
    }

    /// The points that are present, in vendor, delivery, courier order.
    pub fn present(&self) -> impl Iterator<Item = Coordinate> + '_ {
        [self.vendor_point(), self.delivery_point(), self.courier_point()]
            .into_iter()
            .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}

/// Everything the resolver derives from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub points: ResolvedPoints,
    pub courier_photo: Option<Sourced<String>>,
}

type VendorCoordinateField = (&'static str, fn(&RawVendor) -> Option<Coordinate>);
type CourierPhotoField = (&'static str, fn(&RawCourier) -> Option<&str>);

/// Vendor profile fields that may carry the coordinate, in priority order.
pub const VENDOR_COORDINATE_FIELDS: [VendorCoordinateField; 4] = [
    ("coordinates", vendor_coordinates),
    ("location", vendor_location),
    ("geo", vendor_geo),
    ("latitude/longitude", vendor_flat_lat_lng),
];

/// Courier profile fields that may carry the photo reference, in priority order.
pub const COURIER_PHOTO_FIELDS: [CourierPhotoField; 3] = [
    ("photoUrl", courier_photo_url),
    ("photo", courier_photo_field),
    ("avatarUrl", courier_avatar_url),
];

fn courier_photo_url(c: &RawCourier) -> Option<&str> {
    c.photo_url.as_deref()
}

fn courier_photo_field(c: &RawCourier) -> Option<&str> {
    c.photo.as_deref()
}

fn courier_avatar_url(c: &RawCourier) -> Option<&str> {
    c.avatar_url.as_deref()
}

fn vendor_coordinates(v: &RawVendor) -> Option<Coordinate> {
    v.coordinates?.to_coordinate()
}

fn vendor_location(v: &RawVendor) -> Option<Coordinate> {
    v.location?.to_coordinate()
}

fn vendor_geo(v: &RawVendor) -> Option<Coordinate> {
    v.geo?.to_coordinate()
}

fn vendor_flat_lat_lng(v: &RawVendor) -> Option<Coordinate> {
    Coordinate::checked(v.latitude?, v.longitude?)
}

/// First populated legacy coordinate field of a vendor profile.
pub fn vendor_coordinate(vendor: &RawVendor) -> Option<Sourced<Coordinate>> {
    VENDOR_COORDINATE_FIELDS
        .iter()
        .find_map(|(field, get)| get(vendor).map(|c| Sourced::fallback(c, *field)))
}

/// First non-blank photo field of a courier profile.
pub fn courier_photo(courier: &RawCourier) -> Option<Sourced<String>> {
    COURIER_PHOTO_FIELDS.iter().find_map(|(field, get)| {
        get(courier)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Sourced::fallback(s.to_string(), *field))
    })
}

/// Last successful lookup for one role.
struct Memo<T> {
    entry: Option<(String, T)>,
}

impl<T: Clone> Memo<T> {
    fn new() -> Self {
        Self { entry: None }
    }

    fn get(&self, key: &str) -> Option<T> {
        match &self.entry {
            Some((k, v)) if k == key => Some(v.clone()),
            _ => None,
        }
    }

    fn put(&mut self, key: &str, value: T) {
        self.entry = Some((key.to_string(), value));
    }
}

pub struct CoordinateResolver<L> {
    lookup: L,
    timeout: Duration,
    vendor_memo: Memo<Option<Sourced<Coordinate>>>,
    photo_memo: Memo<Option<Sourced<String>>>,
}

impl<L: ProfileLookup> CoordinateResolver<L> {
    pub fn new(lookup: L, timeout: Duration) -> Self {
        Self {
            lookup,
            timeout,
            vendor_memo: Memo::new(),
            photo_memo: Memo::new(),
        }
    }

    pub async fn resolve(&mut self, snapshot: &OrderSnapshot) -> Resolution {
        let points = ResolvedPoints {
            vendor: self.vendor_point(snapshot).await,
            delivery: snapshot
                .delivery_coordinate()
                .map(|c| Sourced::primary(c, "deliveryAddress.coordinates")),
            courier: snapshot
                .courier_coordinate
                .map(|c| Sourced::primary(c, "courierLocation")),
        };
        let courier_photo = self.courier_photo(snapshot).await;
        Resolution {
            points,
            courier_photo,
        }
    }

    async fn vendor_point(&mut self, snapshot: &OrderSnapshot) -> Option<Sourced<Coordinate>> {
        if let Some(c) = snapshot.vendor.coordinate {
            return Some(Sourced::primary(c, "vendorCoordinates"));
        }
        let vendor_id = snapshot.vendor.id.as_deref()?;
        if let Some(hit) = self.vendor_memo.get(vendor_id) {
            return hit;
        }

        debug!(order_id = %snapshot.id, vendor_id, "Looking up vendor coordinate");
        match tokio::time::timeout(self.timeout, self.lookup.vendor(vendor_id)).await {
            Ok(Ok(vendor)) => {
                let point = vendor.as_ref().and_then(vendor_coordinate);
                if point.is_none() {
                    debug!(order_id = %snapshot.id, vendor_id, found = vendor.is_some(), "Vendor has no coordinate");
                }
                self.vendor_memo.put(vendor_id, point.clone());
                point
            }
            Ok(Err(e)) => {
                warn!(order_id = %snapshot.id, vendor_id, error = %e, "Vendor lookup failed");
                None
            }
            Err(_) => {
                let e = LookupError::Timeout(self.timeout);
                warn!(order_id = %snapshot.id, vendor_id, error = %e, "Vendor lookup failed");
                None
            }
        }
    }

    async fn courier_photo(&mut self, snapshot: &OrderSnapshot) -> Option<Sourced<String>> {
        let courier = snapshot.courier.as_ref()?;
        if let Some(photo) = &courier.photo {
            return Some(Sourced::primary(photo.clone(), "courierPhoto"));
        }
        if let Some(hit) = self.photo_memo.get(&courier.id) {
            return hit;
        }

        debug!(order_id = %snapshot.id, courier_id = %courier.id, "Looking up courier photo");
        match tokio::time::timeout(self.timeout, self.lookup.courier(&courier.id)).await {
            Ok(Ok(profile)) => {
                let photo = profile.as_ref().and_then(courier_photo);
                self.photo_memo.put(&courier.id, photo.clone());
                photo
            }
            Ok(Err(e)) => {
                warn!(order_id = %snapshot.id, courier_id = %courier.id, error = %e, "Courier lookup failed");
                None
            }
            Err(_) => {
                let e = LookupError::Timeout(self.timeout);
                warn!(order_id = %snapshot.id, courier_id = %courier.id, error = %e, "Courier lookup failed");
                None
            }
        }
    }
}
