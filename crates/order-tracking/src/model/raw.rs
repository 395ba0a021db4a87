//! Stored document shapes.
//!
//! These mirror what the order store actually holds: every field may be missing,
//! and older vendor and courier records use several historical field names. Nothing
//! here is trusted; [`OrderSnapshot::normalize`](crate::model::OrderSnapshot::normalize)
//! and the [`resolver`](crate::resolver) turn them into well-typed values.

use crate::model::{Coordinate, OrderId};
use chrono::{DateTime, Utc};
use order_store::StoreDocument;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// A possibly incomplete `{lat, lng}` pair as stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCoordinate {
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude")]
    pub lng: Option<f64>,
}

impl RawCoordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    /// Both components present, finite and in range.
    pub fn to_coordinate(&self) -> Option<Coordinate> {
        Coordinate::checked(self.lat?, self.lng?)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        Self::new(c.lat, c.lng)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub instructions: Option<String>,
    pub coordinates: Option<RawCoordinate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLineItem {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub price: Option<f64>,
}

/// The order document as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOrder {
    pub tracking_code: Option<String>,
    pub status: Option<String>,

    pub vendor_id: Option<String>,
    pub vendor_name: Option<String>,
    pub vendor_phone: Option<String>,
    pub vendor_address: Option<String>,
    pub vendor_coordinates: Option<RawCoordinate>,

    pub customer_id: Option<String>,
    pub customer_name: Option<String>,

    pub courier_id: Option<String>,
    pub courier_name: Option<String>,
    pub courier_phone: Option<String>,
    pub courier_photo: Option<String>,

    pub delivery_address: Option<RawAddress>,

    pub courier_location: Option<RawCoordinate>,
    pub courier_location_updated_at: Option<DateTime<Utc>>,

    pub items: Vec<RawLineItem>,
    pub subtotal: Option<f64>,
    pub delivery_fee: Option<f64>,
    pub total: Option<f64>,
    pub tracking_pin: Option<String>,
}

/// Mutations delivered through the order store.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPatch {
    SetStatus(String),
    AssignCourier {
        id: String,
        name: String,
        phone: Option<String>,
        photo: Option<String>,
    },
    MoveCourier {
        location: RawCoordinate,
        at: DateTime<Utc>,
    },
    EditDeliveryAddress(RawAddress),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderPatchError {
    #[error("courier position reported before a courier was assigned")]
    NoCourierAssigned,
}

impl StoreDocument for RawOrder {
    type Id = OrderId;
    type Patch = OrderPatch;
    type Error = OrderPatchError;

    fn apply(&mut self, patch: OrderPatch) -> Result<(), OrderPatchError> {
        match patch {
            OrderPatch::SetStatus(status) => self.status = Some(status),
            OrderPatch::AssignCourier {
                id,
                name,
                phone,
                photo,
            } => {
                self.courier_id = Some(id);
                self.courier_name = Some(name);
                self.courier_phone = phone;
                self.courier_photo = photo;
            }
            OrderPatch::MoveCourier { location, at } => {
                if self.courier_id.is_none() {
                    return Err(OrderPatchError::NoCourierAssigned);
                }
                self.courier_location = Some(location);
                self.courier_location_updated_at = Some(at);
            }
            OrderPatch::EditDeliveryAddress(address) => self.delivery_address = Some(address),
        }
        Ok(())
    }
}

/// Vendor profile. The coordinate has lived under several names over time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVendor {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<RawCoordinate>,
    pub location: Option<RawCoordinate>,
    pub geo: Option<RawCoordinate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StoreDocument for RawVendor {
    type Id = String;
    type Patch = Infallible;
    type Error = Infallible;

    fn apply(&mut self, patch: Infallible) -> Result<(), Infallible> {
        match patch {}
    }
}

/// Courier profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCourier {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub photo: Option<String>,
    pub avatar_url: Option<String>,
}

impl StoreDocument for RawCourier {
    type Id = String;
    type Patch = Infallible;
    type Error = Infallible;

    fn apply(&mut self, patch: Infallible) -> Result<(), Infallible> {
        match patch {}
    }
}
