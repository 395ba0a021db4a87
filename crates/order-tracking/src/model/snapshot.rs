use crate::fulfillment::FulfillmentStatus;
use crate::model::{Coordinate, OrderId, RawAddress, RawCoordinate, RawLineItem, RawOrder};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// One order's fulfillment state at a point in time.
///
/// Produced by [`OrderSnapshot::normalize`] on every update and never mutated
/// afterwards. Every optional field is an explicit `Option`: "absent" and "empty"
/// collapse into `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub tracking_code: Option<String>,
    pub status: FulfillmentStatus,
    pub vendor: VendorInfo,
    pub customer: CustomerInfo,
    pub courier: Option<CourierInfo>,
    pub delivery: Option<DeliveryAddress>,
    pub courier_coordinate: Option<Coordinate>,
    pub courier_updated_at: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total: f64,
    pub tracking_pin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerInfo {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Present only once a courier id has been recorded on the order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourierInfo {
    pub id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub instructions: Option<String>,
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

impl OrderSnapshot {
    /// Turns a stored document into a snapshot. Never fails.
    ///
    /// - unknown or missing status → `received` (logged as a data-quality warning)
    /// - blank strings → `None`
    /// - incomplete or out-of-range coordinates → `None` (logged)
    /// - missing amounts → `0.0`, missing item quantity → `1`
    pub fn normalize(id: OrderId, raw: RawOrder) -> Self {
        let status = normalize_status(&id, raw.status.as_deref());

        let vendor = VendorInfo {
            id: text(raw.vendor_id),
            name: text(raw.vendor_name),
            phone: text(raw.vendor_phone),
            address: text(raw.vendor_address),
            coordinate: coordinate(&id, "vendorCoordinates", raw.vendor_coordinates),
        };

        let courier = text(raw.courier_id).map(|courier_id| CourierInfo {
            id: courier_id,
            name: text(raw.courier_name),
            phone: text(raw.courier_phone),
            photo: text(raw.courier_photo),
        });

        let delivery = raw.delivery_address.map(|a| delivery_address(&id, a));
        let courier_coordinate = coordinate(&id, "courierLocation", raw.courier_location);

        Self {
            tracking_code: text(raw.tracking_code),
            status,
            vendor,
            customer: CustomerInfo {
                id: text(raw.customer_id),
                name: text(raw.customer_name),
            },
            courier,
            delivery,
            courier_coordinate,
            courier_updated_at: raw.courier_location_updated_at,
            items: raw.items.into_iter().map(line_item).collect(),
            subtotal: amount(raw.subtotal),
            delivery_fee: amount(raw.delivery_fee),
            total: amount(raw.total),
            tracking_pin: text(raw.tracking_pin),
            id,
        }
    }

    pub fn delivery_coordinate(&self) -> Option<Coordinate> {
        self.delivery.as_ref().and_then(|d| d.coordinate)
    }
}

fn normalize_status(id: &OrderId, raw: Option<&str>) -> FulfillmentStatus {
    match raw {
        Some(s) => FulfillmentStatus::parse(s).unwrap_or_else(|| {
            warn!(order_id = %id, status = s, "Unrecognized status, treating as received");
            FulfillmentStatus::Received
        }),
        None => {
            warn!(order_id = %id, "Missing status, treating as received");
            FulfillmentStatus::Received
        }
    }
}

fn text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn amount(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn coordinate(id: &OrderId, field: &'static str, raw: Option<RawCoordinate>) -> Option<Coordinate> {
    let raw = raw?;
    if raw.lat.is_none() && raw.lng.is_none() {
        return None;
    }
    let resolved = raw.to_coordinate();
    if resolved.is_none() {
        warn!(order_id = %id, field, ?raw, "Discarding invalid coordinate");
    }
    resolved
}

fn delivery_address(id: &OrderId, a: RawAddress) -> DeliveryAddress {
    DeliveryAddress {
        street: text(a.street),
        city: text(a.city),
        instructions: text(a.instructions),
        coordinate: coordinate(id, "deliveryAddress.coordinates", a.coordinates),
    }
}

fn line_item(item: RawLineItem) -> LineItem {
    LineItem {
        name: text(item.name).unwrap_or_default(),
        quantity: item.quantity.unwrap_or(1),
        unit_price: amount(item.price),
    }
}
