use crate::fulfillment::{StepInfo, StepState};
use crate::model::{Coordinate, OrderId, OrderSnapshot};
use crate::resolver::{ResolvedPoints, Sourced};
use crate::route::RouteResult;
use crate::viewport::Viewport;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What the presentation layer receives after every snapshot notification.
///
/// Always replaced wholesale; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackingView {
    /// The order id has no document.
    NotFound { order_id: OrderId },
    Tracking(Box<OrderTracking>),
}

impl TrackingView {
    /// Delivered, cancelled, or not found.
    pub fn is_final(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Tracking(t) => t.order.status.is_terminal(),
        }
    }

    pub fn tracking(&self) -> Option<&OrderTracking> {
        match self {
            Self::NotFound { .. } => None,
            Self::Tracking(t) => Some(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTracking {
    /// Position of the notification that produced this view, starting at 1.
    pub generation: u64,
    pub order: OrderSnapshot,
    pub step: StepInfo,
    pub progress: Progress,
    pub points: ResolvedPoints,
    /// Present only while the map is eligible.
    pub route: Option<RouteResult>,
    pub map_eligible: bool,
    pub courier_card_eligible: bool,
    pub courier_card: Option<CourierCard>,
    pub viewport: Viewport,
}

impl OrderTracking {
    pub fn eta(&self) -> Option<DateTime<Utc>> {
        self.route.as_ref().and_then(RouteResult::eta)
    }
}

/// The step timeline, or the banner that replaces it for a cancelled order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Progress {
    Steps { steps: Vec<StepState> },
    Cancelled { banner: &'static str },
}

pub const CANCELLED_BANNER: &str = "This order was cancelled";

/// Courier contact and position, shown from assignment until delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourierCard {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<Sourced<String>>,
    pub position: Option<Coordinate>,
    pub position_updated_at: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    pub distance_meters: Option<f64>,
}
