//! # Fulfillment State Machine
//!
//! The fixed progression an order goes through, and the pure functions the tracking
//! view derives from it.
//!
//! ```text
//! received → confirmed → preparing → ready_for_pickup → courier_assigned → out_for_delivery → delivered
//!     \___________\___________\______________\__________________\___________________\→ cancelled
//! ```
//!
//! `cancelled` is terminal and is never placed on the ordinal timeline.
//!
//! Map and courier-card eligibility are explicit allow-lists, never ordinal ranges.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Number of steps on the timeline (every status except `cancelled`).
pub const STEP_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    Received,
    Confirmed,
    Preparing,
    ReadyForPickup,
    CourierAssigned,
    OutForDelivery,
    Delivered,
    Cancelled,
}

/// The timeline, in order.
pub const TIMELINE: [FulfillmentStatus; STEP_COUNT] = [
    FulfillmentStatus::Received,
    FulfillmentStatus::Confirmed,
    FulfillmentStatus::Preparing,
    FulfillmentStatus::ReadyForPickup,
    FulfillmentStatus::CourierAssigned,
    FulfillmentStatus::OutForDelivery,
    FulfillmentStatus::Delivered,
];

const MAP_ELIGIBLE: &[FulfillmentStatus] = &[
    FulfillmentStatus::Confirmed,
    FulfillmentStatus::Preparing,
    FulfillmentStatus::ReadyForPickup,
    FulfillmentStatus::CourierAssigned,
    FulfillmentStatus::OutForDelivery,
];

const COURIER_CARD_ELIGIBLE: &[FulfillmentStatus] = &[
    FulfillmentStatus::CourierAssigned,
    FulfillmentStatus::OutForDelivery,
];

impl FulfillmentStatus {
    /// Parses a stored status string.
    ///
    /// Matching ignores case and surrounding whitespace, and treats `-` and spaces
    /// as `_`. Returns `None` for anything else; callers decide how to degrade.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let status = match key.as_str() {
            "received" => Self::Received,
            "confirmed" => Self::Confirmed,
            "preparing" => Self::Preparing,
            "ready_for_pickup" => Self::ReadyForPickup,
            "courier_assigned" => Self::CourierAssigned,
            "out_for_delivery" => Self::OutForDelivery,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            _ => return None,
        };
        Some(status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::CourierAssigned => "courier_assigned",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Received => "Order received",
            Self::Confirmed => "Confirmed by the store",
            Self::Preparing => "Being prepared",
            Self::ReadyForPickup => "Ready for pickup",
            Self::CourierAssigned => "Courier assigned",
            Self::OutForDelivery => "On the way",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Position on the timeline; `None` for `cancelled`.
    pub fn ordinal(&self) -> Option<usize> {
        TIMELINE.iter().position(|s| s == self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Forward moves along the timeline, or cancellation of a live order.
    pub fn can_transition_to(&self, next: FulfillmentStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.ordinal(), next.ordinal()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }

    pub fn map_eligible(&self) -> bool {
        MAP_ELIGIBLE.contains(self)
    }

    pub fn courier_card_eligible(&self) -> bool {
        COURIER_CARD_ELIGIBLE.contains(self)
    }
}

impl Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the presentation layer needs to know about the current status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepInfo {
    pub status: FulfillmentStatus,
    /// `None` for `cancelled`.
    pub ordinal: Option<usize>,
    pub label: &'static str,
    /// The order is still in progress (neither delivered nor cancelled).
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    Completed,
    Current,
    Future,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepState {
    pub status: FulfillmentStatus,
    pub label: &'static str,
    pub phase: StepPhase,
}

pub fn classify(status: FulfillmentStatus) -> StepInfo {
    StepInfo {
        status,
        ordinal: status.ordinal(),
        label: status.label(),
        active: !status.is_terminal(),
    }
}

/// Completed/current/future for each of the seven timeline steps.
pub fn step_states(current: usize) -> [StepState; STEP_COUNT] {
    TIMELINE.map(|status| {
        let ordinal = status.ordinal().unwrap_or_default();
        let phase = match ordinal.cmp(&current) {
            std::cmp::Ordering::Less => StepPhase::Completed,
            std::cmp::Ordering::Equal => StepPhase::Current,
            std::cmp::Ordering::Greater => StepPhase::Future,
        };
        StepState {
            status,
            label: status.label(),
            phase,
        }
    })
}
