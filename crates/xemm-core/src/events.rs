//! Venue events consumed by the strategy.
//!
//! Venue adapters deliver these on the tick/event thread after the
//! corresponding fire-and-forget request. Unknown order ids are the
//! expected case for events outside the strategy's universe and are
//! dropped by the receiver, not here.

use crate::order::{ClientOrderId, OrderSide, OrderType};
use crate::{Price, Size};
use serde::{Deserialize, Serialize};

/// A (possibly partial) fill of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilledEvent {
    pub order_id: ClientOrderId,
    /// Side of the trade from the order owner's perspective.
    pub trade_type: OrderSide,
    /// Limit (maker leg) or market (taker leg).
    pub order_type: OrderType,
    /// Filled quantity in base units.
    pub amount: Size,
    /// Fill price.
    pub price: Price,
    /// Event timestamp (Unix milliseconds).
    pub timestamp_ms: u64,
}

/// An order fully filled and closed by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCompletedEvent {
    pub order_id: ClientOrderId,
    /// Total base quantity traded over the order's lifetime.
    pub base_amount: Size,
    pub timestamp_ms: u64,
}

/// An order cancelled by request or venue-side expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelledEvent {
    pub order_id: ClientOrderId,
    pub timestamp_ms: u64,
}

/// Union of events a venue adapter can deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VenueEvent {
    Filled(OrderFilledEvent),
    BuyCompleted(OrderCompletedEvent),
    SellCompleted(OrderCompletedEvent),
    Cancelled(OrderCancelledEvent),
}

impl VenueEvent {
    /// The order id this event refers to.
    pub fn order_id(&self) -> &ClientOrderId {
        match self {
            Self::Filled(e) => &e.order_id,
            Self::BuyCompleted(e) | Self::SellCompleted(e) => &e.order_id,
            Self::Cancelled(e) => &e.order_id,
        }
    }
}
