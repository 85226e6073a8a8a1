//! The venue adapter surface the strategy consumes.
//!
//! Connectors (REST/WebSocket, authentication, order bookkeeping) live
//! behind this trait. All calls are non-blocking: submission returns an id
//! immediately and the outcome arrives later as a [`xemm_core::VenueEvent`]
//! on the same thread that drives ticks.

use crate::book::VwapResult;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use xemm_core::{ClientOrderId, OrderSide, OrderType, Price, Size, TradingPair};

/// Connectivity as reported by the venue adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkStatus {
    Connected,
    NotConnected,
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::NotConnected => write!(f, "not_connected"),
        }
    }
}

/// An order submission.
///
/// `price` is required for limit orders and absent for market orders.
/// `expiration_secs` requests venue-side auto-cancel (passive-expiry mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub pair: TradingPair,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub amount: Size,
    pub price: Option<Price>,
    pub expiration_secs: Option<u64>,
}

impl OrderRequest {
    pub fn limit(pair: TradingPair, side: OrderSide, amount: Size, price: Price) -> Self {
        Self {
            pair,
            side,
            order_type: OrderType::Limit,
            amount,
            price: Some(price),
            expiration_secs: None,
        }
    }

    pub fn market(pair: TradingPair, side: OrderSide, amount: Size) -> Self {
        Self {
            pair,
            side,
            order_type: OrderType::Market,
            amount,
            price: None,
            expiration_secs: None,
        }
    }

    pub fn with_expiration(mut self, secs: u64) -> Self {
        self.expiration_secs = Some(secs);
        self
    }
}

/// One exchange as the strategy sees it.
///
/// Balances and book queries are point-in-time snapshots; staleness
/// between calls is accepted.
pub trait Venue: Send + Sync {
    /// Short venue name used in ids and logs.
    fn name(&self) -> &str;

    /// True once the adapter has books and balances to trade on.
    fn is_ready(&self) -> bool;

    fn network_status(&self) -> NetworkStatus;

    /// Total balance of an asset, including amounts locked in open orders.
    fn balance(&self, asset: &str) -> Decimal;

    /// Balance free for new orders.
    fn available_balance(&self, asset: &str) -> Decimal;

    /// Top of book on the side a buy (`true`) or sell (`false`) would fill.
    fn best_price(&self, pair: &TradingPair, is_buy: bool) -> Option<Price>;

    /// VWAP to consume `volume` from the top of the relevant side.
    /// `None` on an empty side.
    fn vwap_for_volume(&self, pair: &TradingPair, is_buy: bool, volume: Size)
        -> Option<VwapResult>;

    /// Worst price needed to clear `volume`. `None` on an empty side.
    fn price_for_volume(&self, pair: &TradingPair, is_buy: bool, volume: Size) -> Option<Price>;

    /// Total resting volume on the side a buy/sell would consume.
    fn side_volume(&self, pair: &TradingPair, is_buy: bool) -> Size;

    /// Minimum price increment for the pair around the given price.
    fn price_quantum(&self, pair: &TradingPair, price: Price) -> Price;

    /// Round an amount down to the pair's size step.
    fn quantize_amount(&self, pair: &TradingPair, amount: Size) -> Size;

    /// Submit an order. Returns the client order id; fills, completion,
    /// and cancellation arrive later as events.
    fn submit_order(&self, request: OrderRequest) -> Result<ClientOrderId>;

    /// Request cancellation. Idempotent: unknown ids are ignored.
    fn cancel_order(&self, pair: &TradingPair, order_id: &ClientOrderId);
}
