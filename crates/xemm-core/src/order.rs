//! Order-side types and client order identifiers.

use crate::market::PairId;
use crate::{Price, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Scheme used as the client-order-id prefix for this side.
    pub fn id_scheme(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type.
///
/// Limit orders rest on the maker venue; market orders hedge on the taker
/// venue. The side alone never determines the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "limit"),
            Self::Market => write!(f, "market"),
        }
    }
}

/// Client order ID, unique per process.
///
/// Format: `{buy|sell}://{timestamp_ms}-{uuid_short}`. The side prefix is
/// load-bearing: fill correlation on the taker leg parses it back out, so
/// every id must be created through [`ClientOrderId::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a fresh side-prefixed id.
    pub fn generate(side: OrderSide) -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("{}://{ts}-{uuid_short}", side.id_scheme()))
    }

    /// Wrap an id received from elsewhere (event payloads).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Parse the side encoded in the id prefix.
    pub fn side(&self) -> Option<OrderSide> {
        if self.0.starts_with("buy://") {
            Some(OrderSide::Buy)
        } else if self.0.starts_with("sell://") {
            Some(OrderSide::Sell)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientOrderId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for ClientOrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A resting maker order as the engine tracks it.
///
/// The venue owns the authoritative order; this is the engine's read model
/// used by the per-tick review and the hedging pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedOrder {
    /// Client order ID.
    pub id: ClientOrderId,
    /// Owning market pair handle.
    pub pair: PairId,
    /// Order side.
    pub side: OrderSide,
    /// Limit price.
    pub price: Price,
    /// Order quantity in base units.
    pub quantity: Size,
    /// Creation timestamp (Unix milliseconds).
    pub created_at_ms: u64,
}

impl TrackedOrder {
    /// Age of the order relative to `now_ms`.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn test_id_prefix_roundtrip() {
        let buy = ClientOrderId::generate(OrderSide::Buy);
        assert!(buy.as_str().starts_with("buy://"));
        assert_eq!(buy.side(), Some(OrderSide::Buy));

        let sell = ClientOrderId::generate(OrderSide::Sell);
        assert!(sell.as_str().starts_with("sell://"));
        assert_eq!(sell.side(), Some(OrderSide::Sell));
    }

    #[test]
    fn test_id_unique() {
        let a = ClientOrderId::generate(OrderSide::Buy);
        let b = ClientOrderId::generate(OrderSide::Buy);
        assert_ne!(a, b);
    }

    #[test]
    fn test_foreign_id_has_no_side() {
        let id = ClientOrderId::from_string("exchange-assigned-42".to_string());
        assert_eq!(id.side(), None);
    }
}
