//! Maker/taker market pair wiring.

use std::fmt;
use std::sync::Arc;
use xemm_core::{PairId, TradingPair};
use xemm_venue::Venue;

/// One leg of a market pair: a venue plus the trading pair on it.
#[derive(Clone)]
pub struct MarketLeg {
    pub venue: Arc<dyn Venue>,
    pub trading_pair: TradingPair,
}

impl MarketLeg {
    pub fn new(venue: Arc<dyn Venue>, trading_pair: TradingPair) -> Self {
        Self {
            venue,
            trading_pair,
        }
    }

    pub fn base(&self) -> &str {
        &self.trading_pair.base
    }

    pub fn quote(&self) -> &str {
        &self.trading_pair.quote
    }
}

impl fmt::Debug for MarketLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketLeg")
            .field("venue", &self.venue.name())
            .field("trading_pair", &self.trading_pair)
            .finish()
    }
}

/// An immutable maker/taker pairing.
///
/// The maker leg hosts resting limit orders; the taker leg absorbs the
/// hedging market orders. Two pairs are distinct even when they share a
/// leg, so identity is the [`PairId`] handle, never the symbols.
#[derive(Debug, Clone)]
pub struct MarketPair {
    pub id: PairId,
    pub maker: MarketLeg,
    pub taker: MarketLeg,
}

impl MarketPair {
    pub fn new(id: PairId, maker: MarketLeg, taker: MarketLeg) -> Self {
        Self { id, maker, taker }
    }

    /// True when the two legs settle in different quote assets and
    /// hedging prices need FX conversion.
    pub fn quote_mismatch(&self) -> bool {
        self.maker.quote() != self.taker.quote()
    }
}
