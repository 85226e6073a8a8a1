//! Maker-fill aggregation and taker hedging.
//!
//! Maker fills land in per-pair buy/sell buckets as they arrive. A drain
//! aggregates a whole bucket into one taker market order sized against
//! taker balances; the bucket is cleared only once the venue accepts the
//! order, so a rejection leaves everything queued for the next attempt.
//! There is no partial drain: the aggregated quantity hedges atomically or
//! not at all.

use crate::config::StrategyConfig;
use crate::pair::MarketPair;
use rust_decimal::Decimal;
use std::collections::HashMap;
use xemm_core::{OrderSide, PairId, Price, Size};
use xemm_venue::Venue;

/// One buffered maker fill.
#[derive(Debug, Clone)]
pub struct FillRecord {
    /// Maker-side of the filled order.
    pub side: OrderSide,
    /// Filled quantity in base units.
    pub amount: Size,
    /// Fill price.
    pub price: Price,
    /// Limit price of the order at fill time.
    pub order_price: Price,
    /// Event timestamp (Unix milliseconds).
    pub timestamp_ms: u64,
}

/// A sized taker market order ready for submission.
#[derive(Debug, Clone, Copy)]
pub struct HedgeProposal {
    /// Bucket this proposal drains (the maker fill side).
    pub maker_side: OrderSide,
    /// Side of the taker market order.
    pub taker_side: OrderSide,
    /// Hedge quantity, quantized to the taker size grid.
    pub amount: Size,
    /// Total buffered fill volume. Any excess over `amount` is accepted
    /// unhedged exposure.
    pub fill_volume: Size,
}

/// Per-pair fill buckets.
#[derive(Debug, Default)]
pub struct FillHedger {
    buy_fills: HashMap<PairId, Vec<FillRecord>>,
    sell_fills: HashMap<PairId, Vec<FillRecord>>,
}

impl FillHedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a maker fill into the side-appropriate bucket.
    pub fn record_fill(&mut self, pair: PairId, record: FillRecord) {
        let bucket = match record.side {
            OrderSide::Buy => self.buy_fills.entry(pair).or_default(),
            OrderSide::Sell => self.sell_fills.entry(pair).or_default(),
        };
        bucket.push(record);
    }

    /// True while either bucket for the pair holds unhedged fills.
    pub fn has_pending(&self, pair: PairId) -> bool {
        self.buy_fills.get(&pair).is_some_and(|b| !b.is_empty())
            || self.sell_fills.get(&pair).is_some_and(|b| !b.is_empty())
    }

    /// Total buffered volume in one bucket.
    pub fn pending_volume(&self, pair: PairId, maker_side: OrderSide) -> Size {
        let bucket = match maker_side {
            OrderSide::Buy => self.buy_fills.get(&pair),
            OrderSide::Sell => self.sell_fills.get(&pair),
        };
        bucket
            .map(|b| b.iter().fold(Size::ZERO, |acc, f| acc + f.amount))
            .unwrap_or(Size::ZERO)
    }

    /// Size taker market orders for the pair's non-empty buckets.
    ///
    /// A bucket that sizes to zero (no balance, no liquidity) yields no
    /// proposal and stays buffered for a later tick.
    pub fn proposals(&self, pair: &MarketPair, config: &StrategyConfig) -> Vec<HedgeProposal> {
        let mut out = Vec::new();
        let taker = &pair.taker;
        let factor = config.order_size_taker_balance_factor;

        // Maker buys hedge as taker sells, bounded by taker base balance.
        let buy_volume = self.pending_volume(pair.id, OrderSide::Buy);
        if buy_volume.is_positive() {
            let base_available = taker.venue.available_balance(taker.base());
            let bound = base_available * factor;
            let hedge = taker
                .venue
                .quantize_amount(&taker.trading_pair, Size::new(buy_volume.inner().min(bound)));
            if hedge.is_positive() {
                out.push(HedgeProposal {
                    maker_side: OrderSide::Buy,
                    taker_side: OrderSide::Sell,
                    amount: hedge,
                    fill_volume: buy_volume,
                });
            }
        }

        // Maker sells hedge as taker buys, bounded by taker quote balance
        // at the cost of buying the volume back.
        let sell_volume = self.pending_volume(pair.id, OrderSide::Sell);
        if sell_volume.is_positive() {
            let vwap = taker
                .venue
                .vwap_for_volume(&taker.trading_pair, true, sell_volume)
                .map(|v| v.result_price)
                .or_else(|| taker.venue.best_price(&taker.trading_pair, true));
            if let Some(vwap) = vwap.filter(|p| p.is_positive()) {
                let quote_available = taker.venue.available_balance(taker.quote());
                let bound = quote_available / vwap.inner() * factor;
                let hedge = taker.venue.quantize_amount(
                    &taker.trading_pair,
                    Size::new(sell_volume.inner().min(bound)),
                );
                if hedge.is_positive() {
                    out.push(HedgeProposal {
                        maker_side: OrderSide::Sell,
                        taker_side: OrderSide::Buy,
                        amount: hedge,
                        fill_volume: sell_volume,
                    });
                }
            }
        }

        out
    }

    /// Empty one bucket after its hedge was accepted by the venue.
    pub fn clear(&mut self, pair: PairId, maker_side: OrderSide) {
        let bucket = match maker_side {
            OrderSide::Buy => self.buy_fills.get_mut(&pair),
            OrderSide::Sell => self.sell_fills.get_mut(&pair),
        };
        if let Some(bucket) = bucket {
            bucket.clear();
        }
    }
}

impl FillRecord {
    /// Notional of this fill at its execution price.
    pub fn notional(&self) -> Decimal {
        self.amount.notional(self.price)
    }
}
