//! Maker price derivation from taker hedging cost.
//!
//! A maker quote is only worth resting if filling it can immediately be
//! offset on the taker venue at a profit. Pricing therefore starts from
//! the taker-side VWAP for the hedge size, converts it into maker-quote
//! units, applies the profitability margin, optionally clamps near the top
//! of book, and snaps to the maker price grid — flooring bids and ceiling
//! asks so quantization can never cross the profitability threshold.

use crate::config::{LogOptions, StrategyConfig};
use crate::pair::MarketPair;
use crate::sampler::{top_of_book, PriceSampler};
use rust_decimal::Decimal;
use tracing::debug;
use xemm_core::{OrderSide, Price, Size};
use xemm_venue::{FxOracle, Venue};

/// Taker-side VWAP for hedging a maker order of `size`, in taker quote
/// units. A maker bid is hedged by selling on the taker venue (bids side);
/// a maker ask by buying (asks side). `None` on an empty book.
fn taker_hedge_vwap(pair: &MarketPair, side: OrderSide, size: Size) -> Option<Price> {
    let taker_is_buy = side == OrderSide::Sell;
    pair.taker
        .venue
        .vwap_for_volume(&pair.taker.trading_pair, taker_is_buy, size)
        .map(|v| v.result_price)
}

/// The price at which a maker fill of `size` could be offset right now,
/// in maker-quote units. `None` means the hedge cannot be priced at any
/// size (empty taker book or unknown FX cross).
pub fn effective_hedging_price(
    pair: &MarketPair,
    fx: &dyn FxOracle,
    side: OrderSide,
    size: Size,
) -> Option<Price> {
    let vwap = taker_hedge_vwap(pair, side, size)?;
    if !pair.quote_mismatch() {
        return Some(vwap);
    }
    let rate = fx.rate(pair.taker.quote(), pair.maker.quote())?;
    Some(vwap * rate)
}

/// Tick-aligned maker price for a new or re-evaluated order.
///
/// `None` signals "cannot hedge at any size": no order should rest.
pub fn maker_price(
    pair: &MarketPair,
    config: &StrategyConfig,
    sampler: &PriceSampler,
    fx: &dyn FxOracle,
    side: OrderSide,
    size: Size,
) -> Option<Price> {
    let hedge = effective_hedging_price(pair, fx, side, size)?;
    let quantum = pair
        .maker
        .venue
        .price_quantum(&pair.maker.trading_pair, hedge);
    let margin = Decimal::ONE + config.min_profitability;

    let mut raw = match side {
        OrderSide::Buy => hedge.inner() / margin,
        OrderSide::Sell => hedge.inner() * margin,
    };

    if config.adjust_order_enabled {
        if let Some(current) = top_of_book(&pair.maker, config.top_depth_tolerance) {
            let (top_bid, top_ask) = sampler.smoothed_top(pair.id, current);
            let bound = match side {
                OrderSide::Buy => (top_bid + quantum).inner(),
                // Asymmetric on purpose: an ask implied tighter than one
                // tick inside the market is raised back out to that tick.
                OrderSide::Sell => (top_ask - quantum).inner(),
            };
            let clamped = match side {
                OrderSide::Buy => raw.min(bound),
                OrderSide::Sell => raw.max(bound),
            };
            if clamped != raw && config.logs(LogOptions::ADJUST_ORDER) {
                debug!(
                    pair = %pair.id,
                    side = %side,
                    raw = %raw,
                    adjusted = %clamped,
                    "Maker price adjusted to top of book"
                );
            }
            raw = clamped;
        }
    }

    let price = Price::new(raw);
    Some(match side {
        OrderSide::Buy => price.floor_to_quantum(quantum),
        OrderSide::Sell => price.ceil_to_quantum(quantum),
    })
}
