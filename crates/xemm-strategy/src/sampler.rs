//! Maker top-of-book sampling for drift suppression.
//!
//! Keeps a short sliding window of top-bid/top-ask snapshots per pair and
//! reports a smoothed inside market: the widest bid and narrowest ask seen
//! across the window and the current quote. The asymmetry is deliberate —
//! a transient spike or momentarily empty book must not look like genuine
//! drift and trigger a re-price.

use crate::pair::MarketLeg;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use xemm_core::{PairId, Price, Size};
use xemm_venue::Venue;

/// Maximum samples retained per side.
pub const SAMPLE_WINDOW: usize = 12;

/// Minimum spacing between samples.
pub const SAMPLE_INTERVAL_MS: u64 = 5_000;

#[derive(Debug, Default)]
struct PairSamples {
    bids: VecDeque<Price>,
    asks: VecDeque<Price>,
    last_slot: Option<u64>,
}

/// Sliding-window sampler of maker top-of-book quotes.
#[derive(Debug, Default)]
pub struct PriceSampler {
    pairs: HashMap<PairId, PairSamples>,
}

impl PriceSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one (top bid, top ask) snapshot if the 5-second slot has
    /// advanced since the last sample for this pair.
    pub fn maybe_sample(&mut self, pair: PairId, top: (Price, Price), now_ms: u64) {
        let slot = now_ms / SAMPLE_INTERVAL_MS;
        let samples = self.pairs.entry(pair).or_default();
        if samples.last_slot.is_some_and(|last| slot <= last) {
            return;
        }
        samples.last_slot = Some(slot);
        if samples.bids.len() == SAMPLE_WINDOW {
            samples.bids.pop_front();
        }
        if samples.asks.len() == SAMPLE_WINDOW {
            samples.asks.pop_front();
        }
        samples.bids.push_back(top.0);
        samples.asks.push_back(top.1);
    }

    /// Smoothed inside market: max over sampled bids and the current bid,
    /// min over sampled asks and the current ask.
    pub fn smoothed_top(&self, pair: PairId, current: (Price, Price)) -> (Price, Price) {
        match self.pairs.get(&pair) {
            None => current,
            Some(samples) => {
                let bid = samples
                    .bids
                    .iter()
                    .copied()
                    .chain(std::iter::once(current.0))
                    .max()
                    .expect("iterator includes current");
                let ask = samples
                    .asks
                    .iter()
                    .copied()
                    .chain(std::iter::once(current.1))
                    .min()
                    .expect("iterator includes current");
                (bid, ask)
            }
        }
    }

    #[cfg(test)]
    fn sample_count(&self, pair: PairId) -> usize {
        self.pairs.get(&pair).map(|s| s.bids.len()).unwrap_or(0)
    }
}

/// Current top of book for a leg, depth-tolerant.
///
/// With zero tolerance this is the best quote on each side; otherwise the
/// worst price needed to clear the configured depth volume.
pub fn top_of_book(leg: &MarketLeg, depth_tolerance: Decimal) -> Option<(Price, Price)> {
    if depth_tolerance.is_zero() {
        let bid = leg.venue.best_price(&leg.trading_pair, false)?;
        let ask = leg.venue.best_price(&leg.trading_pair, true)?;
        Some((bid, ask))
    } else {
        let depth = Size::new(depth_tolerance);
        let bid = leg
            .venue
            .price_for_volume(&leg.trading_pair, false, depth)?;
        let ask = leg.venue.price_for_volume(&leg.trading_pair, true, depth)?;
        Some((bid, ask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn p(value: Decimal) -> Price {
        Price::new(value)
    }

    const PAIR: PairId = PairId(0);

    #[test]
    fn test_one_sample_per_slot() {
        let mut sampler = PriceSampler::new();
        sampler.maybe_sample(PAIR, (p(dec!(100)), p(dec!(101))), 0);
        sampler.maybe_sample(PAIR, (p(dec!(100.5)), p(dec!(101.5))), 4_999);
        assert_eq!(sampler.sample_count(PAIR), 1);

        sampler.maybe_sample(PAIR, (p(dec!(100.5)), p(dec!(101.5))), 5_000);
        assert_eq!(sampler.sample_count(PAIR), 2);
    }

    #[test]
    fn test_window_bounded() {
        let mut sampler = PriceSampler::new();
        for i in 0..(SAMPLE_WINDOW as u64 + 8) {
            sampler.maybe_sample(
                PAIR,
                (p(dec!(100)), p(dec!(101))),
                i * SAMPLE_INTERVAL_MS,
            );
        }
        assert_eq!(sampler.sample_count(PAIR), SAMPLE_WINDOW);
    }

    #[test]
    fn test_eviction_forgets_old_extremes() {
        let mut sampler = PriceSampler::new();
        // One extreme sample, then a full window of flat quotes
        sampler.maybe_sample(PAIR, (p(dec!(105)), p(dec!(95))), 0);
        for i in 1..=(SAMPLE_WINDOW as u64) {
            sampler.maybe_sample(
                PAIR,
                (p(dec!(100)), p(dec!(101))),
                i * SAMPLE_INTERVAL_MS,
            );
        }
        let (bid, ask) = sampler.smoothed_top(PAIR, (p(dec!(100)), p(dec!(101))));
        assert_eq!(bid.inner(), dec!(100));
        assert_eq!(ask.inner(), dec!(101));
    }

    #[test]
    fn test_smoothing_is_conservative() {
        let mut sampler = PriceSampler::new();
        sampler.maybe_sample(PAIR, (p(dec!(100)), p(dec!(101))), 0);
        sampler.maybe_sample(PAIR, (p(dec!(100.4)), p(dec!(100.9))), 5_000);

        // Current bid dipped and ask spiked: the window wins on both sides
        let (bid, ask) = sampler.smoothed_top(PAIR, (p(dec!(99.8)), p(dec!(101.2))));
        assert_eq!(bid.inner(), dec!(100.4));
        assert_eq!(ask.inner(), dec!(100.9));

        // Current quote at a new extreme is taken as-is
        let (bid, ask) = sampler.smoothed_top(PAIR, (p(dec!(100.6)), p(dec!(100.7))));
        assert_eq!(bid.inner(), dec!(100.6));
        assert_eq!(ask.inner(), dec!(100.7));
    }

    #[test]
    fn test_smoothed_bid_never_below_current_ask_never_above() {
        let mut sampler = PriceSampler::new();
        sampler.maybe_sample(PAIR, (p(dec!(99)), p(dec!(102))), 0);
        let current = (p(dec!(100)), p(dec!(101)));
        let (bid, ask) = sampler.smoothed_top(PAIR, current);
        assert!(bid >= current.0);
        assert!(ask <= current.1);
    }

    #[test]
    fn test_unsampled_pair_passes_current_through() {
        let sampler = PriceSampler::new();
        let current = (p(dec!(10)), p(dec!(11)));
        assert_eq!(sampler.smoothed_top(PAIR, current), current);
    }
}
