//! Order-book snapshot with depth-weighted price queries.
//!
//! The engine never mutates a book; it takes read-only snapshots per call
//! and accepts whatever staleness the venue adapter delivers.

use serde::{Deserialize, Serialize};
use xemm_core::{Price, Size};

/// One price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Size,
}

impl BookLevel {
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }
}

/// Result of a VWAP query against one side of the book.
///
/// `result_volume` may fall short of `query_volume` when the book is
/// shallower than the requested depth; the price then covers only what
/// was actually available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VwapResult {
    pub query_volume: Size,
    pub result_volume: Size,
    pub result_price: Price,
}

/// L2 order-book snapshot: bids descending, asks ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    bids: Vec<BookLevel>,
    asks: Vec<BookLevel>,
}

impl OrderBook {
    /// Build a book from unsorted levels. Zero-size levels are dropped.
    pub fn new(mut bids: Vec<BookLevel>, mut asks: Vec<BookLevel>) -> Self {
        bids.retain(|l| l.size.is_positive());
        asks.retain(|l| l.size.is_positive());
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self { bids, asks }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|l| l.price)
    }

    pub fn mid_price(&self) -> Option<Price> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(Price::new((bid.inner() + ask.inner()) / rust_decimal::Decimal::TWO))
    }

    /// Levels a buy (asks) or sell (bids) would consume, top first.
    fn consuming_side(&self, is_buy: bool) -> &[BookLevel] {
        if is_buy {
            &self.asks
        } else {
            &self.bids
        }
    }

    /// Total resting volume on the side a buy/sell would consume.
    pub fn side_volume(&self, is_buy: bool) -> Size {
        self.consuming_side(is_buy)
            .iter()
            .fold(Size::ZERO, |acc, l| acc + l.size)
    }

    /// Volume-weighted average fill price for consuming `volume` from the
    /// top of the book. `None` when the touched side is empty.
    pub fn vwap_for_volume(&self, is_buy: bool, volume: Size) -> Option<VwapResult> {
        let side = self.consuming_side(is_buy);
        if side.is_empty() || !volume.is_positive() {
            return None;
        }

        let mut remaining = volume;
        let mut filled = Size::ZERO;
        let mut quote = rust_decimal::Decimal::ZERO;
        for level in side {
            let take = if level.size < remaining {
                level.size
            } else {
                remaining
            };
            filled = filled + take;
            quote += take.notional(level.price);
            remaining = remaining - take;
            if remaining.is_zero() {
                break;
            }
        }

        if filled.is_zero() {
            return None;
        }
        Some(VwapResult {
            query_volume: volume,
            result_volume: filled,
            result_price: Price::new(quote / filled.inner()),
        })
    }

    /// Worst level price needed to clear `volume` from the top of the book.
    ///
    /// When the book is shallower than `volume`, returns the deepest level
    /// touched. `None` on an empty side.
    pub fn price_for_volume(&self, is_buy: bool, volume: Size) -> Option<Price> {
        let side = self.consuming_side(is_buy);
        if side.is_empty() {
            return None;
        }
        if !volume.is_positive() {
            return Some(side[0].price);
        }

        let mut cumulative = Size::ZERO;
        for level in side {
            cumulative = cumulative + level.size;
            if cumulative >= volume {
                return Some(level.price);
            }
        }
        side.last().map(|l| l.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> OrderBook {
        OrderBook::new(
            vec![
                BookLevel::new(Price::new(dec!(99.5)), Size::new(dec!(1))),
                BookLevel::new(Price::new(dec!(99.0)), Size::new(dec!(2))),
            ],
            vec![
                BookLevel::new(Price::new(dec!(100.5)), Size::new(dec!(1))),
                BookLevel::new(Price::new(dec!(101.0)), Size::new(dec!(2))),
            ],
        )
    }

    #[test]
    fn test_tops() {
        let b = book();
        assert_eq!(b.best_bid().unwrap().inner(), dec!(99.5));
        assert_eq!(b.best_ask().unwrap().inner(), dec!(100.5));
        assert_eq!(b.mid_price().unwrap().inner(), dec!(100));
    }

    #[test]
    fn test_vwap_single_level() {
        let b = book();
        let v = b.vwap_for_volume(true, Size::new(dec!(1))).unwrap();
        assert_eq!(v.result_price.inner(), dec!(100.5));
        assert_eq!(v.result_volume.inner(), dec!(1));
    }

    #[test]
    fn test_vwap_spans_levels() {
        let b = book();
        // 1 @ 100.5 + 1 @ 101.0 = 201.5 / 2
        let v = b.vwap_for_volume(true, Size::new(dec!(2))).unwrap();
        assert_eq!(v.result_price.inner(), dec!(100.75));
    }

    #[test]
    fn test_vwap_shallow_book_partial() {
        let b = book();
        let v = b.vwap_for_volume(false, Size::new(dec!(10))).unwrap();
        assert_eq!(v.result_volume.inner(), dec!(3));
        // (1*99.5 + 2*99.0) / 3
        assert_eq!(v.result_price.inner().round_dp(6), dec!(99.166667));
    }

    #[test]
    fn test_vwap_empty_side() {
        let b = OrderBook::new(vec![], vec![]);
        assert!(b.vwap_for_volume(true, Size::new(dec!(1))).is_none());
        assert!(b.vwap_for_volume(false, Size::new(dec!(1))).is_none());
    }

    #[test]
    fn test_price_for_volume() {
        let b = book();
        assert_eq!(
            b.price_for_volume(true, Size::new(dec!(0.5))).unwrap().inner(),
            dec!(100.5)
        );
        assert_eq!(
            b.price_for_volume(true, Size::new(dec!(2))).unwrap().inner(),
            dec!(101.0)
        );
        // Deeper than the book: worst touched level
        assert_eq!(
            b.price_for_volume(true, Size::new(dec!(50))).unwrap().inner(),
            dec!(101.0)
        );
    }

    #[test]
    fn test_side_volume() {
        let b = book();
        assert_eq!(b.side_volume(true).inner(), dec!(3));
        assert_eq!(b.side_volume(false).inner(), dec!(3));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let b = OrderBook::new(
            vec![
                BookLevel::new(Price::new(dec!(98)), Size::new(dec!(1))),
                BookLevel::new(Price::new(dec!(99)), Size::new(dec!(1))),
            ],
            vec![
                BookLevel::new(Price::new(dec!(102)), Size::new(dec!(1))),
                BookLevel::new(Price::new(dec!(101)), Size::new(dec!(1))),
            ],
        );
        assert_eq!(b.best_bid().unwrap().inner(), dec!(99));
        assert_eq!(b.best_ask().unwrap().inner(), dec!(101));
    }
}
