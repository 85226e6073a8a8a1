//! Order sizing.
//!
//! Produces the base-unit size for a new maker order, honoring (in order)
//! the user's absolute override or the portfolio-ratio cap, the maker size
//! grid, and the side-specific balance and taker-liquidity caps. A zero
//! result means "skip this side this tick" and is never an error.

use crate::config::StrategyConfig;
use crate::pair::MarketPair;
use rust_decimal::Decimal;
use xemm_core::{OrderSide, Size};
use xemm_venue::Venue;

/// Desired size for a new maker order on `side`.
pub fn desired_order_size(pair: &MarketPair, config: &StrategyConfig, side: OrderSide) -> Size {
    let maker = &pair.maker;
    let taker = &pair.taker;

    // User override, or portfolio value times the ratio cap.
    let base_amount = if config.order_amount > Decimal::ZERO {
        config.order_amount
    } else {
        let bid = maker.venue.best_price(&maker.trading_pair, false);
        let ask = maker.venue.best_price(&maker.trading_pair, true);
        let mid = match (bid, ask) {
            (Some(b), Some(a)) => (b.inner() + a.inner()) / Decimal::TWO,
            _ => return Size::ZERO,
        };
        if mid.is_zero() {
            return Size::ZERO;
        }
        let base_balance = maker.venue.balance(maker.base());
        let quote_balance = maker.venue.balance(maker.quote());
        (base_balance + quote_balance / mid) * config.order_size_portfolio_ratio_limit
    };

    let base = maker
        .venue
        .quantize_amount(&maker.trading_pair, Size::new(base_amount));
    if !base.is_positive() {
        return Size::ZERO;
    }

    // Hedge cost per base unit on the taker side that would absorb the
    // fill, falling back to the top quote when the depth query fails.
    let taker_is_buy = side == OrderSide::Sell;
    let vwap = taker
        .venue
        .vwap_for_volume(&taker.trading_pair, taker_is_buy, base)
        .map(|v| v.result_price)
        .or_else(|| taker.venue.best_price(&taker.trading_pair, taker_is_buy));
    let vwap = match vwap {
        Some(p) if p.is_positive() => p.inner(),
        _ => return Size::ZERO,
    };

    let balance_factor = config.order_size_taker_balance_factor;
    let hedgeable_volume = taker.venue.side_volume(&taker.trading_pair, taker_is_buy);
    let liquidity_cap = hedgeable_volume.inner() * config.order_size_taker_volume_factor;

    let capped = match side {
        OrderSide::Buy => {
            let maker_quote = maker.venue.available_balance(maker.quote());
            let taker_base = taker.venue.available_balance(taker.base());
            (maker_quote / vwap)
                .min(taker_base * balance_factor)
                .min(liquidity_cap)
                .min(base.inner())
        }
        OrderSide::Sell => {
            let maker_base = maker.venue.available_balance(maker.base());
            let taker_quote = taker.venue.available_balance(taker.quote());
            maker_base
                .min(taker_quote / vwap * balance_factor)
                .min(liquidity_cap)
                .min(base.inner())
        }
    };

    if capped <= Decimal::ZERO {
        return Size::ZERO;
    }
    maker
        .venue
        .quantize_amount(&maker.trading_pair, Size::new(capped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::MarketLeg;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use xemm_core::{PairId, TradingPair};
    use xemm_venue::PaperVenue;

    fn setup() -> (MarketPair, Arc<PaperVenue>, Arc<PaperVenue>) {
        let maker = Arc::new(PaperVenue::new("maker"));
        let taker = Arc::new(PaperVenue::new("taker"));
        let tp = TradingPair::new("ETH", "USDT");
        let pair = MarketPair::new(
            PairId::new(0),
            MarketLeg::new(maker.clone(), tp.clone()),
            MarketLeg::new(taker.clone(), tp.clone()),
        );

        maker.set_book(tp.clone(), vec![(dec!(99), dec!(50))], vec![(dec!(101), dec!(50))]);
        taker.set_book(tp.clone(), vec![(dec!(99.5), dec!(50))], vec![(dec!(100.5), dec!(50))]);
        maker.set_quantization(tp.clone(), dec!(0.01), dec!(0.01));
        for venue in [&maker, &taker] {
            venue.set_balance("ETH", dec!(1000), dec!(1000));
            venue.set_balance("USDT", dec!(100000), dec!(100000));
        }
        (pair, maker, taker)
    }

    #[test]
    fn test_order_amount_override() {
        let (pair, _maker, _taker) = setup();
        let config = StrategyConfig {
            order_amount: dec!(2.5),
            ..Default::default()
        };
        assert_eq!(
            desired_order_size(&pair, &config, OrderSide::Buy).inner(),
            dec!(2.5)
        );
    }

    #[test]
    fn test_portfolio_ratio_base() {
        let (pair, maker, _taker) = setup();
        // mid = 100; portfolio = 10 + 1000/100 = 20 ETH; 25% cap = 5
        maker.set_balance("ETH", dec!(10), dec!(10));
        maker.set_balance("USDT", dec!(1000), dec!(1000));
        let config = StrategyConfig {
            order_amount: Decimal::ZERO,
            order_size_portfolio_ratio_limit: dec!(0.25),
            ..Default::default()
        };
        assert_eq!(
            desired_order_size(&pair, &config, OrderSide::Sell).inner(),
            dec!(5)
        );
    }

    #[test]
    fn test_bid_capped_by_maker_quote_balance() {
        let (pair, maker, _taker) = setup();
        // Only 99.5 USDT free on the maker: 99.5 / vwap(99.5) = 1 ETH
        maker.set_balance("USDT", dec!(100000), dec!(99.5));
        let config = StrategyConfig {
            order_amount: dec!(10),
            ..Default::default()
        };
        assert_eq!(
            desired_order_size(&pair, &config, OrderSide::Buy).inner(),
            dec!(1)
        );
    }

    #[test]
    fn test_bid_capped_by_taker_base_balance() {
        let (pair, _maker, taker) = setup();
        taker.set_balance("ETH", dec!(2), dec!(2));
        let config = StrategyConfig {
            order_amount: dec!(10),
            order_size_taker_balance_factor: dec!(0.995),
            ..Default::default()
        };
        // 2 * 0.995 = 1.99
        assert_eq!(
            desired_order_size(&pair, &config, OrderSide::Buy).inner(),
            dec!(1.99)
        );
    }

    #[test]
    fn test_ask_capped_by_maker_base_balance() {
        let (pair, maker, _taker) = setup();
        maker.set_balance("ETH", dec!(1000), dec!(0.5));
        let config = StrategyConfig {
            order_amount: dec!(10),
            ..Default::default()
        };
        assert_eq!(
            desired_order_size(&pair, &config, OrderSide::Sell).inner(),
            dec!(0.5)
        );
    }

    #[test]
    fn test_capped_by_taker_liquidity() {
        let (pair, _maker, taker) = setup();
        let tp = pair.taker.trading_pair.clone();
        // 4 ETH resting on the taker bid side, 25% factor → 1 ETH cap
        taker.set_book(tp, vec![(dec!(99.5), dec!(4))], vec![(dec!(100.5), dec!(50))]);
        let config = StrategyConfig {
            order_amount: dec!(10),
            order_size_taker_volume_factor: dec!(0.25),
            ..Default::default()
        };
        assert_eq!(
            desired_order_size(&pair, &config, OrderSide::Buy).inner(),
            dec!(1)
        );
    }

    #[test]
    fn test_empty_taker_book_yields_zero() {
        let (pair, _maker, taker) = setup();
        taker.set_book(pair.taker.trading_pair.clone(), vec![], vec![]);
        let config = StrategyConfig {
            order_amount: dec!(1),
            ..Default::default()
        };
        assert_eq!(desired_order_size(&pair, &config, OrderSide::Buy), Size::ZERO);
        assert_eq!(desired_order_size(&pair, &config, OrderSide::Sell), Size::ZERO);
    }

    #[test]
    fn test_empty_maker_book_blocks_portfolio_sizing() {
        let (pair, maker, _taker) = setup();
        maker.set_book(pair.maker.trading_pair.clone(), vec![], vec![]);
        let config = StrategyConfig {
            order_amount: Decimal::ZERO,
            ..Default::default()
        };
        assert_eq!(desired_order_size(&pair, &config, OrderSide::Buy), Size::ZERO);
    }

    #[test]
    fn test_result_respects_size_grid() {
        let (pair, maker, _taker) = setup();
        maker.set_quantization(pair.maker.trading_pair.clone(), dec!(0.01), dec!(0.1));
        let config = StrategyConfig {
            order_amount: dec!(1.2345),
            ..Default::default()
        };
        assert_eq!(
            desired_order_size(&pair, &config, OrderSide::Sell).inner(),
            dec!(1.2)
        );
    }
}
