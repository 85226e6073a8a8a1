//! Per-tick review of a pair's maker orders.
//!
//! Runs the `(profitability → balance → drift)` checks over every active
//! order, then proposes replacements for sides left unquoted. The review
//! only decides; the strategy executes the resulting cancels and
//! placements, mirroring the venue-facing wrappers in one place.

use crate::config::{LogOptions, StrategyConfig};
use crate::pair::MarketPair;
use crate::pricing::{effective_hedging_price, maker_price};
use crate::sampler::PriceSampler;
use crate::sizing::desired_order_size;
use rust_decimal::Decimal;
use std::fmt;
use tracing::debug;
use xemm_core::{ClientOrderId, OrderSide, Price, Size, TrackedOrder};
use xemm_venue::{FxOracle, Venue};

/// Why an order should be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Hedging the fill would no longer clear the profitability bound.
    Unprofitable,
    /// The fill could not be funded or hedged at current balances.
    InsufficientBalance,
    /// The suggested price moved away from the resting price.
    PriceDrift,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unprofitable => write!(f, "unprofitable"),
            Self::InsufficientBalance => write!(f, "insufficient_balance"),
            Self::PriceDrift => write!(f, "price_drift"),
        }
    }
}

/// A cancel decision for one resting order.
#[derive(Debug, Clone)]
pub struct OrderCancel {
    pub order_id: ClientOrderId,
    pub side: OrderSide,
    pub price: Price,
    pub reason: CancelReason,
}

/// A proposed new maker order.
#[derive(Debug, Clone, Copy)]
pub struct OrderProposal {
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
}

/// Outcome of one pair's per-tick review.
#[derive(Debug, Default)]
pub struct PairReview {
    pub cancels: Vec<OrderCancel>,
    pub creates: Vec<OrderProposal>,
    /// Set when a drift cancel fired this tick; the strategy stores it as
    /// the pair's new anti-hysteresis deadline.
    pub anti_hysteresis_deadline_ms: Option<u64>,
}

/// Review a pair's active maker orders and propose follow-up actions.
///
/// `active_orders` must already exclude orders with a cancel in flight.
/// `hysteresis_deadline_ms` is the pair's current anti-hysteresis
/// deadline; drift cancels are suppressed while `now_ms` has not passed
/// it, and at most one fires per window.
#[allow(clippy::too_many_arguments)]
pub fn review_pair(
    pair: &MarketPair,
    config: &StrategyConfig,
    sampler: &PriceSampler,
    fx: &dyn FxOracle,
    active_orders: &[TrackedOrder],
    has_pending_taker: bool,
    hysteresis_deadline_ms: u64,
    now_ms: u64,
) -> PairReview {
    let mut review = PairReview::default();
    let mut deadline = hysteresis_deadline_ms;
    let margin = Decimal::ONE + config.cancel_threshold();

    for order in active_orders {
        let hedge = effective_hedging_price(pair, fx, order.side, order.quantity);
        let unprofitable = match hedge {
            None => true,
            Some(h) => match order.side {
                OrderSide::Buy => h.inner() < order.price.inner() * margin,
                OrderSide::Sell => order.price.inner() < h.inner() * margin,
            },
        };
        if unprofitable {
            review.cancels.push(OrderCancel {
                order_id: order.id.clone(),
                side: order.side,
                price: order.price,
                reason: CancelReason::Unprofitable,
            });
            continue;
        }

        // Passive-expiry mode leans on venue TTL for everything else.
        if !config.active_order_canceling {
            continue;
        }

        // Balance test: can the fill be funded and hedged right now?
        let (base_balance, quote_balance) = match order.side {
            OrderSide::Buy => (
                pair.taker.venue.balance(pair.taker.base()),
                pair.maker.venue.balance(pair.maker.quote()),
            ),
            OrderSide::Sell => (
                pair.maker.venue.balance(pair.maker.base()),
                pair.taker.venue.balance(pair.taker.quote()),
            ),
        };
        let size_limit = if order.price.is_positive() {
            base_balance.min(quote_balance / order.price.inner())
        } else {
            Decimal::ZERO
        };
        let size_limit = pair
            .maker
            .venue
            .quantize_amount(&pair.maker.trading_pair, Size::new(size_limit));
        if order.quantity > size_limit {
            review.cancels.push(OrderCancel {
                order_id: order.id.clone(),
                side: order.side,
                price: order.price,
                reason: CancelReason::InsufficientBalance,
            });
            continue;
        }

        // Drift test, at most one cancel per anti-hysteresis window.
        if now_ms > deadline {
            if let Some(suggested) =
                maker_price(pair, config, sampler, fx, order.side, order.quantity)
            {
                if suggested != order.price {
                    review.cancels.push(OrderCancel {
                        order_id: order.id.clone(),
                        side: order.side,
                        price: order.price,
                        reason: CancelReason::PriceDrift,
                    });
                    deadline = now_ms + config.anti_hysteresis_duration_secs * 1000;
                    review.anti_hysteresis_deadline_ms = Some(deadline);
                }
            }
        }
    }

    // No new quotes while a hedge is still working on the taker venue.
    if has_pending_taker {
        return review;
    }

    let has_bid = active_orders.iter().any(|o| o.side == OrderSide::Buy);
    let has_ask = active_orders.iter().any(|o| o.side == OrderSide::Sell);

    for (side, present) in [(OrderSide::Buy, has_bid), (OrderSide::Sell, has_ask)] {
        if present {
            continue;
        }
        let size = desired_order_size(pair, config, side);
        if !size.is_positive() {
            if config.logs(LogOptions::NULL_ORDER_SIZE) {
                debug!(pair = %pair.id, side = %side, "Order size is zero, skipping side");
            }
            continue;
        }
        match maker_price(pair, config, sampler, fx, side, size) {
            Some(price) => review.creates.push(OrderProposal { side, price, size }),
            None => {
                if config.logs(LogOptions::NULL_ORDER_SIZE) {
                    debug!(pair = %pair.id, side = %side, "No hedgeable price, skipping side");
                }
            }
        }
    }

    review
}
