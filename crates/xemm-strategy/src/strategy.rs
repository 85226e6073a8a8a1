//! Strategy core: clock-tick entry, event dispatch, order wrappers.
//!
//! Owns all mutable strategy state (order stores, fill buckets, price
//! samples, anti-hysteresis timers) and mutates it only on the tick/event
//! thread. Each tick fans out over the configured pairs; a failure in one
//! pair is logged and never stops the others.

use crate::config::{LogOptions, StrategyConfig};
use crate::error::{Result, StrategyError};
use crate::hedger::{FillHedger, FillRecord};
use crate::orders::ActiveOrderStore;
use crate::pair::MarketPair;
use crate::pair_tracker::PairOrderTracker;
use crate::sampler::{top_of_book, PriceSampler};
use crate::supervisor::{self, OrderCancel, OrderProposal};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use xemm_core::{
    OrderCancelledEvent, OrderCompletedEvent, OrderFilledEvent, OrderType, PairId, TrackedOrder,
    VenueEvent,
};
use xemm_venue::{FxOracle, NetworkStatus, OrderRequest, Venue};

/// Cross-exchange market-making strategy.
pub struct XemmStrategy {
    config: StrategyConfig,
    pairs: Vec<MarketPair>,
    fx: Arc<dyn FxOracle>,
    pair_tracker: PairOrderTracker,
    orders: ActiveOrderStore,
    sampler: PriceSampler,
    hedger: FillHedger,
    anti_hysteresis: HashMap<PairId, u64>,
    all_venues_ready: bool,
    last_timestamp_ms: u64,
    last_conn_warning_ms: u64,
}

impl XemmStrategy {
    /// Build a strategy over the configured pairs.
    ///
    /// Fails on out-of-range configuration, an empty pair list, or
    /// duplicate pair handles.
    pub fn new(
        config: StrategyConfig,
        pairs: Vec<MarketPair>,
        fx: Arc<dyn FxOracle>,
    ) -> Result<Self> {
        config.validate()?;
        if pairs.is_empty() {
            return Err(StrategyError::NoPairs);
        }
        let mut seen = HashSet::new();
        for pair in &pairs {
            if !seen.insert(pair.id) {
                return Err(StrategyError::DuplicatePair(pair.id));
            }
        }

        Ok(Self {
            config,
            pairs,
            fx,
            pair_tracker: PairOrderTracker::new(),
            orders: ActiveOrderStore::new(),
            sampler: PriceSampler::new(),
            hedger: FillHedger::new(),
            anti_hysteresis: HashMap::new(),
            all_venues_ready: false,
            last_timestamp_ms: 0,
            last_conn_warning_ms: 0,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn last_timestamp_ms(&self) -> u64 {
        self.last_timestamp_ms
    }

    /// Clock entry. Called with a monotonic timestamp.
    pub fn tick(&mut self, now_ms: u64) {
        self.pair_tracker.prune(now_ms);

        // Readiness is re-evaluated every tick: a venue can drop back out
        // of ready state (reconnect, lost snapshot) at any time.
        let ready = self
            .pairs
            .iter()
            .all(|p| p.maker.venue.is_ready() && p.taker.venue.is_ready());
        if !ready {
            if self.all_venues_ready {
                self.all_venues_ready = false;
                warn!("A venue dropped out of ready state. Market making paused.");
            } else {
                warn!("Venues are not ready. No maker orders will be placed.");
            }
            self.last_timestamp_ms = now_ms;
            return;
        }
        if !self.all_venues_ready {
            self.all_venues_ready = true;
            info!("All venues ready. Market making started.");
        }

        let disconnected = self.pairs.iter().any(|p| {
            p.maker.venue.network_status() != NetworkStatus::Connected
                || p.taker.venue.network_status() != NetworkStatus::Connected
        });
        if disconnected {
            let interval_ms = self.config.status_report_interval_secs * 1000;
            if now_ms.saturating_sub(self.last_conn_warning_ms) >= interval_ms {
                warn!("A venue is disconnected. Order submissions may fail until it reconnects.");
                self.last_conn_warning_ms = now_ms;
            }
        }

        for idx in 0..self.pairs.len() {
            let pair = self.pairs[idx].clone();
            if let Err(e) = self.process_pair(&pair, now_ms) {
                error!(pair = %pair.id, error = %e, "Pair processing failed; continuing");
            }
        }

        self.last_timestamp_ms = now_ms;
    }

    /// One pair's share of the tick: sample, retry hedges, review orders,
    /// then act on the review.
    fn process_pair(&mut self, pair: &MarketPair, now_ms: u64) -> Result<()> {
        if let Some(top) = top_of_book(&pair.maker, self.config.top_depth_tolerance) {
            self.sampler.maybe_sample(pair.id, top, now_ms);
        }

        self.drain_hedges(pair, now_ms)?;

        let active = self.orders.maker_orders_for(pair.id);
        let deadline = self.anti_hysteresis.get(&pair.id).copied().unwrap_or(0);
        let review = supervisor::review_pair(
            pair,
            &self.config,
            &self.sampler,
            self.fx.as_ref(),
            &active,
            self.orders.has_taker_orders(pair.id),
            deadline,
            now_ms,
        );

        if let Some(new_deadline) = review.anti_hysteresis_deadline_ms {
            self.anti_hysteresis.insert(pair.id, new_deadline);
        }
        for cancel in &review.cancels {
            self.cancel_maker_order(pair, cancel);
        }
        for proposal in &review.creates {
            self.place_maker_order(pair, proposal, now_ms)?;
        }
        Ok(())
    }

    /// Submit taker market orders for any non-empty fill buckets. Buckets
    /// clear only once the venue accepts; a rejection leaves them for the
    /// next attempt.
    fn drain_hedges(&mut self, pair: &MarketPair, _now_ms: u64) -> Result<()> {
        if !self.hedger.has_pending(pair.id) {
            return Ok(());
        }
        for proposal in self.hedger.proposals(pair, &self.config) {
            let request = OrderRequest::market(
                pair.taker.trading_pair.clone(),
                proposal.taker_side,
                proposal.amount,
            );
            let id = pair.taker.venue.submit_order(request)?;
            self.pair_tracker.start_tracking(id.clone(), pair.id);
            self.orders.insert_taker(id.clone(), pair.id);
            self.hedger.clear(pair.id, proposal.maker_side);

            if proposal.amount < proposal.fill_volume {
                warn!(
                    pair = %pair.id,
                    hedged = %proposal.amount,
                    filled = %proposal.fill_volume,
                    "Hedge is smaller than the filled volume; residual exposure accepted"
                );
            }
            if self.config.logs(LogOptions::MAKER_ORDER_HEDGED) {
                info!(
                    pair = %pair.id,
                    order_id = %id,
                    side = %proposal.taker_side,
                    amount = %proposal.amount,
                    "Taker hedge submitted"
                );
            }
        }
        Ok(())
    }

    /// Place a maker limit order per the review proposal. In passive-expiry
    /// mode the venue-side TTL is attached so the order cancels itself.
    fn place_maker_order(
        &mut self,
        pair: &MarketPair,
        proposal: &OrderProposal,
        now_ms: u64,
    ) -> Result<()> {
        let mut request = OrderRequest::limit(
            pair.maker.trading_pair.clone(),
            proposal.side,
            proposal.size,
            proposal.price,
        );
        if !self.config.active_order_canceling {
            request = request.with_expiration(self.config.limit_order_min_expiration_secs);
        }

        let id = pair.maker.venue.submit_order(request)?;
        self.pair_tracker.start_tracking(id.clone(), pair.id);
        self.orders.insert_maker(TrackedOrder {
            id: id.clone(),
            pair: pair.id,
            side: proposal.side,
            price: proposal.price,
            quantity: proposal.size,
            created_at_ms: now_ms,
        });

        if self.config.logs(LogOptions::CREATE_ORDER) {
            info!(
                pair = %pair.id,
                order_id = %id,
                side = %proposal.side,
                price = %proposal.price,
                size = %proposal.size,
                "Maker order created"
            );
        }
        Ok(())
    }

    /// Fire-and-forget cancel. The order is hidden from review until the
    /// cancellation event confirms.
    fn cancel_maker_order(&mut self, pair: &MarketPair, cancel: &OrderCancel) {
        if self.config.logs(LogOptions::REMOVING_ORDER) {
            info!(
                pair = %pair.id,
                order_id = %cancel.order_id,
                side = %cancel.side,
                price = %cancel.price,
                reason = %cancel.reason,
                "Cancelling maker order"
            );
        }
        self.orders.mark_cancel_in_flight(&cancel.order_id);
        pair.maker
            .venue
            .cancel_order(&pair.maker.trading_pair, &cancel.order_id);
    }

    fn pair_by_id(&self, id: PairId) -> Option<MarketPair> {
        self.pairs.iter().find(|p| p.id == id).cloned()
    }

    /// Dispatch one venue event to the matching handler.
    pub fn process_event(&mut self, event: &VenueEvent) {
        match event {
            VenueEvent::Filled(e) => self.did_fill_order(e),
            VenueEvent::BuyCompleted(e) => self.did_complete_buy_order(e),
            VenueEvent::SellCompleted(e) => self.did_complete_sell_order(e),
            VenueEvent::Cancelled(e) => self.did_cancel_order(e),
        }
    }

    /// A fill arrived. Maker (limit) fills enter the hedging pipeline;
    /// taker (market) fills are only logged. Unknown ids are dropped —
    /// the expected path for orders outside this strategy.
    pub fn did_fill_order(&mut self, event: &OrderFilledEvent) {
        let Some(pair_id) = self.pair_tracker.lookup(&event.order_id) else {
            return;
        };

        match event.order_type {
            OrderType::Limit => {
                if self.config.logs(LogOptions::MAKER_ORDER_FILLED) {
                    info!(
                        pair = %pair_id,
                        order_id = %event.order_id,
                        side = %event.trade_type,
                        amount = %event.amount,
                        price = %event.price,
                        "Maker order filled"
                    );
                }
                let order_price = self
                    .orders
                    .maker_order(&event.order_id)
                    .map(|o| o.price)
                    .unwrap_or(event.price);
                self.hedger.record_fill(
                    pair_id,
                    FillRecord {
                        side: event.trade_type,
                        amount: event.amount,
                        price: event.price,
                        order_price,
                        timestamp_ms: event.timestamp_ms,
                    },
                );
                if let Some(pair) = self.pair_by_id(pair_id) {
                    if let Err(e) = self.drain_hedges(&pair, event.timestamp_ms) {
                        error!(
                            pair = %pair.id,
                            error = %e,
                            "Hedge submission failed; fills stay buffered"
                        );
                    }
                }
            }
            OrderType::Market => {
                debug!(
                    pair = %pair_id,
                    order_id = %event.order_id,
                    amount = %event.amount,
                    price = %event.price,
                    "Taker hedge filled"
                );
            }
        }
    }

    pub fn did_complete_buy_order(&mut self, event: &OrderCompletedEvent) {
        self.complete_order(event);
    }

    pub fn did_complete_sell_order(&mut self, event: &OrderCompletedEvent) {
        self.complete_order(event);
    }

    fn complete_order(&mut self, event: &OrderCompletedEvent) {
        let Some(pair_id) = self.pair_tracker.lookup(&event.order_id) else {
            return;
        };
        if self.orders.remove_maker(&event.order_id).is_some() {
            debug!(pair = %pair_id, order_id = %event.order_id, "Maker order completed");
        }
        if self.orders.remove_taker(&event.order_id).is_some() {
            debug!(pair = %pair_id, order_id = %event.order_id, "Taker hedge completed");
        }
        self.pair_tracker
            .stop_tracking(&event.order_id, event.timestamp_ms);
    }

    pub fn did_cancel_order(&mut self, event: &OrderCancelledEvent) {
        let Some(pair_id) = self.pair_tracker.lookup(&event.order_id) else {
            return;
        };
        if self.orders.remove_maker(&event.order_id).is_some() {
            debug!(pair = %pair_id, order_id = %event.order_id, "Maker order cancellation confirmed");
        }
        self.pair_tracker
            .stop_tracking(&event.order_id, event.timestamp_ms);
    }

    /// Human-readable snapshot of markets, balances, and open orders.
    pub fn format_status(&self) -> String {
        let mut out = String::new();
        for pair in &self.pairs {
            let _ = writeln!(
                out,
                "  {}: maker {}@{} / taker {}@{}",
                pair.id,
                pair.maker.trading_pair,
                pair.maker.venue.name(),
                pair.taker.trading_pair,
                pair.taker.venue.name(),
            );

            for (label, leg) in [("maker", &pair.maker), ("taker", &pair.taker)] {
                let bid = leg
                    .venue
                    .best_price(&leg.trading_pair, false)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let ask = leg
                    .venue
                    .best_price(&leg.trading_pair, true)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(
                    out,
                    "    {label} book: bid {bid} / ask {ask}  balances: {} {} / {} {}",
                    leg.venue.available_balance(leg.base()),
                    leg.base(),
                    leg.venue.available_balance(leg.quote()),
                    leg.quote(),
                );
            }

            let orders = self.orders.all_maker_orders_for(pair.id);
            if orders.is_empty() {
                let _ = writeln!(out, "    no active maker orders");
            } else {
                for order in orders {
                    let age_s = order.age_ms(self.last_timestamp_ms) / 1000;
                    let flag = if self.orders.has_in_flight_cancel(&order.id) {
                        " (cancelling)"
                    } else {
                        ""
                    };
                    let _ = writeln!(
                        out,
                        "    {} {} @ {} age {}s{}",
                        order.side, order.quantity, order.price, age_s, flag,
                    );
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::MarketLeg;
    use rust_decimal_macros::dec;
    use xemm_core::{ClientOrderId, OrderSide, Price, Size, TradingPair};
    use xemm_venue::{FixedRateOracle, PaperVenue};

    fn fixture() -> (XemmStrategy, Arc<PaperVenue>, Arc<PaperVenue>) {
        let maker = Arc::new(PaperVenue::new("maker"));
        let taker = Arc::new(PaperVenue::new("taker"));
        let tp = TradingPair::new("ETH", "USDT");
        maker.set_book(tp.clone(), vec![(dec!(100.0), dec!(50))], vec![(dec!(101.0), dec!(50))]);
        taker.set_book(tp.clone(), vec![(dec!(99.5), dec!(50))], vec![(dec!(100.5), dec!(50))]);
        maker.set_quantization(tp.clone(), dec!(0.01), dec!(0.01));
        taker.set_quantization(tp.clone(), dec!(0.01), dec!(0.01));
        for venue in [&maker, &taker] {
            venue.set_balance("ETH", dec!(1000), dec!(1000));
            venue.set_balance("USDT", dec!(100000), dec!(100000));
        }
        let pair = MarketPair::new(
            PairId::new(0),
            MarketLeg::new(maker.clone(), tp.clone()),
            MarketLeg::new(taker.clone(), tp),
        );
        let strategy = XemmStrategy::new(
            StrategyConfig {
                min_profitability: dec!(0.01),
                order_amount: dec!(1),
                ..Default::default()
            },
            vec![pair],
            Arc::new(FixedRateOracle::new()),
        )
        .unwrap();
        (strategy, maker, taker)
    }

    #[test]
    fn test_construction_rejects_empty_pairs() {
        let result = XemmStrategy::new(
            StrategyConfig::default(),
            vec![],
            Arc::new(FixedRateOracle::new()),
        );
        assert!(matches!(result, Err(StrategyError::NoPairs)));
    }

    #[test]
    fn test_construction_rejects_duplicate_handles() {
        let maker = Arc::new(PaperVenue::new("maker"));
        let taker = Arc::new(PaperVenue::new("taker"));
        let tp = TradingPair::new("ETH", "USDT");
        let mk_pair = || {
            MarketPair::new(
                PairId::new(1),
                MarketLeg::new(maker.clone(), tp.clone()),
                MarketLeg::new(taker.clone(), tp.clone()),
            )
        };
        let result = XemmStrategy::new(
            StrategyConfig::default(),
            vec![mk_pair(), mk_pair()],
            Arc::new(FixedRateOracle::new()),
        );
        assert!(matches!(result, Err(StrategyError::DuplicatePair(_))));
    }

    #[test]
    fn test_no_orders_until_venues_ready() {
        let (mut strategy, maker, _taker) = fixture();
        maker.set_ready(false);

        strategy.tick(1_000);
        assert!(maker.open_orders().is_empty());
        assert_eq!(strategy.last_timestamp_ms(), 1_000);

        maker.set_ready(true);
        strategy.tick(2_000);
        assert_eq!(maker.open_orders().len(), 2);
    }

    #[test]
    fn test_ready_drop_pauses_engine() {
        let (mut strategy, maker, taker) = fixture();
        strategy.tick(1_000);
        assert_eq!(maker.open_orders().len(), 2);

        // The taker drops out of ready state; even though its book goes
        // empty (which would cancel everything), the engine is paused.
        taker.set_ready(false);
        taker.set_book(TradingPair::new("ETH", "USDT"), vec![], vec![]);
        strategy.tick(2_000);
        assert_eq!(maker.open_orders().len(), 2);

        // Back to ready: the empty taker book now cancels both orders.
        taker.set_ready(true);
        strategy.tick(3_000);
        assert!(maker.open_orders().is_empty());
    }

    #[test]
    fn test_at_most_one_order_per_side_across_ticks() {
        let (mut strategy, maker, _taker) = fixture();
        for t in 1..=5u64 {
            strategy.tick(t * 1_000);
            let orders = maker.open_orders();
            let bids = orders.iter().filter(|o| o.side == OrderSide::Buy).count();
            let asks = orders.iter().filter(|o| o.side == OrderSide::Sell).count();
            assert!(bids <= 1, "tick {t}: {bids} bids");
            assert!(asks <= 1, "tick {t}: {asks} asks");
        }
    }

    #[test]
    fn test_unknown_event_ids_dropped_silently() {
        let (mut strategy, _maker, _taker) = fixture();
        let foreign = ClientOrderId::generate(OrderSide::Buy);
        strategy.did_fill_order(&OrderFilledEvent {
            order_id: foreign.clone(),
            trade_type: OrderSide::Buy,
            order_type: OrderType::Limit,
            amount: Size::new(dec!(1)),
            price: Price::new(dec!(100)),
            timestamp_ms: 0,
        });
        strategy.did_cancel_order(&OrderCancelledEvent {
            order_id: foreign,
            timestamp_ms: 0,
        });
        // No buckets were touched
        assert!(!strategy.hedger.has_pending(PairId::new(0)));
    }

    #[test]
    fn test_format_status_mentions_orders() {
        let (mut strategy, _maker, _taker) = fixture();
        strategy.tick(1_000);
        let status = strategy.format_status();
        assert!(status.contains("pair_0"));
        assert!(status.contains("buy"));
        assert!(status.contains("sell"));
    }
}
