//! Deterministic in-memory venue.
//!
//! Backs the paper-trading binary and the integration tests: books,
//! balances, and quantization grids are seeded directly, limit orders
//! rest until force-filled or cancelled, and market orders execute
//! immediately against the seeded book at VWAP. Every outcome is
//! delivered through the event queue, never synchronously, so the
//! strategy sees the same fire-and-forget surface a live connector gives
//! it.

use crate::book::{BookLevel, OrderBook, VwapResult};
use crate::error::{Result, VenueError};
use crate::venue::{NetworkStatus, OrderRequest, Venue};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use tracing::debug;
use xemm_core::{
    ClientOrderId, OrderCancelledEvent, OrderCompletedEvent, OrderFilledEvent, OrderSide,
    OrderType, Price, Size, TradingPair, VenueEvent,
};

/// A resting paper order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperOrder {
    pub id: ClientOrderId,
    pub pair: TradingPair,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub amount: Size,
    pub price: Option<Price>,
    pub expiration_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default)]
struct AssetBalance {
    total: Decimal,
    available: Decimal,
}

#[derive(Debug, Default)]
struct PaperState {
    ready: bool,
    status_connected: bool,
    clock_ms: u64,
    balances: HashMap<String, AssetBalance>,
    books: HashMap<TradingPair, OrderBook>,
    price_quantums: HashMap<TradingPair, Price>,
    size_steps: HashMap<TradingPair, Size>,
    open_orders: HashMap<ClientOrderId, PaperOrder>,
    events: VecDeque<VenueEvent>,
    fail_next_submit: Option<String>,
}

/// In-memory exchange double.
pub struct PaperVenue {
    name: String,
    state: RwLock<PaperState>,
}

impl PaperVenue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(PaperState {
                ready: true,
                status_connected: true,
                ..Default::default()
            }),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.write().ready = ready;
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.write().status_connected = connected;
    }

    /// Advance the venue clock used to stamp emitted events.
    pub fn set_clock_ms(&self, now_ms: u64) {
        self.state.write().clock_ms = now_ms;
    }

    /// Seed total and available balance for an asset.
    pub fn set_balance(&self, asset: impl Into<String>, total: Decimal, available: Decimal) {
        self.state
            .write()
            .balances
            .insert(asset.into(), AssetBalance { total, available });
    }

    /// Replace the book for a pair. Levels are `(price, size)` tuples.
    pub fn set_book(
        &self,
        pair: TradingPair,
        bids: Vec<(Decimal, Decimal)>,
        asks: Vec<(Decimal, Decimal)>,
    ) {
        let to_levels = |side: Vec<(Decimal, Decimal)>| {
            side.into_iter()
                .map(|(p, s)| BookLevel::new(Price::new(p), Size::new(s)))
                .collect()
        };
        self.state
            .write()
            .books
            .insert(pair, OrderBook::new(to_levels(bids), to_levels(asks)));
    }

    /// Set the price quantum and size step for a pair.
    pub fn set_quantization(&self, pair: TradingPair, price_quantum: Decimal, size_step: Decimal) {
        let mut state = self.state.write();
        state.price_quantums.insert(pair.clone(), Price::new(price_quantum));
        state.size_steps.insert(pair, Size::new(size_step));
    }

    /// Make the next `submit_order` fail with a rejection.
    pub fn fail_next_submit(&self, reason: impl Into<String>) {
        self.state.write().fail_next_submit = Some(reason.into());
    }

    /// Drain queued events.
    pub fn poll_events(&self) -> Vec<VenueEvent> {
        self.state.write().events.drain(..).collect()
    }

    /// Snapshot of all resting orders.
    pub fn open_orders(&self) -> Vec<PaperOrder> {
        self.state.read().open_orders.values().cloned().collect()
    }

    /// Look up one resting order.
    pub fn open_order(&self, id: &ClientOrderId) -> Option<PaperOrder> {
        self.state.read().open_orders.get(id).cloned()
    }

    /// Force a resting limit order to fill completely at its limit price,
    /// emitting the fill and completion events a live venue would.
    pub fn fill_limit_order(&self, id: &ClientOrderId) -> bool {
        let mut state = self.state.write();
        let order = match state.open_orders.remove(id) {
            Some(o) => o,
            None => return false,
        };
        let price = order.price.expect("resting limit order always has a price");
        Self::settle(&mut state, &order.pair, order.side, order.amount, price);

        let now_ms = state.clock_ms;
        state.events.push_back(VenueEvent::Filled(OrderFilledEvent {
            order_id: order.id.clone(),
            trade_type: order.side,
            order_type: OrderType::Limit,
            amount: order.amount,
            price,
            timestamp_ms: now_ms,
        }));
        let completed = OrderCompletedEvent {
            order_id: order.id.clone(),
            base_amount: order.amount,
            timestamp_ms: now_ms,
        };
        state.events.push_back(match order.side {
            OrderSide::Buy => VenueEvent::BuyCompleted(completed),
            OrderSide::Sell => VenueEvent::SellCompleted(completed),
        });
        true
    }

    /// Apply a trade's balance effects.
    fn settle(state: &mut PaperState, pair: &TradingPair, side: OrderSide, amount: Size, price: Price) {
        let quote_delta = amount.notional(price);
        let (base_sign, quote_sign) = match side {
            OrderSide::Buy => (Decimal::ONE, -Decimal::ONE),
            OrderSide::Sell => (-Decimal::ONE, Decimal::ONE),
        };
        let base = state.balances.entry(pair.base.clone()).or_default();
        base.total += base_sign * amount.inner();
        base.available += base_sign * amount.inner();
        let quote = state.balances.entry(pair.quote.clone()).or_default();
        quote.total += quote_sign * quote_delta;
        quote.available += quote_sign * quote_delta;
    }
}

impl Venue for PaperVenue {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        self.state.read().ready
    }

    fn network_status(&self) -> NetworkStatus {
        if self.state.read().status_connected {
            NetworkStatus::Connected
        } else {
            NetworkStatus::NotConnected
        }
    }

    fn balance(&self, asset: &str) -> Decimal {
        self.state
            .read()
            .balances
            .get(asset)
            .map(|b| b.total)
            .unwrap_or(Decimal::ZERO)
    }

    fn available_balance(&self, asset: &str) -> Decimal {
        self.state
            .read()
            .balances
            .get(asset)
            .map(|b| b.available)
            .unwrap_or(Decimal::ZERO)
    }

    fn best_price(&self, pair: &TradingPair, is_buy: bool) -> Option<Price> {
        let state = self.state.read();
        let book = state.books.get(pair)?;
        if is_buy {
            book.best_ask()
        } else {
            book.best_bid()
        }
    }

    fn vwap_for_volume(
        &self,
        pair: &TradingPair,
        is_buy: bool,
        volume: Size,
    ) -> Option<VwapResult> {
        self.state
            .read()
            .books
            .get(pair)?
            .vwap_for_volume(is_buy, volume)
    }

    fn price_for_volume(&self, pair: &TradingPair, is_buy: bool, volume: Size) -> Option<Price> {
        self.state
            .read()
            .books
            .get(pair)?
            .price_for_volume(is_buy, volume)
    }

    fn side_volume(&self, pair: &TradingPair, is_buy: bool) -> Size {
        self.state
            .read()
            .books
            .get(pair)
            .map(|b| b.side_volume(is_buy))
            .unwrap_or(Size::ZERO)
    }

    fn price_quantum(&self, pair: &TradingPair, _price: Price) -> Price {
        self.state
            .read()
            .price_quantums
            .get(pair)
            .copied()
            .unwrap_or_else(|| Price::new(Decimal::new(1, 2)))
    }

    fn quantize_amount(&self, pair: &TradingPair, amount: Size) -> Size {
        let step = self
            .state
            .read()
            .size_steps
            .get(pair)
            .copied()
            .unwrap_or_else(|| Size::new(Decimal::new(1, 6)));
        amount.floor_to_step(step)
    }

    fn submit_order(&self, request: OrderRequest) -> Result<ClientOrderId> {
        let mut state = self.state.write();
        if !state.status_connected {
            return Err(VenueError::NotConnected);
        }
        if let Some(reason) = state.fail_next_submit.take() {
            return Err(VenueError::Rejected(reason));
        }

        let id = ClientOrderId::generate(request.side);
        debug!(
            venue = %self.name,
            order_id = %id,
            pair = %request.pair,
            side = %request.side,
            order_type = %request.order_type,
            amount = %request.amount,
            "Paper order submitted"
        );

        match request.order_type {
            OrderType::Limit => {
                let price = request
                    .price
                    .ok_or_else(|| VenueError::Rejected("limit order without price".into()))?;
                state.open_orders.insert(
                    id.clone(),
                    PaperOrder {
                        id: id.clone(),
                        pair: request.pair,
                        side: request.side,
                        order_type: OrderType::Limit,
                        amount: request.amount,
                        price: Some(price),
                        expiration_secs: request.expiration_secs,
                    },
                );
            }
            OrderType::Market => {
                let is_buy = request.side == OrderSide::Buy;
                let vwap = state
                    .books
                    .get(&request.pair)
                    .and_then(|b| b.vwap_for_volume(is_buy, request.amount))
                    .ok_or_else(|| {
                        VenueError::Rejected(format!("no liquidity for {}", request.pair))
                    })?;

                let filled = vwap.result_volume;
                let price = vwap.result_price;
                Self::settle(&mut state, &request.pair, request.side, filled, price);

                let now_ms = state.clock_ms;
                state.events.push_back(VenueEvent::Filled(OrderFilledEvent {
                    order_id: id.clone(),
                    trade_type: request.side,
                    order_type: OrderType::Market,
                    amount: filled,
                    price,
                    timestamp_ms: now_ms,
                }));
                let completed = OrderCompletedEvent {
                    order_id: id.clone(),
                    base_amount: filled,
                    timestamp_ms: now_ms,
                };
                state.events.push_back(match request.side {
                    OrderSide::Buy => VenueEvent::BuyCompleted(completed),
                    OrderSide::Sell => VenueEvent::SellCompleted(completed),
                });
            }
        }

        Ok(id)
    }

    fn cancel_order(&self, _pair: &TradingPair, order_id: &ClientOrderId) {
        let mut state = self.state.write();
        if state.open_orders.remove(order_id).is_some() {
            let now_ms = state.clock_ms;
            state
                .events
                .push_back(VenueEvent::Cancelled(OrderCancelledEvent {
                    order_id: order_id.clone(),
                    timestamp_ms: now_ms,
                }));
            debug!(venue = %self.name, order_id = %order_id, "Paper order cancelled");
        }
    }
}
