//! Active order bookkeeping.
//!
//! Holds the engine's read model of resting maker orders, the set of
//! cancels in flight (issued but not yet confirmed, hidden from per-tick
//! review), and the taker market orders still pending completion per pair.

use std::collections::{HashMap, HashSet};
use xemm_core::{ClientOrderId, OrderSide, PairId, TrackedOrder};

/// Store of orders the strategy currently owns.
#[derive(Debug, Default)]
pub struct ActiveOrderStore {
    maker: HashMap<ClientOrderId, TrackedOrder>,
    in_flight_cancels: HashSet<ClientOrderId>,
    taker: HashMap<ClientOrderId, PairId>,
}

impl ActiveOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_maker(&mut self, order: TrackedOrder) {
        self.maker.insert(order.id.clone(), order);
    }

    /// Remove a maker order (filled, cancelled, or expired). Clears any
    /// in-flight cancel mark for the id.
    pub fn remove_maker(&mut self, id: &ClientOrderId) -> Option<TrackedOrder> {
        self.in_flight_cancels.remove(id);
        self.maker.remove(id)
    }

    pub fn maker_order(&self, id: &ClientOrderId) -> Option<&TrackedOrder> {
        self.maker.get(id)
    }

    /// Maker orders for a pair, excluding those with a cancel in flight.
    /// Bid before ask so review order is deterministic.
    pub fn maker_orders_for(&self, pair: PairId) -> Vec<TrackedOrder> {
        let mut orders: Vec<TrackedOrder> = self
            .maker
            .values()
            .filter(|o| o.pair == pair && !self.in_flight_cancels.contains(&o.id))
            .cloned()
            .collect();
        orders.sort_by_key(|o| match o.side {
            OrderSide::Buy => 0u8,
            OrderSide::Sell => 1u8,
        });
        orders
    }

    /// All maker orders for a pair, in-flight cancels included (status view).
    pub fn all_maker_orders_for(&self, pair: PairId) -> Vec<TrackedOrder> {
        self.maker
            .values()
            .filter(|o| o.pair == pair)
            .cloned()
            .collect()
    }

    pub fn mark_cancel_in_flight(&mut self, id: &ClientOrderId) {
        if self.maker.contains_key(id) {
            self.in_flight_cancels.insert(id.clone());
        }
    }

    pub fn has_in_flight_cancel(&self, id: &ClientOrderId) -> bool {
        self.in_flight_cancels.contains(id)
    }

    pub fn insert_taker(&mut self, id: ClientOrderId, pair: PairId) {
        self.taker.insert(id, pair);
    }

    pub fn remove_taker(&mut self, id: &ClientOrderId) -> Option<PairId> {
        self.taker.remove(id)
    }

    /// True while any taker market order for the pair awaits completion.
    pub fn has_taker_orders(&self, pair: PairId) -> bool {
        self.taker.values().any(|p| *p == pair)
    }

    pub fn maker_count(&self) -> usize {
        self.maker.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use xemm_core::{Price, Size};

    fn order(pair: u32, side: OrderSide) -> TrackedOrder {
        TrackedOrder {
            id: ClientOrderId::generate(side),
            pair: PairId::new(pair),
            side,
            price: Price::new(dec!(100)),
            quantity: Size::new(dec!(1)),
            created_at_ms: 0,
        }
    }

    #[test]
    fn test_maker_orders_filtered_by_pair() {
        let mut store = ActiveOrderStore::new();
        store.insert_maker(order(1, OrderSide::Buy));
        store.insert_maker(order(2, OrderSide::Sell));

        assert_eq!(store.maker_orders_for(PairId::new(1)).len(), 1);
        assert_eq!(store.maker_orders_for(PairId::new(2)).len(), 1);
        assert_eq!(store.maker_count(), 2);
    }

    #[test]
    fn test_in_flight_cancel_hides_order() {
        let mut store = ActiveOrderStore::new();
        let o = order(1, OrderSide::Buy);
        let id = o.id.clone();
        store.insert_maker(o);

        store.mark_cancel_in_flight(&id);
        assert!(store.has_in_flight_cancel(&id));
        assert!(store.maker_orders_for(PairId::new(1)).is_empty());
        // Still visible to the status view
        assert_eq!(store.all_maker_orders_for(PairId::new(1)).len(), 1);

        // Removal clears the mark
        assert!(store.remove_maker(&id).is_some());
        assert!(!store.has_in_flight_cancel(&id));
    }

    #[test]
    fn test_bid_sorts_before_ask() {
        let mut store = ActiveOrderStore::new();
        store.insert_maker(order(1, OrderSide::Sell));
        store.insert_maker(order(1, OrderSide::Buy));

        let orders = store.maker_orders_for(PairId::new(1));
        assert_eq!(orders[0].side, OrderSide::Buy);
        assert_eq!(orders[1].side, OrderSide::Sell);
    }

    #[test]
    fn test_taker_orders_per_pair() {
        let mut store = ActiveOrderStore::new();
        let id = ClientOrderId::generate(OrderSide::Sell);
        store.insert_taker(id.clone(), PairId::new(1));

        assert!(store.has_taker_orders(PairId::new(1)));
        assert!(!store.has_taker_orders(PairId::new(2)));

        assert_eq!(store.remove_taker(&id), Some(PairId::new(1)));
        assert!(!store.has_taker_orders(PairId::new(1)));
    }
}
