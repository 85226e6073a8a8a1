//! Client-order-id to market-pair correlation.
//!
//! Venues only know trading-pair symbols, which can collide across
//! configured market pairs, so every order id is mapped back to its owning
//! pair here. Ids of recently closed orders stay resolvable for a grace
//! period: fill and completion events can arrive well after the order left
//! the active set.

use std::collections::{HashMap, VecDeque};
use xemm_core::{ClientOrderId, PairId};

/// How long a closed order's id stays resolvable.
pub const SHADOW_KEEP_ALIVE_MS: u64 = 900_000;

/// Bidirectional id ↔ pair map with aging for closed ids.
#[derive(Debug, Default)]
pub struct PairOrderTracker {
    live: HashMap<ClientOrderId, PairId>,
    shadow: HashMap<ClientOrderId, PairId>,
    // Expiry deadlines are pushed in stop_tracking order, which is
    // monotonic in time, so the front is always the earliest.
    expiry: VecDeque<(u64, ClientOrderId)>,
}

impl PairOrderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin tracking a freshly placed order.
    pub fn start_tracking(&mut self, id: ClientOrderId, pair: PairId) {
        self.live.insert(id, pair);
    }

    /// Stop tracking a closed order. The id moves to the shadow map and
    /// remains resolvable for [`SHADOW_KEEP_ALIVE_MS`].
    pub fn stop_tracking(&mut self, id: &ClientOrderId, now_ms: u64) {
        if let Some(pair) = self.live.remove(id) {
            self.shadow.insert(id.clone(), pair);
            self.expiry
                .push_back((now_ms + SHADOW_KEEP_ALIVE_MS, id.clone()));
        }
    }

    /// Resolve an id to its pair. Unknown ids resolve to `None`; that is
    /// the expected path for orders outside the strategy's universe.
    pub fn lookup(&self, id: &ClientOrderId) -> Option<PairId> {
        self.live
            .get(id)
            .or_else(|| self.shadow.get(id))
            .copied()
    }

    /// Drop shadow entries whose grace period has elapsed. Called once
    /// per tick.
    pub fn prune(&mut self, now_ms: u64) {
        while self.expiry.front().is_some_and(|(deadline, _)| *deadline <= now_ms) {
            if let Some((_, id)) = self.expiry.pop_front() {
                self.shadow.remove(&id);
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn shadow_count(&self) -> usize {
        self.shadow.len()
    }
}
