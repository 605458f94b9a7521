//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// A PriceLevel is the FIFO queue of resting orders at a single price on a single side of
// a book. Orders live in the level by value; nothing points back from an Order to its level
// (see OrderBook's order_index for the arena-and-index lookup path).
//--------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use uuid::Uuid;

use super::order::{Match, Order, OrderStatus};

#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: i64,
    orders: VecDeque<Order>,
    total_volume: u64,
}

impl PriceLevel {
    pub fn new(price: i64) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_volume: 0,
        }
    }

    /// Appends by acceptance order (the queue is already FIFO since callers submit in
    /// `(timestamp, sequence)` order). Pre: order.price == self.price.
    pub fn add(&mut self, order: Order) {
        debug_assert_eq!(order.price, self.price);
        self.total_volume = self.total_volume.saturating_add(order.size);
        self.orders.push_back(order);
    }

    /// Removes a resting order by id. Returns the removed order, if present.
    pub fn remove(&mut self, order_id: Uuid) -> Option<Order> {
        let pos = self.orders.iter().position(|o| o.id == order_id)?;
        let order = self.orders.remove(pos)?;
        self.total_volume = self.total_volume.saturating_sub(order.size);
        Some(order)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn total_volume(&self) -> u64 {
        self.total_volume
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Crosses `aggressor` against this level's resting orders oldest-first, mutating
    /// both sides in place. Returns the matches produced and a snapshot of every resting
    /// order this call touched (fully filled or left partially filled), so the caller can
    /// both purge fully-filled ids from its order index and publish a lifecycle event per
    /// affected order. Stops as soon as the aggressor is filled or the level is exhausted —
    /// an explicit loop over popped front entries, not a callback with an early-stop flag.
    pub fn fill(&mut self, aggressor: &mut Order) -> (Vec<Match>, Vec<Order>) {
        let mut matches = Vec::new();
        let mut affected = Vec::new();

        while aggressor.size > 0 {
            let Some(mut resting) = self.orders.pop_front() else {
                break;
            };

            let size_filled = aggressor.size.min(resting.size);
            aggressor.size -= size_filled;
            resting.size -= size_filled;
            self.total_volume = self.total_volume.saturating_sub(size_filled);

            let price = resting.price * size_filled as i64;
            let (bid_order_id, bid_owner, ask_order_id, ask_owner) = match aggressor.side {
                super::order::Side::Bid => (
                    aggressor.id,
                    aggressor.owner.clone(),
                    resting.id,
                    resting.owner.clone(),
                ),
                super::order::Side::Ask => (
                    resting.id,
                    resting.owner.clone(),
                    aggressor.id,
                    aggressor.owner.clone(),
                ),
            };

            matches.push(Match {
                bid_order_id,
                bid_owner,
                ask_order_id,
                ask_owner,
                size_filled,
                price,
                timestamp: aggressor.timestamp,
            });

            if resting.is_filled() {
                resting.status = OrderStatus::Filled;
                affected.push(resting);
            } else {
                resting.status = OrderStatus::PartiallyFilled;
                self.total_volume = self.total_volume.saturating_add(resting.size);
                affected.push(resting.clone());
                self.orders.push_front(resting);
                break;
            }
        }

        (matches, affected)
    }
}
