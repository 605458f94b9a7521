//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Exchange dispatches submissions to the right per-market OrderBook, owns the user
// registry and per-user order index, and publishes lifecycle events. Each OrderBook is
// guarded by its own mutex (single-writer-per-market); the outer map of books only changes
// shape at construction, so it is never mutated after `new`.
//--------------------------------------------------------------------------------------------------

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use uuid::Uuid;

use super::events::{EventBus, ExchangeEvent};
use super::order::{Match, Order, OrderStatus, Side, Trade};
use super::order_book::{OrderBook, OrderBookError};
use super::settlement::Settlement;
use super::user::User;

/// Markets recognized by this exchange. Cross-market routing is explicitly out of scope.
pub const MARKETS: [&str; 2] = ["BTC", "ETH"];

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("unknown market: {0}")]
    UnknownMarket(String),
    #[error("unknown user: {0}")]
    UnknownUser(Uuid),
    #[error(transparent)]
    OrderBook(#[from] OrderBookError),
}

pub struct Exchange {
    books: HashMap<String, Mutex<OrderBook>>,
    users: RwLock<HashMap<Uuid, User>>,
    /// user id -> (market, order id) for every order accepted on that user's behalf.
    orders_by_user: RwLock<HashMap<Uuid, HashSet<(String, Uuid)>>>,
    event_bus: EventBus,
}

impl Exchange {
    pub fn new(settlement: Arc<dyn Settlement>, event_bus: EventBus) -> Self {
        let books = MARKETS
            .iter()
            .map(|&market| (market.to_string(), Mutex::new(OrderBook::new(market, settlement.clone()))))
            .collect();

        Self {
            books,
            users: RwLock::new(HashMap::new()),
            orders_by_user: RwLock::new(HashMap::new()),
            event_bus,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    fn book(&self, market: &str) -> Result<&Mutex<OrderBook>, ExchangeError> {
        self.books
            .get(market)
            .ok_or_else(|| ExchangeError::UnknownMarket(market.to_string()))
    }

    /// Inserts into the user registry. Idempotent on id collision is unspecified upstream;
    /// this always assigns a fresh id, so collisions cannot occur through this path.
    pub fn add_user(&self, usd: i64) -> User {
        let user = User::new(usd);
        self.users.write().insert(user.id, user.clone());
        user
    }

    pub fn get_user(&self, user_id: Uuid) -> Result<User, ExchangeError> {
        self.users
            .read()
            .get(&user_id)
            .cloned()
            .ok_or(ExchangeError::UnknownUser(user_id))
    }

    fn register_order(&self, user_id: Uuid, market: &str, order_id: Uuid) {
        self.orders_by_user
            .write()
            .entry(user_id)
            .or_default()
            .insert((market.to_string(), order_id));
    }

    pub fn place_limit(
        &self,
        market: &str,
        side: Side,
        price: i64,
        size: u64,
        user_id: Uuid,
    ) -> Result<Order, ExchangeError> {
        let order = self
            .book(market)?
            .lock()
            .place_limit(side, price, size, user_id.to_string())?;
        self.register_order(user_id, market, order.id);
        self.event_bus.publish(ExchangeEvent::OrderPlaced {
            market: market.to_string(),
            order: order.clone(),
        });
        Ok(order)
    }

    pub fn place_market(&self, market: &str, side: Side, size: u64, user_id: Uuid) -> Result<Vec<Match>, ExchangeError> {
        let (matches, affected_orders) = self
            .book(market)?
            .lock()
            .place_market(side, size, user_id.to_string())?;
        for m in &matches {
            self.event_bus.publish(ExchangeEvent::TradeExecuted {
                market: market.to_string(),
                trade: Trade {
                    market: market.to_string(),
                    price: m.price,
                    size: m.size_filled,
                    aggressor_side: side,
                    timestamp: m.timestamp,
                },
            });
        }
        for order in affected_orders {
            let event = match order.status {
                OrderStatus::PartiallyFilled => ExchangeEvent::OrderPartiallyFilled {
                    market: market.to_string(),
                    order,
                },
                _ => ExchangeEvent::OrderFilled {
                    market: market.to_string(),
                    order,
                },
            };
            self.event_bus.publish(event);
        }
        Ok(matches)
    }

    pub fn cancel(&self, market: &str, order_id: Uuid) -> Result<Option<Order>, ExchangeError> {
        let cancelled = self.book(market)?.lock().cancel(order_id)?;
        if let Some(order) = &cancelled {
            self.event_bus.publish(ExchangeEvent::OrderCancelled {
                market: market.to_string(),
                order: order.clone(),
            });
        }
        Ok(cancelled)
    }

    pub fn best_bid(&self, market: &str) -> Result<i64, ExchangeError> {
        Ok(self.book(market)?.lock().best_bid())
    }

    pub fn best_ask(&self, market: &str) -> Result<i64, ExchangeError> {
        Ok(self.book(market)?.lock().best_ask())
    }

    pub fn market_price(&self, market: &str) -> Result<i64, ExchangeError> {
        Ok(self.book(market)?.lock().market_price())
    }

    pub fn trades(&self, market: &str) -> Result<Vec<Trade>, ExchangeError> {
        Ok(self.book(market)?.lock().trades().to_vec())
    }

    pub fn orderbook_snapshot(&self, market: &str) -> Result<(u64, u64, Vec<Order>, Vec<Order>), ExchangeError> {
        let book = self.book(market)?.lock();
        Ok((
            book.total_ask_volume(),
            book.total_bid_volume(),
            book.orders(Side::Ask),
            book.orders(Side::Bid),
        ))
    }

    /// Iterates the user's order index; entries whose order is no longer resting in its book
    /// are dropped (the only garbage-collection path, per the lazy-prune design).
    pub fn orders_for(&self, user_id: Uuid) -> Result<(Vec<Order>, Vec<Order>), ExchangeError> {
        if !self.users.read().contains_key(&user_id) {
            return Err(ExchangeError::UnknownUser(user_id));
        }

        let entries: Vec<(String, Uuid)> = self
            .orders_by_user
            .read()
            .get(&user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        let mut asks = Vec::new();
        let mut bids = Vec::new();
        let mut stale = Vec::new();

        for (market, order_id) in entries {
            let Some(book) = self.books.get(&market) else {
                stale.push((market, order_id));
                continue;
            };
            match book.lock().get_order(order_id) {
                Some(order) => match order.side {
                    Side::Ask => asks.push(order.clone()),
                    Side::Bid => bids.push(order.clone()),
                },
                None => stale.push((market, order_id)),
            }
        }

        if !stale.is_empty() {
            if let Some(set) = self.orders_by_user.write().get_mut(&user_id) {
                for entry in &stale {
                    set.remove(entry);
                }
            }
        }

        Ok((asks, bids))
    }
}
