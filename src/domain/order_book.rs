//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The per-market order book: two price-ordered ladders, an id→(side, price) index standing
// in for the source's cyclic order↔level back-reference, aggregate volume counters, and the
// trade log. Matching walks the opposite ladder from the best price outward, crossing each
// level in turn via PriceLevel::fill.
//--------------------------------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::order::{Match, Order, OrderStatus, OrderType, Side, Trade};
use super::price_level::PriceLevel;
use super::settlement::{Settlement, SettlementError};

#[derive(Debug, Error)]
pub enum OrderBookError {
    #[error("order size must be greater than zero")]
    InvalidSize,
    #[error("limit order price must be greater than zero")]
    InvalidPrice,
    #[error("insufficient liquidity to fill market order")]
    InsufficientLiquidity,
    #[error("settlement failed: {0}")]
    SettlementFault(#[from] SettlementError),
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

pub struct OrderBook {
    market: String,
    bids: BTreeMap<i64, PriceLevel>,
    asks: BTreeMap<i64, PriceLevel>,
    order_index: HashMap<Uuid, (Side, i64)>,
    total_bid_volume: u64,
    total_ask_volume: u64,
    trades: Vec<Trade>,
    last_trade_price: i64,
    next_sequence: u64,
    settlement: Arc<dyn Settlement>,
}

impl OrderBook {
    pub fn new(market: impl Into<String>, settlement: Arc<dyn Settlement>) -> Self {
        Self {
            market: market.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::new(),
            total_bid_volume: 0,
            total_ask_volume: 0,
            trades: Vec::new(),
            last_trade_price: 0,
            next_sequence: 0,
            settlement,
        }
    }

    fn next_order(&mut self, owner: String, side: Side, order_type: OrderType, price: i64, size: u64) -> Order {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Order {
            id: Uuid::new_v4(),
            owner,
            side,
            order_type,
            size,
            price,
            timestamp: now_nanos(),
            sequence,
            status: OrderStatus::Resting,
            created_at: Utc::now(),
        }
    }

    fn ladder(&self, side: Side) -> &BTreeMap<i64, PriceLevel> {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn ladder_mut(&mut self, side: Side) -> &mut BTreeMap<i64, PriceLevel> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    /// Does not attempt to cross the book: the limit path unconditionally rests, even when
    /// the incoming price is marketable against the opposite side. Preserved source behavior.
    pub fn place_limit(&mut self, side: Side, price: i64, size: u64, owner: String) -> Result<Order, OrderBookError> {
        if price <= 0 {
            return Err(OrderBookError::InvalidPrice);
        }
        if size == 0 {
            return Err(OrderBookError::InvalidSize);
        }

        let order = self.next_order(owner.clone(), side, OrderType::Limit, price, size);

        self.ladder_mut(side)
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .add(order.clone());
        self.order_index.insert(order.id, (side, price));

        match side {
            Side::Bid => {
                self.total_bid_volume = self.total_bid_volume.saturating_add(size);
                self.settlement
                    .transfer_quote(&owner, size as i64 * price, true)?;
            }
            Side::Ask => {
                self.total_ask_volume = self.total_ask_volume.saturating_add(size);
                self.settlement
                    .transfer_base(&owner, &self.market, size as i64, true)?;
            }
        }

        Ok(order)
    }

    /// Walks the opposite ladder from the best price outward, crossing each level until the
    /// aggressor is filled or liquidity runs out. The liquidity precondition is checked in
    /// units (the opposite side's volume counter), never in notional terms. Alongside the
    /// matches, returns a snapshot of every resting order touched by the walk — fully filled
    /// or left partially filled — so the caller can publish a lifecycle event per order
    /// (SPEC_FULL.md §4.2 step 5).
    pub fn place_market(&mut self, side: Side, size: u64, owner: String) -> Result<(Vec<Match>, Vec<Order>), OrderBookError> {
        if size == 0 {
            return Err(OrderBookError::InvalidSize);
        }

        let opposite_volume = match side {
            Side::Bid => self.total_ask_volume,
            Side::Ask => self.total_bid_volume,
        };
        if opposite_volume < size {
            return Err(OrderBookError::InsufficientLiquidity);
        }

        if side == Side::Ask {
            self.settlement
                .transfer_base(&owner, &self.market, size as i64, true)?;
        }

        let mut aggressor = self.next_order(owner, side, OrderType::Market, 0, size);

        let opposite_side = side.opposite();
        let prices: Vec<i64> = match opposite_side {
            Side::Ask => self.asks.keys().copied().collect(),
            Side::Bid => self.bids.keys().copied().rev().collect(),
        };

        let mut all_matches = Vec::new();
        let mut all_affected = Vec::new();
        for price in prices {
            if aggressor.size == 0 {
                break;
            }
            let ladder = self.ladder_mut(opposite_side);
            let Some(level) = ladder.get_mut(&price) else {
                continue;
            };
            let (matches, affected) = level.fill(&mut aggressor);
            let filled_volume: u64 = matches.iter().map(|m| m.size_filled).sum();

            for order in &affected {
                if order.is_filled() {
                    self.order_index.remove(&order.id);
                }
            }
            if level.is_empty() {
                ladder.remove(&price);
            }

            match opposite_side {
                Side::Bid => self.total_bid_volume = self.total_bid_volume.saturating_sub(filled_volume),
                Side::Ask => self.total_ask_volume = self.total_ask_volume.saturating_sub(filled_volume),
            }

            all_matches.extend(matches);
            all_affected.extend(affected);
        }

        for m in &all_matches {
            self.settle_match(side, m)?;
            self.trades.push(Trade {
                market: self.market.clone(),
                price: m.price,
                size: m.size_filled,
                aggressor_side: side,
                timestamp: m.timestamp,
            });
        }
        if let Some(last) = all_matches.last() {
            self.last_trade_price = last.price / last.size_filled as i64;
        }

        Ok((all_matches, all_affected))
    }

    fn settle_match(&self, aggressor_side: Side, m: &Match) -> Result<(), SettlementError> {
        match aggressor_side {
            Side::Bid => {
                self.settlement
                    .transfer_base(&m.bid_owner, &self.market, m.size_filled as i64, false)?;
                self.settlement
                    .transfer_quote_between(&m.bid_owner, &m.ask_owner, m.price)?;
            }
            Side::Ask => {
                self.settlement.transfer_quote(&m.ask_owner, m.price, false)?;
                self.settlement
                    .transfer_base(&m.bid_owner, &self.market, m.size_filled as i64, false)?;
            }
        }
        Ok(())
    }

    /// Absent ids are a soft no-op, matching the source's always-succeeds cancel semantics.
    /// Unlike the source, cancelling a resting bid refunds the escrowed quote (Design Note 2).
    pub fn cancel(&mut self, order_id: Uuid) -> Result<Option<Order>, OrderBookError> {
        let Some((side, price)) = self.order_index.remove(&order_id) else {
            return Ok(None);
        };

        let ladder = self.ladder_mut(side);
        let Some(level) = ladder.get_mut(&price) else {
            return Ok(None);
        };
        let Some(order) = level.remove(order_id) else {
            return Ok(None);
        };
        let emptied = level.is_empty();
        if emptied {
            ladder.remove(&price);
        }

        match side {
            Side::Bid => {
                self.total_bid_volume = self.total_bid_volume.saturating_sub(order.size);
                self.settlement
                    .transfer_quote(&order.owner, order.size as i64 * order.price, false)?;
            }
            Side::Ask => {
                self.total_ask_volume = self.total_ask_volume.saturating_sub(order.size);
                self.settlement
                    .transfer_base(&order.owner, &self.market, order.size as i64, false)?;
            }
        }

        let mut cancelled = order;
        cancelled.status = OrderStatus::Cancelled;
        Ok(Some(cancelled))
    }

    pub fn best_bid(&self) -> i64 {
        self.bids.keys().next_back().copied().unwrap_or(0)
    }

    pub fn best_ask(&self) -> i64 {
        self.asks.keys().next().copied().unwrap_or(0)
    }

    pub fn total_bid_volume(&self) -> u64 {
        self.total_bid_volume
    }

    pub fn total_ask_volume(&self) -> u64 {
        self.total_ask_volume
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn market_price(&self) -> i64 {
        self.last_trade_price
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn get_order(&self, order_id: Uuid) -> Option<&Order> {
        let (side, price) = self.order_index.get(&order_id)?;
        self.ladder(*side)
            .get(price)?
            .orders()
            .find(|o| o.id == order_id)
    }

    pub fn contains_order(&self, order_id: Uuid) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Snapshot of all resting orders on a side, best price first.
    pub fn orders(&self, side: Side) -> Vec<Order> {
        match side {
            Side::Bid => self.bids.values().rev().flat_map(|l| l.orders().cloned()).collect(),
            Side::Ask => self.asks.values().flat_map(|l| l.orders().cloned()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settlement::InMemorySettlement;

    fn book() -> OrderBook {
        OrderBook::new("BTC", Arc::new(InMemorySettlement::default()))
    }

    #[test]
    fn place_limit_rests_and_never_crosses() {
        let mut b = book();
        b.place_limit(Side::Ask, 10_000, 1, "U1".into()).unwrap();
        // a marketable bid limit still rests instead of crossing (Open Question 1)
        b.place_limit(Side::Bid, 10_000, 1, "U2".into()).unwrap();
        assert_eq!(b.total_ask_volume(), 1);
        assert_eq!(b.total_bid_volume(), 1);
        assert_eq!(b.best_ask(), 10_000);
        assert_eq!(b.best_bid(), 10_000);
    }

    #[test]
    fn scenario_insufficient_market_liquidity_leaves_book_untouched() {
        let mut b = book();
        b.place_limit(Side::Ask, 10_000, 1, "U1".into()).unwrap();
        let err = b.place_market(Side::Bid, 10, "U2".into()).unwrap_err();
        assert!(matches!(err, OrderBookError::InsufficientLiquidity));
        assert_eq!(b.total_ask_volume(), 1);
    }

    #[test]
    fn scenario_full_cross_against_two_bid_levels() {
        let mut b = book();
        b.place_limit(Side::Bid, 400, 3, "U0".into()).unwrap();
        b.place_limit(Side::Bid, 800, 3, "U1".into()).unwrap();

        let (matches, _) = b.place_market(Side::Ask, 5, "U2".into()).unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].price, 800 * 3);
        assert_eq!(matches[0].size_filled, 3);
        assert_eq!(matches[1].price, 400 * 2);
        assert_eq!(matches[1].size_filled, 2);
        assert_eq!(b.total_bid_volume(), 1);
        assert_eq!(b.best_bid(), 400);
    }

    #[test]
    fn scenario_symmetric_ask_then_buy() {
        let mut b = book();
        b.place_limit(Side::Ask, 400, 3, "U0".into()).unwrap();
        b.place_limit(Side::Ask, 800, 3, "U1".into()).unwrap();

        let (matches, _) = b.place_market(Side::Bid, 5, "U2".into()).unwrap();

        assert_eq!(matches[0].price, 400 * 3);
        assert_eq!(matches[1].price, 800 * 2);
        assert_eq!(b.total_ask_volume(), 1);
        assert_eq!(b.best_ask(), 800);
    }

    #[test]
    fn scenario_fifo_within_level() {
        let mut b = book();
        let first = b.place_limit(Side::Ask, 400, 3, "U0".into()).unwrap();
        let second = b.place_limit(Side::Ask, 400, 3, "U3".into()).unwrap();
        assert!(first.timestamp <= second.timestamp);

        let (matches, _) = b.place_market(Side::Bid, 5, "U2".into()).unwrap();
        assert_eq!(matches[0].ask_owner, "U0");
        assert_eq!(matches[0].size_filled, 3);
        assert_eq!(matches[1].ask_owner, "U3");
        assert_eq!(matches[1].size_filled, 2);
    }

    #[test]
    fn scenario_cancel_then_query() {
        let mut b = book();
        let order = b.place_limit(Side::Bid, 400, 3, "U0".into()).unwrap();
        assert_eq!(b.total_bid_volume(), 3);

        let cancelled = b.cancel(order.id).unwrap().unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(b.get_order(order.id).is_none());
        assert!(!b.contains_order(order.id));
        assert_eq!(b.total_bid_volume(), 0);
        assert_eq!(b.best_bid(), 0);
    }

    #[test]
    fn cancel_is_idempotent_no_op_on_unknown_id() {
        let mut b = book();
        let result = b.cancel(Uuid::new_v4()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn scenario_market_price_reflects_last_match_per_unit() {
        let mut b = book();
        b.place_limit(Side::Bid, 400, 3, "U0".into()).unwrap();
        b.place_limit(Side::Bid, 800, 3, "U1".into()).unwrap();
        b.place_market(Side::Ask, 5, "U2".into()).unwrap();
        assert_eq!(b.market_price(), 400);
    }

    #[test]
    fn cancel_bid_refunds_escrowed_quote() {
        let settlement = Arc::new(InMemorySettlement::default());
        let mut b = OrderBook::new("BTC", settlement.clone());
        let order = b.place_limit(Side::Bid, 100, 3, "U0".into()).unwrap();
        assert_eq!(settlement.quote_balance("U0"), -300);
        b.cancel(order.id).unwrap();
        assert_eq!(settlement.quote_balance("U0"), 0);
    }

    #[test]
    fn place_limit_rejects_zero_price_and_size() {
        let mut b = book();
        assert!(matches!(
            b.place_limit(Side::Bid, 0, 1, "U0".into()),
            Err(OrderBookError::InvalidPrice)
        ));
        assert!(matches!(
            b.place_limit(Side::Bid, 100, 0, "U0".into()),
            Err(OrderBookError::InvalidSize)
        ));
    }
}
