//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Value types shared by every layer of the matching engine: the side of the book an order
// sits on, its lifecycle status, the order itself, and a completed trade record.
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Buy side or sell side of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// Whether an order carries a resting price or consumes liquidity at whatever price exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Resting,
    PartiallyFilled,
    Filled,
    Cancelled,
}

/// A single intention to trade. `price` is zero iff the order is a market order.
/// `sequence` is assigned by the owning book at submission time and breaks ties
/// between two orders accepted within the same nanosecond (see PriceLevel ordering).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub owner: String,
    pub side: Side,
    pub order_type: OrderType,
    pub size: u64,
    pub price: i64,
    pub timestamp: i64,
    pub sequence: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_filled(&self) -> bool {
        self.size == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub market: String,
    pub price: i64,
    pub size: u64,
    pub aggressor_side: Side,
    pub timestamp: i64,
}

/// A single pairwise execution produced by crossing one aggressor against one resting order.
/// Size and price reflect the units actually filled in this step, not the participants' totals.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub bid_order_id: Uuid,
    pub bid_owner: String,
    pub ask_order_id: Uuid,
    pub ask_owner: String,
    pub size_filled: u64,
    /// `resting.price * size_filled`, per the source's maker-price convention.
    pub price: i64,
    pub timestamp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order size must be greater than zero")]
    InvalidSize,
    #[error("limit order price must be greater than zero")]
    InvalidPrice,
    #[error("unknown market: {0}")]
    UnknownMarket(String),
}
