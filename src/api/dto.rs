//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name                 | Description                                     |
// |----------------------|-------------------------------------------------|
// | PlaceOrderRequest    | Body of POST /order                              |
// | PlaceOrderResponse   | Response of POST /order (shape depends on type)  |
// | CreateUserRequest    | Body of POST /user                               |
// | PriceResponse        | Response shape for best-bid/ask/market-price      |
// | OrderBookResponse    | Response shape for GET /orderbook                |
// | UserOrdersResponse   | Response shape for GET /order?userID=             |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Match, Order, Side, Trade};

fn default_false() -> bool {
    false
}

/// Body of `POST /order?user=ID`. `bid` selects side: true for a bid, false for an ask.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub order_type: OrderTypeWire,
    #[serde(default)]
    pub price: i64,
    pub size: u64,
    #[serde(default = "default_false")]
    pub bid: bool,
    pub market: String,
}

impl PlaceOrderRequest {
    pub fn side(&self) -> Side {
        if self.bid {
            Side::Bid
        } else {
            Side::Ask
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OrderTypeWire {
    #[serde(rename = "LIMIT")]
    Limit,
    #[serde(rename = "MARKET")]
    Market,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlaceOrderResponse {
    Limit { status: &'static str, id: Uuid },
    Market { status: &'static str, matches: Vec<Match> },
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub price: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderBookResponse {
    pub total_ask_volume: u64,
    pub total_bid_volume: u64,
    pub asks: Vec<Order>,
    pub bids: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct UserOrders {
    #[serde(rename = "Asks")]
    pub asks: Vec<Order>,
    #[serde(rename = "Bids")]
    pub bids: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct UserOrdersResponse {
    pub orders: UserOrders,
}

#[derive(Debug, Serialize)]
pub struct TradesResponse {
    pub trades: Vec<Trade>,
}

/// Body of `POST /user`. `private_key` is accepted for source-API compatibility but unused:
/// identity/custody is out of scope (see Non-goals) and carries no meaning for the in-memory
/// settlement stub.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub private_key: Option<String>,
    pub usd: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub quote_balance: i64,
}

impl From<crate::domain::User> for UserDto {
    fn from(user: crate::domain::User) -> Self {
        Self {
            id: user.id,
            quote_balance: user.quote_balance,
        }
    }
}
