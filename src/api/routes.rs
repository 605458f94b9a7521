//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                    | Return Type          |
// |------------------|-----------------------------------------------|----------------------|
// | health           | Liveness probe                                 | impl IntoResponse    |
// | place_order      | Submit a limit or market order                 | ApiResult<Response>  |
// | cancel_order     | Cancel a resting order                         | ApiResult<Response>  |
// | get_orderbook    | Snapshot of a market's resting orders          | ApiResult<Response>  |
// | get_best_bid     | Best resting bid price                         | ApiResult<Response>  |
// | get_best_ask     | Best resting ask price                         | ApiResult<Response>  |
// | get_user_orders  | A user's resting orders, split by side         | ApiResult<Response>  |
// | get_trades       | A market's trade log                           | ApiResult<Response>  |
// | get_market_price | Last traded price for a market                | ApiResult<Response>  |
// | create_user      | Register a user with a starting quote balance  | ApiResult<Response>  |
// | get_user         | Fetch a registered user                        | ApiResult<Response>  |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use super::dto::{
    CreateUserRequest, CreateUserResponse, OrderBookResponse, PlaceOrderRequest, PlaceOrderResponse,
    PriceResponse, StatusResponse, TradesResponse, UserDto, UserOrders, UserOrdersResponse,
    UserResponse,
};
use super::error::{ApiError, ApiResult};
use crate::domain::Exchange;

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidRequest(format!("invalid user id: {raw}")))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderQuery {
    user: String,
}

/// `POST /order?user=ID` — shape of the success body depends on the order type: a limit
/// order returns the resting order's id, a market order returns the matches it produced.
pub async fn place_order(
    Extension(exchange): Extension<Arc<Exchange>>,
    Query(query): Query<PlaceOrderQuery>,
    Json(body): Json<PlaceOrderRequest>,
) -> ApiResult<Response> {
    let user_id = parse_user_id(&query.user)?;
    let side = body.side();

    let response = match body.order_type {
        super::dto::OrderTypeWire::Limit => {
            let order = exchange.place_limit(&body.market, side, body.price, body.size, user_id)?;
            PlaceOrderResponse::Limit {
                status: "success",
                id: order.id,
            }
        }
        super::dto::OrderTypeWire::Market => {
            let matches = exchange.place_market(&body.market, side, body.size, user_id)?;
            PlaceOrderResponse::Market {
                status: "success",
                matches,
            }
        }
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderQuery {
    id: String,
    market: String,
}

/// `DELETE /order?id=ID&market=M` — cancelling an unknown id is a soft no-op; this always
/// reports success, matching the source's always-200 cancel semantics.
pub async fn cancel_order(
    Extension(exchange): Extension<Arc<Exchange>>,
    Query(query): Query<CancelOrderQuery>,
) -> ApiResult<Response> {
    let order_id = Uuid::parse_str(&query.id)
        .map_err(|_| ApiError::InvalidRequest(format!("invalid order id: {}", query.id)))?;
    exchange.cancel(&query.market, order_id)?;
    Ok((StatusCode::OK, Json(StatusResponse { status: "success" })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    market: String,
}

pub async fn get_orderbook(
    Extension(exchange): Extension<Arc<Exchange>>,
    Query(query): Query<MarketQuery>,
) -> ApiResult<Response> {
    let (total_ask_volume, total_bid_volume, asks, bids) = exchange.orderbook_snapshot(&query.market)?;
    let response = OrderBookResponse {
        total_ask_volume,
        total_bid_volume,
        asks,
        bids,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

pub async fn get_best_bid(
    Extension(exchange): Extension<Arc<Exchange>>,
    Query(query): Query<MarketQuery>,
) -> ApiResult<Response> {
    let price = exchange.best_bid(&query.market)?;
    Ok((StatusCode::OK, Json(PriceResponse { price })).into_response())
}

pub async fn get_best_ask(
    Extension(exchange): Extension<Arc<Exchange>>,
    Query(query): Query<MarketQuery>,
) -> ApiResult<Response> {
    let price = exchange.best_ask(&query.market)?;
    Ok((StatusCode::OK, Json(PriceResponse { price })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct UserOrdersQuery {
    #[serde(rename = "userID")]
    user_id: String,
}

/// `GET /order?userID=ID` — 404 for an unregistered owner, 417 when the user has no
/// resting orders at all (spec treats an empty result the same as "nothing to match").
pub async fn get_user_orders(
    Extension(exchange): Extension<Arc<Exchange>>,
    Query(query): Query<UserOrdersQuery>,
) -> ApiResult<Response> {
    let user_id = parse_user_id(&query.user_id)?;
    let (asks, bids) = exchange.orders_for(user_id)?;
    if asks.is_empty() && bids.is_empty() {
        return Err(ApiError::InsufficientLiquidity);
    }
    let response = UserOrdersResponse {
        orders: UserOrders { asks, bids },
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

pub async fn get_trades(
    Extension(exchange): Extension<Arc<Exchange>>,
    Query(query): Query<MarketQuery>,
) -> ApiResult<Response> {
    let trades = exchange.trades(&query.market)?;
    Ok((StatusCode::OK, Json(TradesResponse { trades })).into_response())
}

pub async fn get_market_price(
    Extension(exchange): Extension<Arc<Exchange>>,
    Path(market): Path<String>,
) -> ApiResult<Response> {
    let price = exchange.market_price(&market)?;
    Ok((StatusCode::OK, Json(PriceResponse { price })).into_response())
}

/// `POST /user` — `private_key` is accepted but unused; see CreateUserRequest.
pub async fn create_user(
    Extension(exchange): Extension<Arc<Exchange>>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<Response> {
    let user = exchange.add_user(body.usd);
    Ok((StatusCode::OK, Json(CreateUserResponse { user: user.id })).into_response())
}

pub async fn get_user(
    Extension(exchange): Extension<Arc<Exchange>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Response> {
    let user = exchange.get_user(user_id)?;
    Ok((
        StatusCode::OK,
        Json(UserResponse {
            user: UserDto::from(user),
        }),
    )
        .into_response())
}
