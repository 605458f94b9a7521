//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Integration tests for the HTTP API, driving the router directly with `tower::ServiceExt`
// rather than binding a socket. Covers the external-interface contract: user registration,
// order placement, cancellation, and the read endpoints.
//--------------------------------------------------------------------------------------------------

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use hyper::Response;
use serde_json::{Value, from_slice, json};
use tower::ServiceExt;

use velho_exchange::domain::{EventBus, Exchange, InMemorySettlement};
use velho_exchange::api::Api;

async fn setup_test_router() -> Router {
    let settlement = Arc::new(InMemorySettlement::new());
    let exchange = Arc::new(Exchange::new(settlement, EventBus::default()));
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    Api::new(addr, exchange).routes()
}

async fn parse_json_response(response: Response<Body>) -> Value {
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    from_slice(&body_bytes).unwrap()
}

async fn create_user(app: &Router, usd: i64) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::post("/user")
                .header("Content-Type", "application/json")
                .body(Body::from(json!({ "usd": usd }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    body["user"].as_str().unwrap().to_string()
}

async fn place_limit(app: &Router, user: &str, market: &str, bid: bool, price: i64, size: u64) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/order?user={user}"))
                .header("Content-Type", "application/json")
                .body(
                    Body::from(
                        json!({
                            "order_type": "LIMIT",
                            "price": price,
                            "size": size,
                            "bid": bid,
                            "market": market,
                        })
                        .to_string(),
                    ),
                )
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    parse_json_response(response).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_router().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_user() {
    let app = setup_test_router().await;
    let user_id = create_user(&app, 10_000).await;
    assert!(uuid::Uuid::parse_str(&user_id).is_ok());
}

#[tokio::test]
async fn test_place_limit_order_rests() {
    let app = setup_test_router().await;
    let user = create_user(&app, 10_000).await;

    let body = place_limit(&app, &user, "BTC", true, 400, 3).await;
    assert_eq!(body["status"], "success");
    assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());

    let response = app
        .clone()
        .oneshot(Request::get("/book/bid?market=BTC").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["price"], 400);
}

#[tokio::test]
async fn test_cancel_order_then_book_empties() {
    let app = setup_test_router().await;
    let user = create_user(&app, 10_000).await;

    let placed = place_limit(&app, &user, "BTC", true, 400, 3).await;
    let order_id = placed["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/order?id={order_id}&market=BTC"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/book/bid?market=BTC").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = parse_json_response(response).await;
    assert_eq!(body["price"], 0);
}

#[tokio::test]
async fn test_market_order_crosses_resting_limits_and_reports_matches() {
    let app = setup_test_router().await;
    let maker = create_user(&app, 0).await;
    let taker = create_user(&app, 0).await;

    place_limit(&app, &maker, "BTC", false, 400, 3).await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/order?user={taker}"))
                .header("Content-Type", "application/json")
                .body(
                    Body::from(
                        json!({
                            "order_type": "MARKET",
                            "size": 3,
                            "bid": true,
                            "market": "BTC",
                        })
                        .to_string(),
                    ),
                )
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["size_filled"], 3);
}

#[tokio::test]
async fn test_market_order_insufficient_liquidity_returns_417() {
    let app = setup_test_router().await;
    let user = create_user(&app, 0).await;

    let response = app
        .oneshot(
            Request::post(format!("/order?user={user}"))
                .header("Content-Type", "application/json")
                .body(
                    Body::from(
                        json!({
                            "order_type": "MARKET",
                            "size": 10,
                            "bid": true,
                            "market": "BTC",
                        })
                        .to_string(),
                    ),
                )
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::EXPECTATION_FAILED);
}

#[tokio::test]
async fn test_get_orderbook_snapshot() {
    let app = setup_test_router().await;
    let user = create_user(&app, 10_000).await;
    place_limit(&app, &user, "BTC", true, 100, 1).await;
    place_limit(&app, &user, "BTC", false, 101, 1).await;

    let response = app
        .oneshot(Request::get("/orderbook?market=BTC").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["total_bid_volume"], 1);
    assert_eq!(body["total_ask_volume"], 1);
    assert_eq!(body["bids"].as_array().unwrap().len(), 1);
    assert_eq!(body["asks"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_user_lookup_returns_404() {
    let app = setup_test_router().await;
    let response = app
        .oneshot(
            Request::get(format!("/user/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_market_returns_400() {
    let app = setup_test_router().await;
    let response = app
        .oneshot(Request::get("/book/bid?market=DOGE").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
