//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The HTTP+JSON transport, built on axum. Endpoints are a thin translation of the Exchange's
// public contract: decode query/body, call into the Exchange, encode the result. No matching
// logic lives here.
//
// | Component | Description                                      |
// |-----------|---------------------------------------------------|
// | Api       | Builds the router and serves it                   |
// | routes    | Handler functions for each endpoint                |
// | dto       | Request/response wire types                       |
// | error     | ApiError and its mapping onto HTTP status codes   |
//--------------------------------------------------------------------------------------------------

mod dto;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use error::{ApiError, ApiResult};

use crate::domain::Exchange;

pub struct Api {
    addr: SocketAddr,
    exchange: Arc<Exchange>,
}

impl Api {
    pub fn new(addr: SocketAddr, exchange: Arc<Exchange>) -> Self {
        Self { addr, exchange }
    }

    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin([
                "http://localhost:3000".parse::<HeaderValue>().unwrap(),
                "http://127.0.0.1:3000".parse::<HeaderValue>().unwrap(),
            ])
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

        Router::new()
            .route("/health", get(routes::health))
            .route(
                "/order",
                post(routes::place_order)
                    .delete(routes::cancel_order)
                    .get(routes::get_user_orders),
            )
            .route("/orderbook", get(routes::get_orderbook))
            .route("/book/bid", get(routes::get_best_bid))
            .route("/book/ask", get(routes::get_best_ask))
            .route("/trade", get(routes::get_trades))
            .route("/marketPrice/:market", get(routes::get_market_price))
            .route("/user", post(routes::create_user))
            .route("/user/:id", get(routes::get_user))
            .layer(Extension(self.exchange.clone()))
            .layer(cors)
    }

    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.routes();
        info!(addr = %self.addr, "matching engine listening");
        let listener = TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}
