//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// A centralized spot exchange's matching engine: per-market limit order books under strict
// price-time priority, a settlement collaborator, and the HTTP+JSON transport that drives them.
//--------------------------------------------------------------------------------------------------

pub mod api;
pub mod config;
pub mod domain;

pub use domain::{
    Exchange, ExchangeError, InMemorySettlement, Match, Order, OrderBook, OrderBookError,
    OrderStatus, OrderType, PriceLevel, Settlement, SettlementError, Side, Trade, User,
};
