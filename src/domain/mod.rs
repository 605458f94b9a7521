//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The matching engine core: order/trade value types, the per-level FIFO queue, the per-market
// order book and its matching walk, the settlement collaborator, the exchange-wide dispatcher,
// and the in-process event bus.
//--------------------------------------------------------------------------------------------------

pub mod events;
pub mod exchange;
pub mod order;
pub mod order_book;
pub mod price_level;
pub mod settlement;
pub mod user;

pub use events::{EventBus, ExchangeEvent};
pub use exchange::{Exchange, ExchangeError, MARKETS};
pub use order::{Match, Order, OrderError, OrderStatus, OrderType, Side, Trade};
pub use order_book::{OrderBook, OrderBookError};
pub use price_level::PriceLevel;
pub use settlement::{InMemorySettlement, Settlement, SettlementError};
pub use user::User;
