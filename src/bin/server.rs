//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Process entry point: loads configuration, wires the in-memory settlement stub and event bus
// into an Exchange, and serves the HTTP API until the process is killed.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use tracing::{Level, info};

use velho_exchange::api::Api;
use velho_exchange::config::Config;
use velho_exchange::domain::{EventBus, Exchange, InMemorySettlement};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = Config::from_env();
    info!(?config, "starting matching engine");

    let settlement = Arc::new(InMemorySettlement::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let exchange = Arc::new(Exchange::new(settlement, event_bus));

    let api = Api::new(config.bind_addr, exchange);
    api.serve().await
}
