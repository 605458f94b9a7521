//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Process configuration, loaded from the environment with `.env` support for local
// development. No on-disk state is part of the core; these are the only knobs the process
// reads at startup.
//--------------------------------------------------------------------------------------------------

use dotenv::dotenv;
use std::env;
use std::net::{IpAddr, SocketAddr};

const EXCHANGE_HOST: &str = "EXCHANGE_HOST";
const EXCHANGE_PORT: &str = "EXCHANGE_PORT";
const EXCHANGE_EVENT_BUS_CAPACITY: &str = "EXCHANGE_EVENT_BUS_CAPACITY";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub event_bus_capacity: usize,
}

impl Config {
    pub fn from_env() -> Config {
        dotenv().ok();

        let host: IpAddr = env::var(EXCHANGE_HOST)
            .unwrap_or_else(|_| "127.0.0.1".to_string())
            .parse()
            .expect("EXCHANGE_HOST must be a valid IP address");

        let port: u16 = env::var(EXCHANGE_PORT)
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .expect("EXCHANGE_PORT must be a valid port number");

        let event_bus_capacity: usize = env::var(EXCHANGE_EVENT_BUS_CAPACITY)
            .unwrap_or_else(|_| "1024".to_string())
            .parse()
            .expect("EXCHANGE_EVENT_BUS_CAPACITY must be a positive integer");

        Config {
            bind_addr: SocketAddr::new(host, port),
            event_bus_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_unset() {
        // SAFETY: single-threaded test, no other test in this process touches these keys.
        unsafe {
            env::remove_var(EXCHANGE_HOST);
            env::remove_var(EXCHANGE_PORT);
            env::remove_var(EXCHANGE_EVENT_BUS_CAPACITY);
        }
        let config = Config::from_env();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.event_bus_capacity, 1024);
    }
}
