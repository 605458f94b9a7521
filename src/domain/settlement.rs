//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The settlement collaborator: transfers of base and quote currency between user balances
// and the exchange pool, triggered synchronously by OrderBook as part of a matching
// operation's atomic effect envelope. Replaces the source's global mutable Ethereum client
// with an injected trait; InMemorySettlement is the deterministic stub used by tests and
// by default operation until a real chain adapter is wired in.
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("settlement failed for user {user}: {reason}")]
    TransferFailed { user: String, reason: String },
}

/// Calls are synchronous and conceptually atomic with the book mutation that triggers them;
/// implementations must not block indefinitely or this property is violated.
pub trait Settlement: Send + Sync {
    /// Moves quote currency between a user's balance and the exchange pool.
    /// `amount` is positive; `to_exchange` selects the direction.
    fn transfer_quote(&self, user: &str, amount: i64, to_exchange: bool) -> Result<(), SettlementError>;

    /// Moves base currency (denominated in `market`) between a user's balance and the
    /// exchange pool.
    fn transfer_base(&self, user: &str, market: &str, amount: i64, to_exchange: bool) -> Result<(), SettlementError>;

    /// Moves quote currency directly between two users (no exchange pool leg), used when
    /// settling the peer-to-peer leg of a match.
    fn transfer_quote_between(&self, from: &str, to: &str, amount: i64) -> Result<(), SettlementError>;
}

/// Deterministic, never-failing settlement backed by in-memory ledgers. Negative balances
/// are allowed: the ledger exists to make settlement observable in tests, not to enforce
/// solvency (that belongs to a real adapter backed by an actual account/custody system).
#[derive(Debug, Default)]
pub struct InMemorySettlement {
    quote_ledger: Mutex<HashMap<String, i64>>,
    base_ledger: Mutex<HashMap<(String, String), i64>>,
    pub quote_pool: Mutex<i64>,
}

impl InMemorySettlement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quote_balance(&self, user: &str) -> i64 {
        *self.quote_ledger.lock().get(user).unwrap_or(&0)
    }

    pub fn base_balance(&self, user: &str, market: &str) -> i64 {
        *self
            .base_ledger
            .lock()
            .get(&(user.to_string(), market.to_string()))
            .unwrap_or(&0)
    }
}

impl Settlement for InMemorySettlement {
    fn transfer_quote(&self, user: &str, amount: i64, to_exchange: bool) -> Result<(), SettlementError> {
        let delta = if to_exchange { -amount } else { amount };
        *self.quote_ledger.lock().entry(user.to_string()).or_insert(0) += delta;
        *self.quote_pool.lock() += if to_exchange { amount } else { -amount };
        Ok(())
    }

    fn transfer_base(&self, user: &str, market: &str, amount: i64, to_exchange: bool) -> Result<(), SettlementError> {
        let delta = if to_exchange { -amount } else { amount };
        *self
            .base_ledger
            .lock()
            .entry((user.to_string(), market.to_string()))
            .or_insert(0) += delta;
        Ok(())
    }

    fn transfer_quote_between(&self, from: &str, to: &str, amount: i64) -> Result<(), SettlementError> {
        let mut ledger = self.quote_ledger.lock();
        *ledger.entry(from.to_string()).or_insert(0) -= amount;
        *ledger.entry(to.to_string()).or_insert(0) += amount;
        Ok(())
    }
}
