use uuid::Uuid;

/// An exchange-registered account. `quote_balance` is a display/reporting convenience seeded
/// from the `usd` field at registration; escrow accounting lives in the settlement ledger,
/// not here — this mirrors the source's treatment of the user record as a thin identity.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub quote_balance: i64,
}

impl User {
    pub fn new(quote_balance: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            quote_balance,
        }
    }
}
