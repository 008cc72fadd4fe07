use serde::{Deserialize, Serialize};

use super::Cents;

/// 1000.00€ per calendar day
pub const DEFAULT_DAILY_WITHDRAWAL_LIMIT: Cents = 100000;

/// 0.50€ per external transfer
pub const DEFAULT_EXTERNAL_TRANSFER_FEE: Cents = 50;

/// Bank-wide rules applied to every account of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerPolicy {
    pub daily_withdrawal_limit: Cents,
    pub external_transfer_fee: Cents,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            daily_withdrawal_limit: DEFAULT_DAILY_WITHDRAWAL_LIMIT,
            external_transfer_fee: DEFAULT_EXTERNAL_TRANSFER_FEE,
        }
    }
}

impl LedgerPolicy {
    pub fn with_daily_withdrawal_limit(mut self, limit: Cents) -> Self {
        self.daily_withdrawal_limit = limit;
        self
    }

    pub fn with_external_transfer_fee(mut self, fee: Cents) -> Self {
        self.external_transfer_fee = fee;
        self
    }
}
