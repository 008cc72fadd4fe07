use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AccountNumber, AccountSelector, BalancePoint, Cents, LedgerPolicy, Operation,
};

/// What the holder sees right after logging in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub name: String,
    pub number: AccountNumber,
    pub balance: Cents,
    pub savings: Option<SavingsSummary>,
    pub withdrawn_today: Cents,
    pub policy: LedgerPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsSummary {
    pub name: String,
    pub number: AccountNumber,
    pub balance: Cents,
}

/// Account dump: header plus full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub selector: AccountSelector,
    pub name: String,
    pub number: AccountNumber,
    pub balance: Cents,
    pub history: Vec<Operation>,
}

/// Balance evolution of the holder's accounts, one point per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub generated_at: DateTime<Utc>,
    pub number: AccountNumber,
    pub has_savings: bool,
    pub points: Vec<BalancePoint>,
}

/// Row of the account directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountListing {
    pub name: String,
    pub number: AccountNumber,
    pub balance: Cents,
    pub savings_balance: Option<Cents>,
    pub operation_count: usize,
}
