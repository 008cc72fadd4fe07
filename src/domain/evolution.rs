use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Account, Cents, Operation};

/// Balances of a holder's accounts right after one ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub primary: Cents,
    pub savings: Cents,
    pub total: Cents,
}

/// Replay both histories in sequence order and record the balances after
/// every event that touched either account.
///
/// A transfer between the two accounts is a single event, so the total only
/// moves on deposits, withdrawals and transfers with other customers.
pub fn balance_series(primary: &Account, savings: Option<&Account>) -> Vec<BalancePoint> {
    let mut events: BTreeMap<u64, (Option<&Operation>, Option<&Operation>)> = BTreeMap::new();
    for op in &primary.history {
        events.entry(op.sequence).or_default().0 = Some(op);
    }
    for op in savings.into_iter().flat_map(|s| s.history.iter()) {
        events.entry(op.sequence).or_default().1 = Some(op);
    }

    let mut primary_balance = primary.opening_balance();
    let mut savings_balance = savings.map(Account::opening_balance).unwrap_or(0);

    events
        .into_iter()
        .filter_map(|(sequence, (p, s))| {
            if let Some(op) = p {
                primary_balance = op.balance_after;
            }
            if let Some(op) = s {
                savings_balance = op.balance_after;
            }
            // The primary leg describes internal transfers from the holder's side
            let shown = p.or(s)?;
            Some(BalancePoint {
                sequence,
                timestamp: shown.timestamp,
                label: shown.label(),
                primary: primary_balance,
                savings: savings_balance,
                total: primary_balance.saturating_add(savings_balance),
            })
        })
        .collect()
}
