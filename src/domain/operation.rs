use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_euros, AccountNumber, Cents};

pub type OperationId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Deposit,
    Withdrawal,
    /// Outgoing leg of a transfer (to the holder's own savings or to another customer)
    TransferOut,
    /// Incoming leg of a transfer
    TransferIn,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "deposit",
            OperationKind::Withdrawal => "withdrawal",
            OperationKind::TransferOut => "transfer_out",
            OperationKind::TransferIn => "transfer_in",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The other side of a transfer, as it was named when the transfer happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub name: String,
    pub number: AccountNumber,
}

impl std::fmt::Display for Counterparty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.number)
    }
}

/// One entry of an account's history. Entries are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    /// Ledger-wide sequence number. Both legs of a transfer share it.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: OperationKind,
    /// Signed amount: positive credits the account, negative debits it.
    /// Does not include the fee.
    pub amount: Cents,
    /// Extra amount charged on top of `amount` (external transfers only)
    #[serde(default)]
    pub fee: Cents,
    pub counterparty: Option<Counterparty>,
    pub balance_after: Cents,
}

impl Operation {
    pub(crate) fn new(
        sequence: u64,
        timestamp: DateTime<Utc>,
        kind: OperationKind,
        amount: Cents,
        balance_after: Cents,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            timestamp,
            kind,
            amount,
            fee: 0,
            counterparty: None,
            balance_after,
        }
    }

    pub(crate) fn with_fee(mut self, fee: Cents) -> Self {
        self.fee = fee;
        self
    }

    pub(crate) fn with_counterparty(mut self, counterparty: Counterparty) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    /// Net effect on the balance, fee included.
    pub fn net_amount(&self) -> Cents {
        self.amount - self.fee
    }

    pub fn balance_before(&self) -> Cents {
        self.balance_after - self.net_amount()
    }

    /// Human-readable description of the operation.
    pub fn label(&self) -> String {
        let magnitude = format_euros(self.amount.abs());
        let other = self
            .counterparty
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unknown account".to_string());

        match self.kind {
            OperationKind::Deposit => format!("+{} deposited", magnitude),
            OperationKind::Withdrawal => format!("-{} withdrawn", magnitude),
            OperationKind::TransferOut if self.fee > 0 => format!(
                "External transfer of -{} + {} fee to {}",
                magnitude,
                format_euros(self.fee),
                other
            ),
            OperationKind::TransferOut => format!("Transfer of -{} to {}", magnitude, other),
            OperationKind::TransferIn => {
                format!("Transfer received +{} from {}", magnitude, other)
            }
        }
    }
}
