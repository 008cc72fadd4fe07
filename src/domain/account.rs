use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{format_euros, Cents, Counterparty, Operation, OperationKind};

/// Prefix that turns an owner's account number into its savings account number.
pub const SAVINGS_PREFIX: &str = "LIV";

const ACCOUNT_NUMBER_LEN: usize = 9;
const PIN_LEN: usize = 4;

/// Account identifier. Primary accounts use exactly 9 digits; a savings
/// account reuses its owner's number behind [`SAVINGS_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Parse a primary account number (the login key).
    pub fn parse(input: &str) -> Result<Self, CredentialError> {
        if input.len() == ACCOUNT_NUMBER_LEN && input.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(CredentialError::InvalidAccountNumber)
        }
    }

    /// Number of the savings account attached to this primary account.
    pub fn savings(&self) -> Self {
        Self(format!("{}{}", SAVINGS_PREFIX, self.0))
    }

    pub fn is_savings(&self) -> bool {
        self.0.starts_with(SAVINGS_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four-digit password. Stored in clear: this ledger is a single-user tool.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(String);

impl Pin {
    pub fn parse(input: &str) -> Result<Self, CredentialError> {
        if input.len() == PIN_LEN && input.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(CredentialError::InvalidPin)
        }
    }

    pub fn matches(&self, other: &Pin) -> bool {
        self.0 == other.0
    }
}

impl std::fmt::Debug for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// Amount withdrawn on a given calendar day (UTC).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWithdrawals {
    pub day: Option<NaiveDate>,
    pub total: Cents,
}

impl DailyWithdrawals {
    /// Amount already withdrawn on `day`. A counter left over from an
    /// earlier day counts as zero.
    pub fn withdrawn_on(&self, day: NaiveDate) -> Cents {
        if self.day == Some(day) { self.total } else { 0 }
    }

    fn record(&mut self, day: NaiveDate, amount: Cents) {
        let total = self.withdrawn_on(day) + amount;
        self.day = Some(day);
        self.total = total;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub number: AccountNumber,
    pub pin: Pin,
    pub balance: Cents,
    #[serde(default)]
    pub withdrawals: DailyWithdrawals,
    #[serde(default)]
    pub history: Vec<Operation>,
}

impl Account {
    pub fn new(name: impl Into<String>, number: AccountNumber, pin: Pin, balance: Cents) -> Self {
        Self {
            name: name.into(),
            number,
            pin,
            balance,
            withdrawals: DailyWithdrawals::default(),
            history: Vec::new(),
        }
    }

    pub fn is_savings(&self) -> bool {
        self.number.is_savings()
    }

    pub fn counterparty(&self) -> Counterparty {
        Counterparty {
            name: self.name.clone(),
            number: self.number.clone(),
        }
    }

    /// Balance before the first recorded operation.
    pub fn opening_balance(&self) -> Cents {
        self.history
            .first()
            .map(Operation::balance_before)
            .unwrap_or(self.balance)
    }

    /// Credit `amount` to the account.
    pub fn deposit(
        &mut self,
        amount: Cents,
        at: DateTime<Utc>,
        sequence: u64,
    ) -> Result<Operation, OperationError> {
        self.ensure_can_receive(amount)?;

        self.balance += amount;
        Ok(self.push(Operation::new(
            sequence,
            at,
            OperationKind::Deposit,
            amount,
            self.balance,
        )))
    }

    /// Debit `amount` from the account, honoring the daily cap.
    /// Funds are checked before the cap.
    pub fn withdraw(
        &mut self,
        amount: Cents,
        daily_limit: Cents,
        at: DateTime<Utc>,
        sequence: u64,
    ) -> Result<Operation, OperationError> {
        ensure_positive(amount)?;
        self.ensure_funds(amount)?;

        let day = at.date_naive();
        let already = self.withdrawals.withdrawn_on(day);
        if already.saturating_add(amount) > daily_limit {
            return Err(OperationError::DailyLimitExceeded {
                limit: daily_limit,
                already_withdrawn: already,
                requested: amount,
            });
        }

        self.balance -= amount;
        self.withdrawals.record(day, amount);
        Ok(self.push(Operation::new(
            sequence,
            at,
            OperationKind::Withdrawal,
            -amount,
            self.balance,
        )))
    }

    /// Check that `amount` plus `fee` can leave the account.
    pub fn ensure_can_send(&self, amount: Cents, fee: Cents) -> Result<(), OperationError> {
        ensure_positive(amount)?;
        let required = amount
            .checked_add(fee)
            .ok_or(OperationError::AmountTooLarge(amount))?;
        self.ensure_funds(required)
    }

    /// Check that crediting `amount` keeps the balance representable.
    pub fn ensure_can_receive(&self, amount: Cents) -> Result<(), OperationError> {
        ensure_positive(amount)?;
        match self.balance.checked_add(amount) {
            Some(_) => Ok(()),
            None => Err(OperationError::AmountTooLarge(amount)),
        }
    }

    pub(crate) fn send(
        &mut self,
        amount: Cents,
        fee: Cents,
        to: Counterparty,
        at: DateTime<Utc>,
        sequence: u64,
    ) -> Result<Operation, OperationError> {
        self.ensure_can_send(amount, fee)?;

        self.balance -= amount + fee;
        Ok(self.push(
            Operation::new(sequence, at, OperationKind::TransferOut, -amount, self.balance)
                .with_fee(fee)
                .with_counterparty(to),
        ))
    }

    pub(crate) fn receive(
        &mut self,
        amount: Cents,
        from: Counterparty,
        at: DateTime<Utc>,
        sequence: u64,
    ) -> Result<Operation, OperationError> {
        self.ensure_can_receive(amount)?;

        self.balance += amount;
        Ok(self.push(
            Operation::new(sequence, at, OperationKind::TransferIn, amount, self.balance)
                .with_counterparty(from),
        ))
    }

    /// Render the account header and full history, one line per operation.
    pub fn statement(&self) -> String {
        let mut out = format!(
            "{}, account no. {}, balance: {}\n",
            self.name,
            self.number,
            format_euros(self.balance)
        );
        if self.history.is_empty() {
            out.push_str("History: (empty)\n");
        } else {
            out.push_str("History:\n");
            for op in &self.history {
                out.push_str(&format!(
                    "  {}  {}\n",
                    op.timestamp.format("%Y-%m-%d %H:%M"),
                    op.label()
                ));
            }
        }
        out
    }

    fn ensure_funds(&self, required: Cents) -> Result<(), OperationError> {
        if required > self.balance {
            return Err(OperationError::InsufficientFunds {
                balance: self.balance,
                required,
            });
        }
        Ok(())
    }

    fn push(&mut self, operation: Operation) -> Operation {
        self.history.push(operation.clone());
        operation
    }
}

fn ensure_positive(amount: Cents) -> Result<(), OperationError> {
    if amount <= 0 {
        return Err(OperationError::InvalidAmount(amount));
    }
    Ok(())
}

/// Rejection of a single-account operation. The account is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    InvalidAmount(Cents),
    /// The amount would push a balance or a debit past what `Cents` holds
    AmountTooLarge(Cents),
    InsufficientFunds {
        balance: Cents,
        required: Cents,
    },
    DailyLimitExceeded {
        limit: Cents,
        already_withdrawn: Cents,
        requested: Cents,
    },
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationError::InvalidAmount(amount) => {
                write!(f, "Invalid amount: {}", format_euros(*amount))
            }
            OperationError::AmountTooLarge(amount) => {
                write!(f, "Amount too large: {}", format_euros(*amount))
            }
            OperationError::InsufficientFunds { balance, required } => write!(
                f,
                "Insufficient funds: balance {}, required {}",
                format_euros(*balance),
                format_euros(*required)
            ),
            OperationError::DailyLimitExceeded {
                limit,
                already_withdrawn,
                requested,
            } => write!(
                f,
                "Daily withdrawal limit of {} reached ({} already withdrawn today, {} requested)",
                format_euros(*limit),
                format_euros(*already_withdrawn),
                format_euros(*requested)
            ),
        }
    }
}

impl std::error::Error for OperationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    InvalidAccountNumber,
    InvalidPin,
    /// Unknown account number or wrong PIN
    Mismatch,
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::InvalidAccountNumber => {
                write!(f, "Account number must contain exactly 9 digits")
            }
            CredentialError::InvalidPin => write!(f, "Password must contain exactly 4 digits"),
            CredentialError::Mismatch => write!(f, "Invalid account number or password"),
        }
    }
}

impl std::error::Error for CredentialError {}
