use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Account, AccountNumber, Cents, Counterparty, CredentialError, LedgerPolicy, Operation,
    OperationError, Pin,
};

/// Which of the holder's two accounts an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountSelector {
    /// The current account the holder logs in with
    Primary,
    /// The holder's Livret A
    Savings,
}

impl AccountSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountSelector::Primary => "primary",
            AccountSelector::Savings => "savings",
        }
    }

    /// The other account of the pair, used by internal transfers.
    pub fn other(&self) -> Self {
        match self {
            AccountSelector::Primary => AccountSelector::Savings,
            AccountSelector::Savings => AccountSelector::Primary,
        }
    }
}

impl std::fmt::Display for AccountSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Both legs of a completed transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub sequence: u64,
    pub debit: Operation,
    pub credit: Operation,
    pub from: Counterparty,
    pub to: Counterparty,
    pub amount: Cents,
    pub fee: Cents,
    /// Recipient belongs to another customer
    pub external: bool,
}

/// Registry of primary accounts and their savings sub-accounts.
///
/// Savings accounts are keyed by their owner's primary account number.
/// Every successful operation takes the next sequence number; both legs of
/// a transfer share one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub policy: LedgerPolicy,
    accounts: BTreeMap<AccountNumber, Account>,
    savings: BTreeMap<AccountNumber, Account>,
    #[serde(default)]
    last_sequence: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerPolicy::default())
    }
}

impl Ledger {
    pub fn new(policy: LedgerPolicy) -> Self {
        Self {
            policy,
            accounts: BTreeMap::new(),
            savings: BTreeMap::new(),
            last_sequence: 0,
        }
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    // ========================
    // Registry
    // ========================

    /// Register a new primary account.
    pub fn open_account(&mut self, account: Account) -> Result<&Account, LedgerError> {
        if account.is_savings() {
            return Err(LedgerError::NotAPrimaryAccount(account.number));
        }
        if self.accounts.contains_key(&account.number) {
            return Err(LedgerError::AccountExists(account.number));
        }
        let number = account.number.clone();
        Ok(self.accounts.entry(number).or_insert(account))
    }

    /// Primary accounts, ordered by number.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn account(&self, number: &AccountNumber) -> Result<&Account, LedgerError> {
        self.accounts
            .get(number)
            .ok_or_else(|| LedgerError::AccountNotFound(number.clone()))
    }

    pub fn savings_of(&self, owner: &AccountNumber) -> Option<&Account> {
        self.savings.get(owner)
    }

    /// Resolve one of the holder's accounts.
    pub fn select(
        &self,
        owner: &AccountNumber,
        which: AccountSelector,
    ) -> Result<&Account, LedgerError> {
        match which {
            AccountSelector::Primary => self.account(owner),
            AccountSelector::Savings => {
                self.account(owner)?;
                self.savings_of(owner)
                    .ok_or_else(|| LedgerError::NoSavingsAccount(owner.clone()))
            }
        }
    }

    fn select_mut(
        &mut self,
        owner: &AccountNumber,
        which: AccountSelector,
    ) -> Result<&mut Account, LedgerError> {
        let map = match which {
            AccountSelector::Primary => &mut self.accounts,
            AccountSelector::Savings => &mut self.savings,
        };
        map.get_mut(owner).ok_or_else(|| match which {
            AccountSelector::Primary => LedgerError::AccountNotFound(owner.clone()),
            AccountSelector::Savings => LedgerError::NoSavingsAccount(owner.clone()),
        })
    }

    /// Open the Livret A attached to `owner`, empty, sharing the owner's PIN.
    pub fn open_savings(&mut self, owner: &AccountNumber) -> Result<&Account, LedgerError> {
        let primary = self.account(owner)?;
        if self.savings.contains_key(owner) {
            return Err(LedgerError::SavingsAlreadyOpen(owner.clone()));
        }

        let livret = Account::new(
            format!("Livret A de {}", primary.name),
            owner.savings(),
            primary.pin.clone(),
            0,
        );
        Ok(self.savings.entry(owner.clone()).or_insert(livret))
    }

    /// Check login credentials and return the primary account they open.
    pub fn authenticate(&self, number: &str, pin: &str) -> Result<&Account, CredentialError> {
        let number = AccountNumber::parse(number)?;
        let pin = Pin::parse(pin)?;

        match self.accounts.get(&number) {
            Some(account) if account.pin.matches(&pin) => Ok(account),
            _ => Err(CredentialError::Mismatch),
        }
    }

    // ========================
    // Operations
    // ========================

    pub fn deposit(
        &mut self,
        owner: &AccountNumber,
        which: AccountSelector,
        amount: Cents,
        at: DateTime<Utc>,
    ) -> Result<Operation, LedgerError> {
        let sequence = self.last_sequence + 1;
        let op = self.select_mut(owner, which)?.deposit(amount, at, sequence)?;
        self.last_sequence = sequence;
        Ok(op)
    }

    pub fn withdraw(
        &mut self,
        owner: &AccountNumber,
        which: AccountSelector,
        amount: Cents,
        at: DateTime<Utc>,
    ) -> Result<Operation, LedgerError> {
        let sequence = self.last_sequence + 1;
        let limit = self.policy.daily_withdrawal_limit;
        let op = self
            .select_mut(owner, which)?
            .withdraw(amount, limit, at, sequence)?;
        self.last_sequence = sequence;
        Ok(op)
    }

    /// Move money between the holder's primary account and their savings
    /// account, without fee. `from` names the debited side.
    pub fn transfer_internal(
        &mut self,
        owner: &AccountNumber,
        from: AccountSelector,
        amount: Cents,
        at: DateTime<Utc>,
    ) -> Result<TransferReceipt, LedgerError> {
        let source = self.select(owner, from)?;
        let target = self.select(owner, from.other())?;
        source.ensure_can_send(amount, 0)?;
        target.ensure_can_receive(amount)?;

        let from_party = source.counterparty();
        let to_party = target.counterparty();
        let sequence = self.last_sequence + 1;

        let debit = self
            .select_mut(owner, from)?
            .send(amount, 0, to_party.clone(), at, sequence)?;
        let credit = self
            .select_mut(owner, from.other())?
            .receive(amount, from_party.clone(), at, sequence)?;
        self.last_sequence = sequence;

        Ok(TransferReceipt {
            sequence,
            debit,
            credit,
            from: from_party,
            to: to_party,
            amount,
            fee: 0,
            external: false,
        })
    }

    /// Send money from one of the holder's accounts to another customer's
    /// primary account. The sender pays `amount` plus the policy fee; the
    /// recipient receives `amount`.
    pub fn transfer_external(
        &mut self,
        owner: &AccountNumber,
        from: AccountSelector,
        recipient: &AccountNumber,
        amount: Cents,
        at: DateTime<Utc>,
    ) -> Result<TransferReceipt, LedgerError> {
        if recipient == owner {
            return Err(LedgerError::OwnAccount(recipient.clone()));
        }
        let fee = self.policy.external_transfer_fee;
        let source = self.select(owner, from)?;
        let target = self.account(recipient)?;
        source.ensure_can_send(amount, fee)?;
        target.ensure_can_receive(amount)?;

        let from_party = source.counterparty();
        let to_party = target.counterparty();
        let sequence = self.last_sequence + 1;

        let debit = self
            .select_mut(owner, from)?
            .send(amount, fee, to_party.clone(), at, sequence)?;
        let credit = self
            .select_mut(recipient, AccountSelector::Primary)?
            .receive(amount, from_party.clone(), at, sequence)?;
        self.last_sequence = sequence;

        Ok(TransferReceipt {
            sequence,
            debit,
            credit,
            from: from_party,
            to: to_party,
            amount,
            fee,
            external: true,
        })
    }

    /// Sum of all balances, primary and savings, capped at `Cents::MAX`.
    pub fn total_holdings(&self) -> Cents {
        self.accounts
            .values()
            .chain(self.savings.values())
            .fold(0, |total: Cents, a| total.saturating_add(a.balance))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    AccountNotFound(AccountNumber),
    AccountExists(AccountNumber),
    NotAPrimaryAccount(AccountNumber),
    NoSavingsAccount(AccountNumber),
    SavingsAlreadyOpen(AccountNumber),
    /// External transfer addressed to the sender's own primary account
    OwnAccount(AccountNumber),
    Operation(OperationError),
}

impl From<OperationError> for LedgerError {
    fn from(err: OperationError) -> Self {
        LedgerError::Operation(err)
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::AccountNotFound(n) => write!(f, "Account not found: {}", n),
            LedgerError::AccountExists(n) => write!(f, "Account already exists: {}", n),
            LedgerError::NotAPrimaryAccount(n) => {
                write!(f, "Not a primary account number: {}", n)
            }
            LedgerError::NoSavingsAccount(n) => {
                write!(f, "Account {} has no Livret A", n)
            }
            LedgerError::SavingsAlreadyOpen(n) => {
                write!(f, "Account {} already has a Livret A", n)
            }
            LedgerError::OwnAccount(n) => write!(
                f,
                "Account {} is your own account; use an internal transfer",
                n
            ),
            LedgerError::Operation(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for LedgerError {}
