use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::{
    balance_series, Account, AccountNumber, AccountSelector, Cents, Ledger, LedgerPolicy,
    Operation, Pin, TransferReceipt,
};
use crate::storage::JsonStore;

use super::{AccountListing, AppError, EvolutionReport, Overview, SavingsSummary, Statement};

/// Holder of a successful login. Operations act on this holder's primary
/// account and Livret A.
#[derive(Debug, Clone)]
pub struct Session {
    pub number: AccountNumber,
    pub name: String,
}

/// Application service providing the bank operations on top of a ledger file.
/// Every successful mutation rewrites the file; rejected ones leave it alone.
pub struct BankService {
    store: JsonStore,
    ledger: Ledger,
}

impl BankService {
    /// Create a new ledger file at `path`, optionally seeded with the two
    /// demo customers.
    pub async fn init(
        path: impl AsRef<Path>,
        policy: LedgerPolicy,
        demo: bool,
    ) -> Result<Self, AppError> {
        validate_policy(&policy)?;

        let store = JsonStore::new(path.as_ref());
        let mut ledger = Ledger::new(policy);
        if demo {
            for (name, number, pin) in DEMO_ACCOUNTS {
                ledger.open_account(Account::new(
                    *name,
                    AccountNumber::parse(number)?,
                    Pin::parse(pin)?,
                    DEMO_OPENING_BALANCE,
                ))?;
            }
        }

        store.create(&ledger).await?;
        tracing::info!(path = %store.path().display(), demo, "Ledger initialized");
        Ok(Self { store, ledger })
    }

    /// Load an existing ledger file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let store = JsonStore::new(path.as_ref());
        let ledger = store.load().await?;
        Ok(Self { store, ledger })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    async fn commit(&self) -> Result<(), AppError> {
        self.store.save(&self.ledger).await?;
        Ok(())
    }

    // ========================
    // Administration
    // ========================

    /// Register a new customer.
    pub async fn open_account(
        &mut self,
        name: &str,
        number: &str,
        pin: &str,
        opening_balance: Cents,
    ) -> Result<Account, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidName);
        }
        if opening_balance < 0 {
            return Err(AppError::NegativeOpeningBalance(opening_balance));
        }

        let account = Account::new(
            name,
            AccountNumber::parse(number)?,
            Pin::parse(pin)?,
            opening_balance,
        );
        let account = self.ledger.open_account(account)?.clone();
        self.commit().await?;

        tracing::info!(number = %account.number, name = %account.name, "Account opened");
        Ok(account)
    }

    /// Directory of all customers.
    pub fn list_accounts(&self) -> Vec<AccountListing> {
        self.ledger
            .accounts()
            .map(|account| AccountListing {
                name: account.name.clone(),
                number: account.number.clone(),
                balance: account.balance,
                savings_balance: self.ledger.savings_of(&account.number).map(|s| s.balance),
                operation_count: account.history.len(),
            })
            .collect()
    }

    // ========================
    // Session
    // ========================

    /// Check credentials and open a session for the holder.
    pub fn login(&self, number: &str, pin: &str) -> Result<Session, AppError> {
        let account = self.ledger.authenticate(number, pin).inspect_err(|err| {
            tracing::warn!(number, %err, "Login rejected");
        })?;

        tracing::debug!(number = %account.number, "Logged in");
        Ok(Session {
            number: account.number.clone(),
            name: account.name.clone(),
        })
    }

    pub fn overview(&self, session: &Session, now: DateTime<Utc>) -> Result<Overview, AppError> {
        let account = self.ledger.account(&session.number)?;
        let savings = self
            .ledger
            .savings_of(&session.number)
            .map(|s| SavingsSummary {
                name: s.name.clone(),
                number: s.number.clone(),
                balance: s.balance,
            });

        Ok(Overview {
            name: account.name.clone(),
            number: account.number.clone(),
            balance: account.balance,
            savings,
            withdrawn_today: account.withdrawals.withdrawn_on(now.date_naive()),
            policy: self.ledger.policy,
        })
    }

    /// Open the holder's Livret A.
    pub async fn open_savings(&mut self, session: &Session) -> Result<Account, AppError> {
        let livret = self.ledger.open_savings(&session.number)?.clone();
        self.commit().await?;

        tracing::info!(owner = %session.number, number = %livret.number, "Livret A opened");
        Ok(livret)
    }

    // ========================
    // Operations
    // ========================

    pub async fn deposit(
        &mut self,
        session: &Session,
        which: AccountSelector,
        amount: Cents,
        at: DateTime<Utc>,
    ) -> Result<Operation, AppError> {
        let op = self
            .ledger
            .deposit(&session.number, which, amount, at)
            .inspect_err(|err| rejected("deposit", session, which, err))?;
        self.commit().await?;

        tracing::info!(
            owner = %session.number,
            account = %which,
            amount,
            balance = op.balance_after,
            "Deposit recorded"
        );
        Ok(op)
    }

    pub async fn withdraw(
        &mut self,
        session: &Session,
        which: AccountSelector,
        amount: Cents,
        at: DateTime<Utc>,
    ) -> Result<Operation, AppError> {
        let op = self
            .ledger
            .withdraw(&session.number, which, amount, at)
            .inspect_err(|err| rejected("withdrawal", session, which, err))?;
        self.commit().await?;

        tracing::info!(
            owner = %session.number,
            account = %which,
            amount,
            balance = op.balance_after,
            "Withdrawal recorded"
        );
        Ok(op)
    }

    /// Move money between the holder's two accounts. `from` is the debited one.
    pub async fn transfer_internal(
        &mut self,
        session: &Session,
        from: AccountSelector,
        amount: Cents,
        at: DateTime<Utc>,
    ) -> Result<TransferReceipt, AppError> {
        let receipt = self
            .ledger
            .transfer_internal(&session.number, from, amount, at)
            .inspect_err(|err| rejected("internal transfer", session, from, err))?;
        self.commit().await?;

        tracing::info!(
            from = %receipt.from.number,
            to = %receipt.to.number,
            amount,
            "Internal transfer recorded"
        );
        Ok(receipt)
    }

    /// Send money to another customer's primary account, fee included.
    pub async fn transfer_external(
        &mut self,
        session: &Session,
        from: AccountSelector,
        recipient: &str,
        amount: Cents,
        at: DateTime<Utc>,
    ) -> Result<TransferReceipt, AppError> {
        let recipient = AccountNumber::parse(recipient)?;
        let receipt = self
            .ledger
            .transfer_external(&session.number, from, &recipient, amount, at)
            .inspect_err(|err| rejected("external transfer", session, from, err))?;
        self.commit().await?;

        tracing::info!(
            from = %receipt.from.number,
            to = %receipt.to.number,
            amount,
            fee = receipt.fee,
            "External transfer recorded"
        );
        Ok(receipt)
    }

    // ========================
    // Queries
    // ========================

    pub fn history(
        &self,
        session: &Session,
        which: AccountSelector,
    ) -> Result<Vec<Operation>, AppError> {
        Ok(self.ledger.select(&session.number, which)?.history.clone())
    }

    /// Account dump: header and full history.
    pub fn statement(
        &self,
        session: &Session,
        which: AccountSelector,
    ) -> Result<Statement, AppError> {
        let account = self.ledger.select(&session.number, which)?;
        Ok(Statement {
            selector: which,
            name: account.name.clone(),
            number: account.number.clone(),
            balance: account.balance,
            history: account.history.clone(),
        })
    }

    /// Balance evolution of the primary account, the Livret A and their sum.
    pub fn evolution(&self, session: &Session) -> Result<EvolutionReport, AppError> {
        let primary = self.ledger.account(&session.number)?;
        let savings = self.ledger.savings_of(&session.number);

        let points = balance_series(primary, savings);
        if points.is_empty() {
            return Err(AppError::EmptyHistory);
        }

        Ok(EvolutionReport {
            generated_at: Utc::now(),
            number: session.number.clone(),
            has_savings: savings.is_some(),
            points,
        })
    }
}

const DEMO_ACCOUNTS: &[(&str, &str, &str)] = &[
    ("Ross", "950201848", "1350"),
    ("Rachel", "194572957", "3450"),
];

const DEMO_OPENING_BALANCE: Cents = 200000;

fn validate_policy(policy: &LedgerPolicy) -> Result<(), AppError> {
    if policy.daily_withdrawal_limit <= 0 {
        return Err(AppError::InvalidPolicy(
            "daily withdrawal limit must be positive".to_string(),
        ));
    }
    if policy.external_transfer_fee < 0 {
        return Err(AppError::InvalidPolicy(
            "external transfer fee cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn rejected(
    operation: &str,
    session: &Session,
    which: AccountSelector,
    err: &crate::domain::LedgerError,
) {
    tracing::warn!(owner = %session.number, account = %which, %err, "Rejected {}", operation);
}
