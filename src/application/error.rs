use thiserror::Error;

use crate::domain::{Cents, CredentialError, LedgerError, OperationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Credentials(#[from] CredentialError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Account holder name cannot be empty")]
    InvalidName,

    #[error("Opening balance cannot be negative: {0} cents")]
    NegativeOpeningBalance(Cents),

    #[error("No operations to display")]
    EmptyHistory,

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// The domain rejection behind this error, if any.
    pub fn operation_error(&self) -> Option<&OperationError> {
        match self {
            AppError::Ledger(LedgerError::Operation(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<OperationError> for AppError {
    fn from(err: OperationError) -> Self {
        AppError::Ledger(LedgerError::Operation(err))
    }
}
