//! Ledger Error Types

use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::AccountId;
use crate::money::AmountError;

/// SQLSTATE codes the caller may retry on
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
/// `numeric field overflow`: the value does not fit `NUMERIC(19, 2)`
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Ledger and transfer error types
///
/// Every failure leaves balances unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Lookup Errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("No account owned by '{0}'")]
    OwnerNotFound(String),

    #[error("Owner name '{name}' matches {matches} accounts")]
    AmbiguousOwner { name: String, matches: usize },

    // === Validation Errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Source and target account cannot be the same")]
    SameAccount,

    #[error("Insufficient balance in account {account}: balance {balance}, amount {amount}")]
    InsufficientBalance {
        account: AccountId,
        balance: Decimal,
        amount: Decimal,
    },

    // === Transaction Errors ===
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    #[error("Transfer aborted: {0}")]
    Aborted(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::AccountNotFound(_)
            | LedgerError::OwnerNotFound(_)
            | LedgerError::AmbiguousOwner { .. } => "NOT_FOUND",
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::SameAccount => "SAME_ACCOUNT",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::Conflict(_) => "TRANSACTION_CONFLICT",
            LedgerError::Aborted(_) => "ABORTED",
            LedgerError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Account or owner did not resolve to exactly one row
    pub fn is_not_found(&self) -> bool {
        self.code() == "NOT_FOUND"
    }

    /// Only concurrent-write conflicts are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict(_))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e
            && let Some(code) = db_err.code()
        {
            match code.as_ref() {
                SERIALIZATION_FAILURE | DEADLOCK_DETECTED => {
                    return LedgerError::Conflict(db_err.message().to_string());
                }
                NUMERIC_VALUE_OUT_OF_RANGE => {
                    return LedgerError::InvalidAmount(AmountError::Overflow);
                }
                _ => {}
            }
        }
        LedgerError::Database(e.to_string())
    }
}
