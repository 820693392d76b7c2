//! Transfer Outcome
//!
//! A transfer is a single transaction with exactly two terminal outcomes.
//! There is no intermediate state visible outside the transaction.

use std::fmt;

/// Terminal outcome of one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferOutcome {
    /// Both balances updated
    Committed,

    /// No balance updated
    Aborted,
}

impl TransferOutcome {
    /// Outcome implied by the result of a transfer call
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => TransferOutcome::Committed,
            Err(_) => TransferOutcome::Aborted,
        }
    }

    /// Get human-readable outcome name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferOutcome::Committed => "COMMITTED",
            TransferOutcome::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
