//! Transfer Core Types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::ledger::LedgerError;
use crate::money;

/// Whether a transfer may leave the source balance below zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverdraftPolicy {
    /// Negative balances are permitted
    #[default]
    Allow,
    /// Reject transfers that would overdraw the source
    Forbid,
}

/// Validation rules applied to every transfer request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPolicy {
    /// Maximum fractional digits of an amount
    pub scale: u32,
    pub overdraft: OverdraftPolicy,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            scale: money::DEFAULT_SCALE,
            overdraft: OverdraftPolicy::Allow,
        }
    }
}

impl From<&crate::config::LedgerConfig> for TransferPolicy {
    fn from(config: &crate::config::LedgerConfig) -> Self {
        Self {
            scale: config.scale,
            overdraft: config.overdraft,
        }
    }
}

/// A validated transfer, ready for a ledger backend to apply.
///
/// Only constructible through [`TransferOrder::new`], so a backend can rely
/// on a positive, exactly representable amount and two distinct accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOrder {
    source: AccountId,
    target: AccountId,
    amount: Decimal,
    overdraft: OverdraftPolicy,
}

impl TransferOrder {
    pub fn new(
        source: AccountId,
        target: AccountId,
        amount: Decimal,
        policy: &TransferPolicy,
    ) -> Result<Self, LedgerError> {
        let amount = money::validate_amount(amount, policy.scale)?;

        if source == target {
            return Err(LedgerError::SameAccount);
        }

        Ok(Self {
            source,
            target,
            amount,
            overdraft: policy.overdraft,
        })
    }

    #[inline]
    pub fn source(&self) -> AccountId {
        self.source
    }

    #[inline]
    pub fn target(&self) -> AccountId {
        self.target
    }

    #[inline]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    #[inline]
    pub fn overdraft(&self) -> OverdraftPolicy {
        self.overdraft
    }

    /// Both account ids, lowest first. Rows are locked in this order.
    pub fn lock_order(&self) -> [AccountId; 2] {
        if self.source < self.target {
            [self.source, self.target]
        } else {
            [self.target, self.source]
        }
    }
}

/// Committed transfer with the balances it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub source: AccountId,
    pub target: AccountId,
    pub amount: Decimal,
    pub source_balance: Decimal,
    pub target_balance: Decimal,
}
