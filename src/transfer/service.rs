//! Transfer Service
//!
//! Entry point of the transfer operation: validates the request, hands the
//! order to the ledger backend and reports the outcome.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::state::TransferOutcome;
use super::types::{TransferOrder, TransferPolicy, TransferReceipt};
use crate::account::AccountId;
use crate::ledger::{Ledger, LedgerError};

/// Cheap to clone; clones share the same ledger.
#[derive(Clone)]
pub struct TransferService {
    ledger: Arc<dyn Ledger>,
    policy: TransferPolicy,
}

impl TransferService {
    pub fn new(ledger: Arc<dyn Ledger>, policy: TransferPolicy) -> Self {
        Self { ledger, policy }
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub fn policy(&self) -> &TransferPolicy {
        &self.policy
    }

    /// Move `amount` from `source` to `target`, atomically.
    ///
    /// Not idempotent: calling twice moves the amount twice. Errors are
    /// returned as-is; retrying a [`LedgerError::Conflict`] is up to the caller.
    pub async fn transfer(
        &self,
        source: AccountId,
        target: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        debug!(
            source = %source,
            target = %target,
            amount = %amount,
            backend = self.ledger.name(),
            "Transfer requested"
        );

        let result = match TransferOrder::new(source, target, amount, &self.policy) {
            Ok(order) => self.ledger.transfer(&order).await,
            Err(e) => Err(e),
        };

        let outcome = TransferOutcome::of(&result);
        match &result {
            Ok(receipt) => info!(
                outcome = %outcome,
                source = %source,
                target = %target,
                amount = %amount,
                source_balance = %receipt.source_balance,
                target_balance = %receipt.target_balance,
                "Transfer finished"
            ),
            Err(e) => warn!(
                outcome = %outcome,
                source = %source,
                target = %target,
                amount = %amount,
                code = e.code(),
                retryable = e.is_retryable(),
                error = %e,
                "Transfer finished"
            ),
        }

        result
    }
}
