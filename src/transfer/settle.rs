//! Balance arithmetic for one transfer
//!
//! Pure function shared by every ledger backend. Backends call it while they
//! hold both account rows locked and write its result as one atomic unit.

use rust_decimal::Decimal;

use super::types::{OverdraftPolicy, TransferOrder};
use crate::ledger::LedgerError;
use crate::money::AmountError;

/// New balances produced by a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub source_balance: Decimal,
    pub target_balance: Decimal,
}

/// Compute `source - amount` and `target + amount` under the order's policy.
pub fn settle(
    order: &TransferOrder,
    source_balance: Decimal,
    target_balance: Decimal,
) -> Result<Settlement, LedgerError> {
    let amount = order.amount();

    let new_source = source_balance
        .checked_sub(amount)
        .ok_or(AmountError::Overflow)?;

    if order.overdraft() == OverdraftPolicy::Forbid && new_source < Decimal::ZERO {
        return Err(LedgerError::InsufficientBalance {
            account: order.source(),
            balance: source_balance,
            amount,
        });
    }

    let new_target = target_balance
        .checked_add(amount)
        .ok_or(AmountError::Overflow)?;

    Ok(Settlement {
        source_balance: new_source,
        target_balance: new_target,
    })
}
