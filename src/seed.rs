//! Sample data provisioning
//!
//! The two accounts the ledger is demonstrated and tested with.

use rust_decimal::Decimal;
use tracing::info;

use crate::account::AccountId;
use crate::ledger::{Ledger, LedgerError};

pub const JOHN_SMITH: &str = "John Smith";
pub const MARY_JANE: &str = "Mary Jane";

/// Ids of the provisioned sample accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleAccounts {
    pub john: AccountId,
    pub mary: AccountId,
}

/// `(owner, opening balance)` of each sample account
pub fn sample_balances() -> [(&'static str, Decimal); 2] {
    [
        (JOHN_SMITH, Decimal::new(100_000, 2)), // 1000.00
        (MARY_JANE, Decimal::new(200_000, 2)),  // 2000.00
    ]
}

/// Open the sample accounts on `ledger`
pub async fn seed_sample(ledger: &dyn Ledger) -> Result<SampleAccounts, LedgerError> {
    let [(john_name, john_balance), (mary_name, mary_balance)] = sample_balances();

    let john = ledger.open_account(john_name, john_balance).await?;
    let mary = ledger.open_account(mary_name, mary_balance).await?;

    info!(john = %john, mary = %mary, backend = ledger.name(), "Sample accounts provisioned");
    Ok(SampleAccounts { john, mary })
}
