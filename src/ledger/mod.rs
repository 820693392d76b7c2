//! Account Ledger
//!
//! Storage of account balances keyed by account identity. Two backends
//! implement [`Ledger`]:
//!
//! - [`PgLedger`] - PostgreSQL `accounts` / `people` tables, row locks via
//!   `SELECT ... FOR UPDATE` inside one transaction per transfer.
//! - [`InMemoryLedger`] - per-account async mutexes, for tests and demos.
//!
//! Both lock the two rows of a transfer in ascending id order, so transfers
//! over disjoint accounts run concurrently and overlapping ones serialize
//! without deadlocking.

pub mod error;
pub mod fault;
pub mod memory;
pub mod postgres;

pub use error::LedgerError;
pub use fault::FaultInjector;
pub use memory::InMemoryLedger;
pub use postgres::PgLedger;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::account::{Account, AccountId};
use crate::transfer::{TransferOrder, TransferReceipt};

/// Balance store operations
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Get backend name for logging
    fn name(&self) -> &'static str;

    /// Current balance of an account
    async fn get_balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError>;

    /// Overwrite a balance (single-row update)
    ///
    /// Bypasses the transfer operation; meant for provisioning and tests.
    async fn set_balance(&self, account_id: AccountId, balance: Decimal)
    -> Result<(), LedgerError>;

    /// Resolve the one account owned by a person with this name.
    ///
    /// Names are not assumed unique: zero matches is
    /// [`LedgerError::OwnerNotFound`], several is [`LedgerError::AmbiguousOwner`].
    async fn find_account_id_by_owner_name(&self, name: &str) -> Result<AccountId, LedgerError>;

    /// Account with its owner
    async fn get_account(&self, account_id: AccountId) -> Result<Account, LedgerError>;

    /// All accounts ordered by id
    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError>;

    /// Provision a new owner and account. Ids are assigned by the store.
    async fn open_account(
        &self,
        owner_name: &str,
        opening_balance: Decimal,
    ) -> Result<AccountId, LedgerError>;

    /// Apply a validated transfer as one atomic unit.
    ///
    /// On any error neither balance has changed.
    async fn transfer(&self, order: &TransferOrder) -> Result<TransferReceipt, LedgerError>;
}

/// Owner-name lookup result from a list of matching account ids
pub(crate) fn single_owner_match(
    name: &str,
    matches: Vec<AccountId>,
) -> Result<AccountId, LedgerError> {
    match matches.as_slice() {
        [] => Err(LedgerError::OwnerNotFound(name.to_string())),
        [id] => Ok(*id),
        many => Err(LedgerError::AmbiguousOwner {
            name: name.to_string(),
            matches: many.len(),
        }),
    }
}

fn receipt(order: &TransferOrder, settlement: &crate::transfer::Settlement) -> TransferReceipt {
    TransferReceipt {
        source: order.source(),
        target: order.target(),
        amount: order.amount(),
        source_balance: settlement.source_balance,
        target_balance: settlement.target_balance,
    }
}
