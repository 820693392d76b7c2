//! account-ledger - Exact-decimal Account Ledger
//!
//! Stores account balances and moves money between two accounts atomically.
//!
//! # Modules
//!
//! - [`account`] - Account and owner data records
//! - [`money`] - Exact-decimal amount validation
//! - [`ledger`] - Balance store trait with PostgreSQL and in-memory backends
//! - [`transfer`] - The atomic two-account transfer operation
//! - [`seed`] - Sample account provisioning
//! - [`db`] - PostgreSQL pool and embedded migrations
//! - [`config`] / [`logging`] - YAML configuration and tracing setup
//! - [`testing`] - Per-test setup/teardown fixtures
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), account_ledger::LedgerError> {
//! use std::sync::Arc;
//! use account_ledger::{InMemoryLedger, Ledger, TransferPolicy, TransferService};
//! use rust_decimal::Decimal;
//!
//! let ledger = Arc::new(InMemoryLedger::new());
//! let john = ledger.open_account("John Smith", Decimal::new(100_000, 2)).await?;
//! let mary = ledger.open_account("Mary Jane", Decimal::new(200_000, 2)).await?;
//!
//! let service = TransferService::new(ledger.clone(), TransferPolicy::default());
//! let receipt = service.transfer(mary, john, Decimal::new(50_000, 2)).await?;
//! assert_eq!(receipt.target_balance, Decimal::new(150_000, 2));
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod seed;
pub mod testing;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountId, Person, PersonId};
pub use ledger::{InMemoryLedger, Ledger, LedgerError, PgLedger};
pub use money::AmountError;
pub use transfer::{
    OverdraftPolicy, TransferOrder, TransferOutcome, TransferPolicy, TransferReceipt,
    TransferService,
};
