//! Account management module
//!
//! Plain data records for accounts and their owners. Balances are only
//! mutated through the [`Ledger`](crate::ledger::Ledger).

pub mod models;

// Re-export commonly used types
pub use models::{Account, AccountId, Person, PersonId};
