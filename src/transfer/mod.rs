//! Transfer Operation
//!
//! Moves an exact decimal amount from one account to another, atomically.
//!
//! # Flow
//!
//! ```text
//! TransferService::transfer(source, target, amount)
//!     │  TransferOrder::new       amount > 0, fits money scale, source != target
//!     ▼
//! Ledger::transfer(order)         lock both rows (ascending id)
//!     │  settle()                 source - amount, target + amount, overdraft policy
//!     ▼
//! COMMITTED (both written)  |  ABORTED (nothing written)
//! ```
//!
//! # Invariants
//!
//! 1. **Atomicity**: both balances change or neither does.
//! 2. **Conservation**: `source + target` is the same before and after.
//! 3. **No deduplication**: identical calls each move the amount.

pub mod service;
pub mod settle;
pub mod state;
pub mod types;

// Re-exports for convenience
pub use service::TransferService;
pub use settle::{Settlement, settle};
pub use state::TransferOutcome;
pub use types::{OverdraftPolicy, TransferOrder, TransferPolicy, TransferReceipt};
