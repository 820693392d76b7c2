//! Forced-abort hooks
//!
//! Lets tests interrupt a transfer after the source debit has been written
//! but before the target credit, to prove the debit does not survive.
//! Without the `fault-injection` feature nothing can arm a fault and every
//! check is a no-op.

#[cfg(feature = "fault-injection")]
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::LedgerError;
use crate::transfer::TransferOrder;

#[derive(Debug, Default)]
pub struct FaultInjector {
    #[cfg(feature = "fault-injection")]
    fail_after_debit: AtomicBool,
}

impl FaultInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the next transfer right after its debit. One-shot.
    #[cfg(feature = "fault-injection")]
    pub fn fail_after_debit(&self) {
        self.fail_after_debit.store(true, Ordering::SeqCst);
    }

    /// Called by ledger backends between the two balance writes.
    #[cfg(feature = "fault-injection")]
    pub(crate) fn check_after_debit(&self, order: &TransferOrder) -> Result<(), LedgerError> {
        if self.fail_after_debit.swap(false, Ordering::SeqCst) {
            tracing::warn!(
                source = %order.source(),
                target = %order.target(),
                "Injected fault after debit"
            );
            return Err(LedgerError::Aborted("injected fault after debit".to_string()));
        }
        Ok(())
    }

    #[cfg(not(feature = "fault-injection"))]
    pub(crate) fn check_after_debit(&self, _order: &TransferOrder) -> Result<(), LedgerError> {
        Ok(())
    }
}
