//! In-memory ledger backend
//!
//! Each account row owns its balance behind a `tokio::sync::Mutex`, the
//! in-process equivalent of a row lock. Rows live in a `DashMap` so lookups
//! never block on an unrelated transfer.

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

use super::error::LedgerError;
use super::fault::FaultInjector;
use super::{Ledger, receipt, single_owner_match};
use crate::account::{Account, AccountId, Person, PersonId};
use crate::money;
use crate::transfer::{TransferOrder, TransferReceipt, settle};

struct AccountRow {
    id: AccountId,
    owner: Person,
    balance: Mutex<Decimal>,
}

impl AccountRow {
    async fn snapshot(&self) -> Account {
        Account {
            id: self.id,
            balance: *self.balance.lock().await,
            owner: self.owner.clone(),
        }
    }
}

pub struct InMemoryLedger {
    rows: DashMap<AccountId, Arc<AccountRow>>,
    next_account_id: AtomicI32,
    next_person_id: AtomicI32,
    scale: u32,
    faults: FaultInjector,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_scale(money::DEFAULT_SCALE)
    }

    /// Ledger storing balances with `scale` fractional digits
    pub fn with_scale(scale: u32) -> Self {
        Self {
            rows: DashMap::new(),
            next_account_id: AtomicI32::new(1),
            next_person_id: AtomicI32::new(1),
            scale,
            faults: FaultInjector::new(),
        }
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row(&self, account_id: AccountId) -> Result<Arc<AccountRow>, LedgerError> {
        // Clone the Arc out so no map shard lock is held across an await
        self.rows
            .get(&account_id)
            .map(|r| Arc::clone(r.value()))
            .ok_or(LedgerError::AccountNotFound(account_id))
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        let row = self.row(account_id)?;
        let balance = *row.balance.lock().await;
        Ok(balance)
    }

    async fn set_balance(
        &self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<(), LedgerError> {
        let balance = money::check_scale(balance, self.scale)?;
        let row = self.row(account_id)?;
        *row.balance.lock().await = balance;
        debug!(account_id = %account_id, balance = %balance, "Balance overwritten");
        Ok(())
    }

    async fn find_account_id_by_owner_name(&self, name: &str) -> Result<AccountId, LedgerError> {
        let mut matches: Vec<AccountId> = self
            .rows
            .iter()
            .filter(|r| r.owner.name == name)
            .map(|r| r.id)
            .collect();
        matches.sort();
        single_owner_match(name, matches)
    }

    async fn get_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        let row = self.row(account_id)?;
        Ok(row.snapshot().await)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let mut rows: Vec<Arc<AccountRow>> =
            self.rows.iter().map(|r| Arc::clone(r.value())).collect();
        rows.sort_by_key(|r| r.id);

        // Hold every row lock at once, taken in the same ascending order as
        // transfers, so the listing is one consistent point in time
        let mut balances = Vec::with_capacity(rows.len());
        for row in &rows {
            balances.push(row.balance.lock().await);
        }

        let accounts = rows
            .iter()
            .zip(&balances)
            .map(|(row, balance)| Account {
                id: row.id,
                balance: **balance,
                owner: row.owner.clone(),
            })
            .collect();
        Ok(accounts)
    }

    async fn open_account(
        &self,
        owner_name: &str,
        opening_balance: Decimal,
    ) -> Result<AccountId, LedgerError> {
        let opening_balance = money::check_scale(opening_balance, self.scale)?;

        let owner = Person {
            id: PersonId(self.next_person_id.fetch_add(1, Ordering::SeqCst)),
            name: owner_name.to_string(),
        };
        let id = AccountId(self.next_account_id.fetch_add(1, Ordering::SeqCst));

        self.rows.insert(
            id,
            Arc::new(AccountRow {
                id,
                owner,
                balance: Mutex::new(opening_balance),
            }),
        );

        debug!(account_id = %id, owner = owner_name, balance = %opening_balance, "Account opened");
        Ok(id)
    }

    async fn transfer(&self, order: &TransferOrder) -> Result<TransferReceipt, LedgerError> {
        let source = self.row(order.source())?;
        let target = self.row(order.target())?;

        // Ascending id order, same as the PostgreSQL backend
        let (mut source_balance, mut target_balance) = if source.id < target.id {
            let s = source.balance.lock().await;
            let t = target.balance.lock().await;
            (s, t)
        } else {
            let t = target.balance.lock().await;
            let s = source.balance.lock().await;
            (s, t)
        };

        let settlement = settle(order, *source_balance, *target_balance)?;

        let before_debit = *source_balance;
        *source_balance = settlement.source_balance;

        if let Err(e) = self.faults.check_after_debit(order) {
            *source_balance = before_debit;
            return Err(e);
        }

        *target_balance = settlement.target_balance;

        Ok(receipt(order, &settlement))
    }
}
