//! PostgreSQL ledger backend
//!
//! Balances live in `accounts.balance NUMERIC(19, 2)`, owners in `people`.
//! A transfer is one transaction: lock both rows with `FOR UPDATE` in id
//! order, write both balances, commit. Any error before the commit rolls the
//! transaction back.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, error};

use super::error::LedgerError;
use super::fault::FaultInjector;
use super::{Ledger, receipt, single_owner_match};
use crate::account::{Account, AccountId, Person, PersonId};
use crate::db::Database;
use crate::money;
use crate::transfer::{TransferOrder, TransferReceipt, settle};

const SELECT_ACCOUNT: &str = r#"
    SELECT a.id, a.balance, p.id AS owner_id, p.name AS owner_name
    FROM accounts a
    JOIN people p ON p.id = a.owner
"#;

pub struct PgLedger {
    pool: PgPool,
    scale: u32,
    faults: FaultInjector,
}

impl PgLedger {
    /// Create a new PgLedger with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            scale: money::DEFAULT_SCALE,
            faults: FaultInjector::new(),
        }
    }

    pub fn from_database(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }

    /// Must match the scale of the `accounts.balance` column
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    fn row_to_account(row: &PgRow) -> Result<Account, sqlx::Error> {
        Ok(Account {
            id: AccountId(row.try_get("id")?),
            balance: row.try_get("balance")?,
            owner: Person {
                id: PersonId(row.try_get("owner_id")?),
                name: row.try_get("owner_name")?,
            },
        })
    }

    /// Lock, settle and write inside `tx`. The caller commits or rolls back.
    async fn apply(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        order: &TransferOrder,
    ) -> Result<TransferReceipt, LedgerError> {
        let ids: Vec<i32> = order.lock_order().iter().map(AccountId::get).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, balance FROM accounts
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await?;

        let mut source_balance = None;
        let mut target_balance = None;
        for row in &rows {
            let id = AccountId(row.try_get("id")?);
            let balance: Decimal = row.try_get("balance")?;
            if id == order.source() {
                source_balance = Some(balance);
            } else if id == order.target() {
                target_balance = Some(balance);
            }
        }

        let source_balance = source_balance.ok_or(LedgerError::AccountNotFound(order.source()))?;
        let target_balance = target_balance.ok_or(LedgerError::AccountNotFound(order.target()))?;

        let settlement = settle(order, source_balance, target_balance)?;

        sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
            .bind(settlement.source_balance)
            .bind(order.source().get())
            .execute(&mut **tx)
            .await?;

        self.faults.check_after_debit(order)?;

        sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
            .bind(settlement.target_balance)
            .bind(order.target().get())
            .execute(&mut **tx)
            .await?;

        Ok(receipt(order, &settlement))
    }
}

#[async_trait]
impl Ledger for PgLedger {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn get_balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        sqlx::query_scalar::<_, Decimal>("SELECT balance FROM accounts WHERE id = $1")
            .bind(account_id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn set_balance(
        &self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<(), LedgerError> {
        let balance = money::check_scale(balance, self.scale)?;

        let result = sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
            .bind(balance)
            .bind(account_id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::AccountNotFound(account_id));
        }

        debug!(account_id = %account_id, balance = %balance, "Balance overwritten");
        Ok(())
    }

    async fn find_account_id_by_owner_name(&self, name: &str) -> Result<AccountId, LedgerError> {
        let matches: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT a.id FROM accounts a
            JOIN people p ON p.id = a.owner
            WHERE p.name = $1
            ORDER BY a.id
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        single_owner_match(name, matches.into_iter().map(AccountId).collect())
    }

    async fn get_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        let row = sqlx::query(&format!("{} WHERE a.id = $1", SELECT_ACCOUNT))
            .bind(account_id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        Ok(Self::row_to_account(&row)?)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let rows = sqlx::query(&format!("{} ORDER BY a.id", SELECT_ACCOUNT))
            .fetch_all(&self.pool)
            .await?;

        let accounts = rows
            .iter()
            .map(Self::row_to_account)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    async fn open_account(
        &self,
        owner_name: &str,
        opening_balance: Decimal,
    ) -> Result<AccountId, LedgerError> {
        let opening_balance = money::check_scale(opening_balance, self.scale)?;

        let mut tx = self.pool.begin().await?;

        let person_id: i32 =
            sqlx::query_scalar("INSERT INTO people (name) VALUES ($1) RETURNING id")
                .bind(owner_name)
                .fetch_one(&mut *tx)
                .await?;

        let account_id: i32 = sqlx::query_scalar(
            "INSERT INTO accounts (balance, owner) VALUES ($1, $2) RETURNING id",
        )
        .bind(opening_balance)
        .bind(person_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(account_id, owner = owner_name, balance = %opening_balance, "Account opened");
        Ok(AccountId(account_id))
    }

    async fn transfer(&self, order: &TransferOrder) -> Result<TransferReceipt, LedgerError> {
        let mut tx = self.pool.begin().await?;

        match self.apply(&mut tx, order).await {
            Ok(receipt) => {
                tx.commit().await?;
                Ok(receipt)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    // The connection drops and the server discards the transaction
                    error!(error = %rollback_err, "Failed to roll back transfer");
                }
                Err(e)
            }
        }
    }
}
