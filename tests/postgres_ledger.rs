//! Integration tests for the PostgreSQL ledger.
//!
//! Each test gets its own schema from `PgFixture` (migrated and seeded with
//! John Smith 1000.00 / Mary Jane 2000.00) and drops it on teardown.
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test postgres_ledger -- --ignored

use account_ledger::db::Database;
use account_ledger::seed::{JOHN_SMITH, MARY_JANE};
use account_ledger::testing::{PgFixture, test_database_url};
use account_ledger::{AccountId, Ledger, LedgerError, OverdraftPolicy, TransferPolicy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn setup() -> PgFixture {
    PgFixture::setup(&test_database_url())
        .await
        .expect("Failed to set up PostgreSQL fixture")
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_seeded_owner_lookup() {
    let fx = setup().await;

    let john = fx
        .ledger
        .find_account_id_by_owner_name(JOHN_SMITH)
        .await
        .unwrap();
    assert_eq!(john, fx.accounts.john);

    let err = fx
        .ledger
        .find_account_id_by_owner_name("Nobody")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    fx.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_duplicate_owner_name_is_ambiguous() {
    let fx = setup().await;
    fx.ledger.open_account(MARY_JANE, dec!(1.00)).await.unwrap();

    let err = fx
        .ledger
        .find_account_id_by_owner_name(MARY_JANE)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::AmbiguousOwner {
            name: MARY_JANE.to_string(),
            matches: 2
        }
    );

    fx.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_transfer_commits_both_balances() {
    let fx = setup().await;
    let (john, mary) = (fx.accounts.john, fx.accounts.mary);

    let receipt = fx.service.transfer(mary, john, dec!(500.00)).await.unwrap();

    assert_eq!(receipt.source_balance, dec!(1500.00));
    assert_eq!(receipt.target_balance, dec!(1500.00));
    assert_eq!(fx.ledger.get_balance(john).await.unwrap(), dec!(1500.00));
    assert_eq!(fx.ledger.get_balance(mary).await.unwrap(), dec!(1500.00));

    fx.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_unknown_account_rolls_back() {
    let fx = setup().await;
    let john = fx.accounts.john;

    let err = fx
        .service
        .transfer(AccountId(424_242), john, dec!(100.00))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(AccountId(424_242)));
    assert_eq!(fx.ledger.get_balance(john).await.unwrap(), dec!(1000.00));

    fx.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_get_and_list_accounts() {
    let fx = setup().await;

    let john = fx.ledger.get_account(fx.accounts.john).await.unwrap();
    assert_eq!(john.owner_name(), JOHN_SMITH);
    assert_eq!(john.balance, dec!(1000.00));

    let accounts = fx.ledger.list_accounts().await.unwrap();
    let owners: Vec<&str> = accounts.iter().map(|a| a.owner_name()).collect();
    assert_eq!(owners, vec![JOHN_SMITH, MARY_JANE]);

    assert_eq!(
        fx.ledger.get_account(AccountId(-1)).await,
        Err(LedgerError::AccountNotFound(AccountId(-1)))
    );

    fx.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_set_balance() {
    let fx = setup().await;
    let mary = fx.accounts.mary;

    fx.ledger.set_balance(mary, dec!(-12.50)).await.unwrap();
    assert_eq!(fx.ledger.get_balance(mary).await.unwrap(), dec!(-12.50));

    assert_eq!(
        fx.ledger.set_balance(AccountId(424_242), dec!(1)).await,
        Err(LedgerError::AccountNotFound(AccountId(424_242)))
    );

    fx.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_overdraft_forbidden_rolls_back() {
    let fx = PgFixture::with_policy(
        &test_database_url(),
        TransferPolicy {
            scale: 2,
            overdraft: OverdraftPolicy::Forbid,
        },
    )
    .await
    .unwrap();
    let (john, mary) = (fx.accounts.john, fx.accounts.mary);

    let err = fx
        .service
        .transfer(john, mary, dec!(1000.01))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_BALANCE");
    assert_eq!(fx.ledger.get_balance(john).await.unwrap(), dec!(1000.00));
    assert_eq!(fx.ledger.get_balance(mary).await.unwrap(), dec!(2000.00));

    fx.teardown().await.unwrap();
}

#[cfg(feature = "fault-injection")]
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_fault_after_debit_rolls_back() {
    let fx = setup().await;
    let (john, mary) = (fx.accounts.john, fx.accounts.mary);

    fx.ledger.faults().fail_after_debit();
    let err = fx
        .service
        .transfer(mary, john, dec!(500.00))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Aborted(_)));
    assert_eq!(fx.ledger.get_balance(john).await.unwrap(), dec!(1000.00));
    assert_eq!(fx.ledger.get_balance(mary).await.unwrap(), dec!(2000.00));

    fx.teardown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires PostgreSQL database"]
async fn test_concurrent_opposing_transfers_serialize() {
    let fx = setup().await;
    let (john, mary) = (fx.accounts.john, fx.accounts.mary);

    // Opposing directions would deadlock without ordered row locks
    let mut handles = Vec::new();
    for i in 0..40 {
        let service = fx.service.clone();
        let (source, target) = if i % 2 == 0 { (mary, john) } else { (john, mary) };
        handles.push(tokio::spawn(async move {
            service.transfer(source, target, dec!(10.00)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let john_after = fx.ledger.get_balance(john).await.unwrap();
    let mary_after = fx.ledger.get_balance(mary).await.unwrap();
    assert_eq!(john_after, dec!(1000.00));
    assert_eq!(mary_after, dec!(2000.00));

    fx.teardown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires PostgreSQL database"]
async fn test_concurrent_same_direction_transfers_lose_no_updates() {
    let fx = setup().await;
    let (john, mary) = (fx.accounts.john, fx.accounts.mary);

    let mut handles = Vec::new();
    for _ in 0..25 {
        let service = fx.service.clone();
        handles.push(tokio::spawn(async move {
            service.transfer(mary, john, dec!(20.00)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(fx.ledger.get_balance(john).await.unwrap(), dec!(1500.00));
    assert_eq!(fx.ledger.get_balance(mary).await.unwrap(), dec!(1500.00));

    fx.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_excess_precision_never_reaches_database() {
    let fx = setup().await;
    let (john, mary) = (fx.accounts.john, fx.accounts.mary);

    // NUMERIC(19, 2) would silently round this to 0.01
    let err = fx
        .service
        .transfer(mary, john, Decimal::new(5, 3))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_AMOUNT");
    assert_eq!(fx.ledger.get_balance(john).await.unwrap(), dec!(1000.00));

    fx.teardown().await.unwrap();
}

async fn schema_exists(schema: &str) -> bool {
    let pool = sqlx::PgPool::connect(&test_database_url()).await.unwrap();
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1)",
    )
    .bind(schema)
    .fetch_one(&pool)
    .await
    .unwrap();
    pool.close().await;
    exists
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_migrate_again_runs_nothing() {
    let fx = setup().await;

    let db = Database::from_pool(fx.ledger.pool().clone());
    assert_eq!(db.migrate().await.unwrap(), 0);

    fx.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_teardown_drops_schema() {
    let fx = setup().await;
    let schema = fx.schema().to_string();
    assert!(schema_exists(&schema).await);

    fx.teardown().await.unwrap();
    assert!(!schema_exists(&schema).await);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_dropped_fixture_drops_schema() {
    let fx = setup().await;
    let schema = fx.schema().to_string();

    drop(fx);
    assert!(!schema_exists(&schema).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "requires PostgreSQL database"]
async fn test_panicking_test_still_drops_schema() {
    let (tx, rx) = tokio::sync::oneshot::channel();

    let failed = tokio::spawn(async move {
        let fx = setup().await;
        tx.send(fx.schema().to_string()).unwrap();
        assert_eq!(fx.ledger.get_balance(fx.accounts.john).await.unwrap(), dec!(0));
    })
    .await;
    assert!(failed.unwrap_err().is_panic());

    let schema = rx.await.unwrap();
    assert!(!schema_exists(&schema).await);
}
