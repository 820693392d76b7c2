//! account-ledger - operator CLI
//!
//! ```text
//! account-ledger [--env <name>] <command> [args]
//!
//!   migrate                           apply embedded schema migrations
//!   seed                              open the sample accounts
//!   accounts                          list accounts
//!   balance  <account_id>             show one balance
//!   owner    <name>                   resolve an owner name to its account
//!   transfer <source> <target> <amt>  move <amt> from source to target
//! ```
//!
//! Configuration comes from `config/<env>.yaml` (default `dev`). Results are
//! printed to stdout as JSON; logs go to stderr and the log file.

use std::sync::Arc;

use anyhow::{Context, bail};
use serde_json::{Value, json};

use account_ledger::config::{AppConfig, LedgerBackend};
use account_ledger::db::Database;
use account_ledger::ledger::{InMemoryLedger, Ledger, PgLedger};
use account_ledger::seed::seed_sample;
use account_ledger::transfer::{TransferPolicy, TransferService};
use account_ledger::{AccountId, money};

// ============================================================
// ARGUMENTS
// ============================================================

const USAGE: &str = "usage: account-ledger [--env <name>] \
    <migrate|seed|accounts|balance <id>|owner <name>|transfer <source> <target> <amount>>";

fn get_env(args: &[String]) -> String {
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn wants_version(args: &[String]) -> bool {
    args.iter().any(|a| a == "--version" || a == "-V")
}

/// Command and its operands, with `--env <name>` and other flags removed
fn positional_args(args: &[String]) -> Vec<String> {
    let mut positional = Vec::new();
    let mut args = args.iter().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--env" || arg == "-e" {
            args.next();
        } else if !arg.starts_with("--") && arg != "-V" {
            positional.push(arg.clone());
        }
    }
    positional
}

fn parse_account_id(raw: &str) -> anyhow::Result<AccountId> {
    raw.parse()
        .with_context(|| format!("Invalid account id: {}", raw))
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let raw_args: Vec<String> = std::env::args().collect();
    if wants_version(&raw_args) {
        println!(
            "account-ledger {} ({})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_HASH")
        );
        return Ok(());
    }

    let args = positional_args(&raw_args);
    let Some((command, operands)) = args.split_first() else {
        eprintln!("{}", USAGE);
        return Ok(());
    };

    let env = get_env(&raw_args);
    let app_config = AppConfig::load(&env)?;
    let _log_guard = account_ledger::logging::init_logging(&app_config);

    tracing::info!(
        env = %env,
        backend = ?app_config.ledger.backend,
        command = %command,
        "Starting account-ledger"
    );

    let policy = TransferPolicy::from(&app_config.ledger);

    let ledger: Arc<dyn Ledger> = match app_config.ledger.backend {
        LedgerBackend::Postgres => {
            let db = Database::connect(&app_config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.health_check().await.context("Database health check failed")?;

            if command == "migrate" {
                let executed = db.migrate().await.context("Migration failed")?;
                let output = json!({ "migrations_executed": executed });
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            Arc::new(PgLedger::from_database(&db).with_scale(policy.scale))
        }
        LedgerBackend::Memory => {
            let ledger = InMemoryLedger::with_scale(policy.scale);
            if command != "seed" {
                // Nothing persists between runs, so start from the sample data
                seed_sample(&ledger).await?;
            }
            tracing::warn!("In-memory ledger: state is discarded on exit");
            Arc::new(ledger)
        }
    };

    let service = TransferService::new(ledger, policy);
    let output = run(command, operands, &service).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Execute one command, returning the JSON document to print
async fn run(
    command: &str,
    operands: &[String],
    service: &TransferService,
) -> anyhow::Result<Value> {
    let ledger = service.ledger();

    let output = match (command, operands) {
        ("migrate", _) => bail!("migrate requires the postgres backend"),
        ("seed", []) => {
            let sample = seed_sample(ledger.as_ref()).await?;
            json!({ "john": sample.john, "mary": sample.mary })
        }
        ("accounts", []) => serde_json::to_value(ledger.list_accounts().await?)?,
        ("balance", [id]) => {
            let account_id = parse_account_id(id)?;
            let balance = ledger.get_balance(account_id).await?;
            json!({
                "account_id": account_id,
                "balance": money::format_amount(balance, service.policy().scale),
            })
        }
        ("owner", name) if !name.is_empty() => {
            let name = name.join(" ");
            let account_id = ledger.find_account_id_by_owner_name(&name).await?;
            json!({ "owner": name, "account_id": account_id })
        }
        ("transfer", [source, target, amount]) => {
            let source = parse_account_id(source)?;
            let target = parse_account_id(target)?;
            let amount = money::parse_amount(amount, service.policy().scale)
                .with_context(|| format!("Invalid amount: {}", amount))?;

            serde_json::to_value(service.transfer(source, target, amount).await?)?
        }
        _ => bail!("{}", USAGE),
    };
    Ok(output)
}
