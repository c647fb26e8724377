//! Airdrop orchestrator CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ config ──▶ ClientSlot ──▶ NetworkClient ──▶ JSON-RPC node
//!                                                  ▲
//!   key file ──▶ accounts ──▶ workflows ───────────┘
//!                   │            │
//!                   │            ├─ createAccount   (parallel key generation)
//!                   │            ├─ sendToSub       (treasury → sub-accounts)
//!                   │            ├─ subToAirDrop    (sub-accounts → airdrop)
//!                   │            ├─ withdrawToken   (sub-account → treasury)
//!                   │            └─ tokenBalance    (read-only)
//!                   ▼
//!            JSON report on stdout, logs on stderr
//! ```
//!
//! Exit codes: 0 when every item succeeded, 1 when the run could not start
//! (config, key file, connection), 2 when some items failed.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use alloy::primitives::{Address, U256};
use clap::{Parser, ValueEnum};
use rand::rngs::OsRng;

use airdrop::accounts::{read_key_file, render_key_file, write_key_file};
use airdrop::blockchain::{units, AccountIdentity, ClientSlot, ContractBinding, TOKEN_ABI};
use airdrop::config::loader::apply_env_overrides;
use airdrop::config::{load_config, AirdropConfig};
use airdrop::observability::logging::init_logging;
use airdrop::resilience::RetryPolicy;
use airdrop::workflows::withdraw::query_token_balance;
use airdrop::workflows::{create_accounts, BatchReport, Workflows};

#[derive(Parser)]
#[command(name = "airdrop")]
#[command(about = "Fund sub-accounts, trigger airdrop claims and withdraw tokens", long_about = None)]
struct Cli {
    /// Workflow to run
    #[arg(short, long, value_enum, default_value_t = Mode::SendToSub)]
    mode: Mode,

    /// Config file (JSON, or TOML with a .toml extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Amount per sub-account in milli-ether, overrides airdrop.default_amount
    #[arg(long)]
    amount: Option<u64>,

    /// Number of accounts for createAccount, overrides airdrop.create_count
    #[arg(long)]
    count: Option<usize>,

    /// Key file written by createAccount instead of printing to stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Generate accounts
    #[value(name = "createAccount")]
    CreateAccount,
    /// Send ether from the treasury to every sub-account
    #[value(name = "sendToSub")]
    SendToSub,
    /// Reserved, not implemented
    #[value(name = "sendSmartContract")]
    SendSmartContract,
    /// Send a zero-value claim from every sub-account to the airdrop contract
    #[value(name = "subToAirDrop")]
    SubToAirDrop,
    /// Transfer tokens from sub-accounts back to the treasury
    #[value(name = "withdrawToken")]
    WithdrawToken,
    /// Print token balances of the treasury and sub-accounts
    #[value(name = "tokenBalance")]
    TokenBalance,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path),
        None => {
            let mut config = AirdropConfig::default();
            apply_env_overrides(&mut config, |name| std::env::var(name).ok());
            Ok(config)
        }
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            tracing::error!(error = %e, "Configuration rejected");
            return ExitCode::from(1);
        }
    };
    init_logging(&config.observability.log_level);

    tracing::info!(mode = ?cli.mode, rpc_url = %config.network.rpc_url, "airdrop starting");

    match run(&cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: &Cli, config: &AirdropConfig) -> Result<ExitCode, Box<dyn Error>> {
    match cli.mode {
        Mode::CreateAccount => return create(cli, config).await,
        Mode::SendSmartContract => {
            tracing::error!("sendSmartContract mode is not implemented");
            return Ok(ExitCode::from(1));
        }
        _ => {}
    }

    let slot = ClientSlot::new();
    let client = slot.get_or_init(&config.network.settings()).await?;
    let workflows = Workflows::new(client.clone())
        .with_retry_policy(RetryPolicy::from(&config.retries))
        .with_send_interval(config.airdrop.send_interval());

    let report = match cli.mode {
        Mode::SendToSub => {
            let treasury = require_key(&config.accounts.treasury_private_key, "accounts.treasury_private_key")?;
            let recipients: Vec<Address> = sub_accounts(config)?.iter().map(|a| a.address()).collect();
            let amount = units::milli_ether(cli.amount.unwrap_or(config.airdrop.default_amount));
            workflows.fund_sub_accounts(&treasury, &recipients, amount).await
        }
        Mode::SubToAirDrop => {
            let airdrop = require_address(&config.airdrop.contract_address, "airdrop.contract_address")?;
            workflows.trigger_airdrop_claims(&sub_accounts(config)?, airdrop).await
        }
        Mode::WithdrawToken => {
            let treasury = require_key(&config.accounts.treasury_private_key, "accounts.treasury_private_key")?;
            let token = ContractBinding::bind(
                client,
                require_address(config.airdrop.token_contract(), "airdrop.token_address")?,
                TOKEN_ABI,
            )?;
            let subs = withdrawal_sources(config)?;
            let amount = U256::from(config.airdrop.withdraw_amount);
            workflows.withdraw_tokens(&token, treasury.address(), &subs, amount).await
        }
        Mode::TokenBalance => {
            let token = ContractBinding::bind(
                client,
                require_address(config.airdrop.token_contract(), "airdrop.token_address")?,
                TOKEN_ABI,
            )?;
            return balances(&token, config).await;
        }
        Mode::CreateAccount | Mode::SendSmartContract => unreachable!("handled before connecting"),
    };

    finish(&report)
}

async fn create(cli: &Cli, config: &AirdropConfig) -> Result<ExitCode, Box<dyn Error>> {
    let count = cli.count.unwrap_or(config.airdrop.create_count);
    let results = create_accounts(count, &mut OsRng).await;

    let mut accounts = Vec::with_capacity(results.len());
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(account) => accounts.push(account),
            Err(e) => tracing::error!(index, error = %e, "Account generation failed"),
        }
    }

    match &cli.out {
        Some(path) => {
            write_key_file(path, &accounts)?;
            tracing::info!(path = %path.display(), accounts = accounts.len(), "Key file written");
        }
        None => print!("{}", render_key_file(&accounts)),
    }

    Ok(if accounts.len() == count {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

async fn balances(token: &ContractBinding, config: &AirdropConfig) -> Result<ExitCode, Box<dyn Error>> {
    let mut owners = Vec::new();
    if !config.accounts.treasury_private_key.is_empty() {
        owners.push(require_key(&config.accounts.treasury_private_key, "accounts.treasury_private_key")?.address());
    }
    owners.extend(withdrawal_sources(config)?.iter().map(|a| a.address()));

    let mut failed = false;
    let mut rows = Vec::with_capacity(owners.len());
    for owner in owners {
        match query_token_balance(token, owner).await {
            Ok(balance) => rows.push(serde_json::json!({ "address": owner, "balance": balance.to_string() })),
            Err(e) => {
                failed = true;
                tracing::error!(address = %owner, error = %e, "Balance query failed");
                rows.push(serde_json::json!({ "address": owner, "error": e.to_string() }));
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(if failed { ExitCode::from(2) } else { ExitCode::SUCCESS })
}

fn finish(report: &BatchReport) -> Result<ExitCode, Box<dyn Error>> {
    println!("{}", report.to_json_pretty()?);
    tracing::info!(
        workflow = report.workflow(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Workflow finished"
    );
    Ok(if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Sub-accounts from the key file.
fn sub_accounts(config: &AirdropConfig) -> Result<Vec<AccountIdentity>, Box<dyn Error>> {
    if config.accounts.addr_path.is_empty() {
        return Err("accounts.addr_path is not set".into());
    }
    let entries = read_key_file(Path::new(&config.accounts.addr_path))?;
    Ok(entries.into_iter().map(|entry| entry.identity).collect())
}

/// The configured sub-account, or every key file account when none is set.
fn withdrawal_sources(config: &AirdropConfig) -> Result<Vec<AccountIdentity>, Box<dyn Error>> {
    if config.accounts.sub_private_key.is_empty() {
        sub_accounts(config)
    } else {
        Ok(vec![require_key(&config.accounts.sub_private_key, "accounts.sub_private_key")?])
    }
}

fn require_key(value: &str, field: &str) -> Result<AccountIdentity, Box<dyn Error>> {
    if value.is_empty() {
        return Err(format!("{} is not set", field).into());
    }
    AccountIdentity::derive(value).map_err(|e| format!("{}: {}", field, e).into())
}

fn require_address(value: &str, field: &str) -> Result<Address, Box<dyn Error>> {
    if value.is_empty() {
        return Err(format!("{} is not set", field).into());
    }
    value
        .parse()
        .map_err(|e| format!("{}: invalid address '{}': {}", field, value, e).into())
}
