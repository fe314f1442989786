//! Ledger demo binary - runs the pool and vault walkthroughs in memory
//!
//! Usage:
//!   ledger_demo
//!   ledger_demo --config config/ledger.toml --scenario vault
//!   RUST_LOG=ledger=debug ledger_demo --json-logs

use amm::{AssetTransfer, FeePolicy, StaticOracle};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ledger::{
    share, AccessManager, ManualClock, PoolLedger, PoolSetup, RewardTracker, TokenLedger,
    VaultLedger, VaultSetup,
};
use ledger_config::LedgerConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use types::{address_from_index, Address, LedgerEvent, Outcome, UFixed};

const OWNER: u64 = 1;
const USER: u64 = 2;
const TREASURY: u64 = 3;
const POOL: u64 = 10;
const VAULT: u64 = 11;
const ORACLE: u64 = 12;
const ACCESS: u64 = 13;
const REWARDS: u64 = 14;
const USDT: u64 = 100;
const BTC: u64 = 101;
const WOO: u64 = 102;

#[derive(Parser, Debug)]
#[command(name = "ledger_demo")]
#[command(about = "Oracle-priced pool and staking vault walkthrough")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Which walkthrough to run
    #[arg(short, long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Scenario {
    Pool,
    Vault,
    All,
}

/// One printed step of a walkthrough
#[derive(Serialize)]
struct Step<'a> {
    step: &'a str,
    value: String,
    events: &'a [LedgerEvent],
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = LedgerConfig::load_validated(args.config.as_deref())?;
    init_logging(&args, &config);

    info!("Starting ledger demo");

    if matches!(args.scenario, Scenario::Pool | Scenario::All) {
        run_pool(&config)?;
    }
    if matches!(args.scenario, Scenario::Vault | Scenario::All) {
        run_vault(&config)?;
    }
    Ok(())
}

fn init_logging(args: &Args, config: &LedgerConfig) {
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.global.log_level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json_logs || config.global.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn addr(index: u64) -> Address {
    address_from_index(index)
}

fn print_step<T: ToString>(step: &str, outcome: &Outcome<T>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(&Step {
        step,
        value: outcome.value.to_string(),
        events: &outcome.events,
    })
    .context("Failed to render step")?;
    println!("{}", rendered);
    Ok(())
}

fn run_pool(config: &LedgerConfig) -> Result<()> {
    let tokens = TokenLedger::new().into_shared();
    {
        let mut ledger = tokens.lock();
        ledger.mint(addr(BTC), addr(POOL), UFixed::from_units(100))?;
        ledger.mint(addr(USDT), addr(POOL), UFixed::from_units(10_000_000))?;
        ledger.mint(addr(BTC), addr(USER), UFixed::from_units(10))?;
        ledger.approve(addr(BTC), addr(USER), addr(POOL), UFixed::MAX);
    }

    let oracle = Arc::new(StaticOracle::new(addr(ORACLE)));
    oracle.set_state(
        addr(BTC),
        UFixed::from_units(50_000),
        UFixed::from_decimal_str("0.0001")?,
        UFixed::from_decimal_str("0.000000002")?,
    );

    let mut pool = PoolLedger::new(PoolSetup {
        address: addr(POOL),
        owner: addr(OWNER),
        quote_token: addr(USDT),
        oracle: oracle.clone(),
        access: Arc::new(AccessManager::new(addr(ACCESS), addr(OWNER))),
        assets: share(&tokens),
    })?
    .with_reference_oracle(oracle, config.reference_price_bound()?);
    pool.set_pairs_info(addr(OWNER), config.pool.pairs_info.clone())?;
    let rewards = Arc::new(RewardTracker::new(addr(REWARDS)));
    pool.set_reward_manager(addr(OWNER), rewards.clone())?;

    let params = config
        .tokens
        .get("BTC")
        .map(|token| token.parameters())
        .transpose()?
        .unwrap_or_default();
    let added = pool.add_base_token(
        addr(OWNER),
        addr(BTC),
        params.threshold,
        params.lp_fee_rate,
        params.coefficient_r,
        None,
    )?;
    print_step("addBaseToken", &Outcome::new("BTC", added.events))?;

    let quote = pool.query_sell_base(addr(BTC), UFixed::ONE)?;
    print_step("querySellBase", &Outcome::silent(quote))?;

    let swap = pool.sell_base(
        addr(BTC),
        UFixed::ONE,
        UFixed::from_units(49_950),
        addr(USER),
        addr(USER),
        Some(addr(USER)),
    )?;
    print_step("sellBase", &swap)?;

    info!(
        quote_pool_size = %pool.pool_size(addr(USDT)),
        base_pool_size = %pool.pool_size(addr(BTC)),
        rebate_volume = %rewards.volume_of(addr(USER)),
        "pool walkthrough complete"
    );
    Ok(())
}

fn run_vault(config: &LedgerConfig) -> Result<()> {
    let tokens = TokenLedger::new().into_shared();
    {
        let mut ledger = tokens.lock();
        ledger.mint(addr(WOO), addr(USER), UFixed::from_units(1_000))?;
        ledger.approve(addr(WOO), addr(USER), addr(VAULT), UFixed::MAX);
    }

    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let fee_policy = FeePolicy::new(config.vault.withdraw_fee_bps, config.withdraw_fee_period())?;
    let mut vault = VaultLedger::new(VaultSetup {
        address: addr(VAULT),
        owner: addr(OWNER),
        staked_token: addr(WOO),
        treasury: addr(TREASURY),
        access: Arc::new(AccessManager::new(addr(ACCESS), addr(OWNER))),
        assets: share(&tokens),
        clock: clock.clone(),
    })?
    .with_fee_policy(fee_policy);

    let deposit = vault.deposit(addr(USER), UFixed::from_units(100))?;
    print_step("deposit", &deposit)?;

    // Direct transfer into the vault doubles the share price
    tokens.lock().mint(addr(WOO), addr(VAULT), UFixed::from_units(100))?;
    let price = vault.get_price_per_full_share()?;
    print_step("getPricePerFullShare", &Outcome::silent(price))?;

    let reserve = vault.reserve_withdraw(addr(USER), UFixed::from_units(50))?;
    print_step("reserveWithdraw", &reserve)?;

    clock.advance(Duration::from_secs(60 * 60));
    let withdraw = vault.withdraw(addr(USER))?;
    print_step("withdraw", &withdraw)?;

    let instant = vault.instant_withdraw(addr(USER), UFixed::from_units(50))?;
    print_step("instantWithdraw", &instant)?;

    info!(
        treasury_balance = %tokens.lock().balance_of(addr(WOO), addr(TREASURY)),
        total_shares = %vault.total_shares(),
        "vault walkthrough complete"
    );
    Ok(())
}
