//! Shared fixtures for the ledger integration tests
//!
//! The pool fixture mirrors a small production book: 100 BTC, 10M USDT and
//! 5M WOO on hand, BTC priced at 50,000 with a 1bp spread.

#![allow(dead_code)]

use amm::{AssetTransfer, StaticOracle};
use ledger::{
    share, AccessManager, ManualClock, PoolLedger, PoolSetup, RewardTracker, TokenLedger,
    VaultLedger, VaultSetup,
};
use ledger_config::pool::DEFAULT_REFERENCE_PRICE_BOUND;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use types::{address_from_index, Address, UFixed};

pub const OWNER: u64 = 1;
pub const STRATEGIST: u64 = 2;
pub const ALICE: u64 = 3;
pub const BOB: u64 = 4;
pub const CAROL: u64 = 5;
pub const TREASURY: u64 = 6;
pub const POOL: u64 = 10;
pub const VAULT: u64 = 11;
pub const ORACLE: u64 = 12;
pub const ACCESS: u64 = 13;
pub const REWARDS: u64 = 14;
pub const BTC_FEED: u64 = 15;
pub const USDT: u64 = 100;
pub const BTC: u64 = 101;
pub const WOO: u64 = 102;
pub const DUST: u64 = 103;

pub const START: u64 = 1_700_000_000;

pub fn addr(index: u64) -> Address {
    address_from_index(index)
}

pub fn units(amount: u64) -> UFixed {
    UFixed::from_units(amount)
}

pub fn fixed(value: &str) -> UFixed {
    UFixed::from_decimal_str(value).unwrap()
}

/// 1bp spread
pub fn btc_spread() -> UFixed {
    UFixed::from_ratio(1, 10_000).unwrap()
}

pub fn btc_coefficient() -> UFixed {
    fixed("0.000000002")
}

pub struct PoolFixture {
    pub tokens: Arc<Mutex<TokenLedger>>,
    pub oracle: Arc<StaticOracle>,
    pub access: Arc<AccessManager>,
    pub rewards: Arc<RewardTracker>,
    pub pool: PoolLedger,
}

impl PoolFixture {
    /// Funded pool with no base tokens registered
    pub fn empty() -> Self {
        let tokens = TokenLedger::new().into_shared();
        {
            let mut ledger = tokens.lock();
            ledger.mint(addr(BTC), addr(POOL), units(100)).unwrap();
            ledger.mint(addr(USDT), addr(POOL), units(10_000_000)).unwrap();
            ledger.mint(addr(WOO), addr(POOL), units(5_000_000)).unwrap();

            ledger.mint(addr(BTC), addr(ALICE), units(10)).unwrap();
            ledger.mint(addr(USDT), addr(ALICE), units(1_000_000)).unwrap();
            ledger.approve(addr(BTC), addr(ALICE), addr(POOL), UFixed::MAX);
            ledger.approve(addr(USDT), addr(ALICE), addr(POOL), UFixed::MAX);

            // Funded but never approves the pool
            ledger.mint(addr(BTC), addr(CAROL), units(10)).unwrap();
        }

        let oracle = Arc::new(StaticOracle::new(addr(ORACLE)));
        oracle.set_state(addr(BTC), units(50_000), btc_spread(), btc_coefficient());
        oracle.set_state(addr(WOO), fixed("0.5"), btc_spread(), btc_coefficient());

        let access = Arc::new(AccessManager::new(addr(ACCESS), addr(OWNER)));
        let pool = PoolLedger::new(PoolSetup {
            address: addr(POOL),
            owner: addr(OWNER),
            quote_token: addr(USDT),
            oracle: oracle.clone(),
            access: access.clone(),
            assets: share(&tokens),
        })
        .unwrap()
        .with_reference_oracle(oracle.clone(), DEFAULT_REFERENCE_PRICE_BOUND);

        Self {
            tokens,
            oracle,
            access,
            rewards: Arc::new(RewardTracker::new(addr(REWARDS))),
            pool,
        }
    }

    /// BTC and WOO registered with zero threshold, fee and R; rebates tracked
    pub fn new() -> Self {
        let mut fixture = Self::empty();
        for token in [BTC, WOO] {
            fixture
                .pool
                .add_base_token(
                    addr(OWNER),
                    addr(token),
                    UFixed::ZERO,
                    UFixed::ZERO,
                    UFixed::ZERO,
                    None,
                )
                .unwrap();
        }
        fixture
            .pool
            .set_reward_manager(addr(OWNER), fixture.rewards.clone())
            .unwrap();
        fixture
    }

    pub fn balance(&self, token: u64, holder: u64) -> UFixed {
        self.tokens.lock().balance_of(addr(token), addr(holder))
    }
}

pub struct VaultFixture {
    pub tokens: Arc<Mutex<TokenLedger>>,
    pub access: Arc<AccessManager>,
    pub clock: Arc<ManualClock>,
    pub vault: VaultLedger,
}

impl VaultFixture {
    /// Empty vault with default fee policy; Alice and Bob hold 1,000 WOO each
    pub fn new() -> Self {
        let tokens = TokenLedger::new().into_shared();
        {
            let mut ledger = tokens.lock();
            for holder in [ALICE, BOB] {
                ledger.mint(addr(WOO), addr(holder), units(1_000)).unwrap();
                ledger.approve(addr(WOO), addr(holder), addr(VAULT), UFixed::MAX);
            }
        }

        let access = Arc::new(AccessManager::new(addr(ACCESS), addr(OWNER)));
        let clock = Arc::new(ManualClock::new(START));
        let vault = VaultLedger::new(VaultSetup {
            address: addr(VAULT),
            owner: addr(OWNER),
            staked_token: addr(WOO),
            treasury: addr(TREASURY),
            access: access.clone(),
            assets: share(&tokens),
            clock: clock.clone(),
        })
        .unwrap();

        Self {
            tokens,
            access,
            clock,
            vault,
        }
    }

    pub fn balance(&self, holder: u64) -> UFixed {
        self.tokens.lock().balance_of(addr(WOO), addr(holder))
    }

    /// Transfer straight into the vault, bypassing share accounting
    pub fn donate(&self, amount: UFixed) {
        self.tokens.lock().mint(addr(WOO), addr(VAULT), amount).unwrap();
    }
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber, returning its warn-level output
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buffer.contents())
}
