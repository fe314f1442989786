//! # Pool and Vault Ledgers
//!
//! ## Purpose
//!
//! Authoritative in-process state machines for an oracle-priced swap pool
//! and a share-accounting staking vault. Each public operation is one
//! all-or-nothing transaction. It validates, settles its token movements as
//! a single batch, then commits ledger state and returns its notifications.
//!
//! ## Integration Points
//!
//! - **Oracle**: [`amm::PriceOracle`] behind [`amm::OracleAdapter`]
//! - **Custody**: any [`amm::AssetTransfer`], shared as [`SharedAssets`];
//!   [`TokenLedger`] is the in-memory implementation
//! - **Roles**: [`amm::AccessControl`]; [`AccessManager`] is the in-memory implementation
//! - **Rebates**: [`amm::RewardManager`]; [`RewardTracker`] records volume
//! - **Time**: [`Clock`] drives the vault's fee window
//!
//! ## Transaction Boundary
//!
//! The asset ledger sits behind a `parking_lot::Mutex` shared by both
//! ledgers. Operations hold the lock while they read balances and settle,
//! and mutate their own state only once settlement has succeeded.

pub mod access;
pub mod assets;
pub mod clock;
pub mod pool;
pub mod rewards;
pub mod vault;

pub use access::AccessManager;
pub use assets::{share, TokenLedger};
pub use clock::{Clock, ManualClock, SystemClock};
pub use pool::{PoolLedger, PoolSetup, TokenInfo};
pub use rewards::RewardTracker;
pub use vault::{UserInfo, VaultLedger, VaultSetup};

use amm::AssetTransfer;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};
use types::{LedgerError, LedgerEvent};

/// Asset ledger shared by the pool and the vault
pub type SharedAssets = Arc<Mutex<dyn AssetTransfer>>;

/// Append a notification, tracing it on the way
pub(crate) fn record(events: &mut Vec<LedgerEvent>, event: LedgerEvent) {
    debug!(?event, "ledger event");
    events.push(event);
}

pub(crate) fn log_rejection(operation: &'static str, error: &LedgerError) {
    warn!(operation, kind = error.kind(), %error, "operation rejected");
}
