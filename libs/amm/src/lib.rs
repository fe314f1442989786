//! # AMM Library - Oracle-Anchored Pricing Engine
//!
//! ## Purpose
//!
//! Mathematical and collaborator layer for an oracle-priced swap pool and a
//! share-accounting staking vault. Quotes start from the oracle's bid/ask and
//! degrade with trade size instead of following a constant-product curve.
//! Vault exits are charged according to a bounded withdraw fee policy.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Oracle states via [`PriceOracle`], per-token [`PricingParams`]
//! - **Output Destinations**: `PoolLedger` quotes and swaps, `VaultLedger` withdrawals
//! - **Collaborators**: [`AssetTransfer`], [`AccessControl`], [`RewardManager`],
//!   [`ReferenceOracle`] are the seams the ledgers are injected with
//! - **Precision**: 18-decimal fixed point with 512-bit intermediates
//! - **Validation**: Infeasible or zero oracle prices surface as `PriceUnavailable`
//!
//! ## Architecture Role
//!
//! ```text
//! swap request -> OracleAdapter -> PmmMath -> PoolLedger settles
//! vault exit   -> FeePolicy     -> VaultLedger settles
//! ```
//!
//! ## Performance Profile
//!
//! - **Quote Path**: a handful of 256x256 -> 512-bit multiplications, no allocation
//! - **Oracle Reads**: one lock-free timestamp load, one `RwLock` read per query

pub mod fee_policy;
pub mod oracle;
pub mod pool_traits;
pub mod pricing;

pub use fee_policy::{compute_fee, FeePolicy, WithdrawPath};
pub use oracle::{MarketState, OracleAdapter, OracleState, PriceOracle, StaticOracle};
pub use pool_traits::{AccessControl, AssetTransfer, ReferenceOracle, RewardManager, Transfer};
pub use pricing::{PmmMath, PricingParams};
