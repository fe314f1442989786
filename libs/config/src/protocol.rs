//! Protocol constants
//!
//! Bounds and defaults enforced by the pool and vault ledgers.

use types::{UFixed, U256};

/// Denominator of basis-point fee rates
pub const FEE_DENOMINATOR_BPS: u32 = types::BPS_DENOMINATOR;

/// Pool parameter bounds
pub mod pool {
    use super::*;

    /// Largest accepted `threshold` (2^112 - 1)
    pub const MAX_THRESHOLD: UFixed =
        UFixed::from_raw(U256([u64::MAX, (1u64 << 48) - 1, 0, 0]));

    /// Largest accepted `lpFeeRate` (100%)
    pub const MAX_LP_FEE_RATE: UFixed = UFixed::ONE;

    /// Largest accepted `coefficientR` (100%)
    pub const MAX_COEFFICIENT_R: UFixed = UFixed::ONE;

    /// Tolerated deviation of the oracle price from its reference feed (1%)
    pub const DEFAULT_REFERENCE_PRICE_BOUND: UFixed =
        UFixed::from_raw(U256([10_000_000_000_000_000, 0, 0, 0]));
}

/// Vault withdraw fee bounds
pub mod vault {
    /// 5%
    pub const MAX_WITHDRAW_FEE_BPS: u32 = 500;

    /// 7 days
    pub const MAX_WITHDRAW_FEE_PERIOD_SECS: u64 = 7 * 24 * 60 * 60;

    pub const DEFAULT_WITHDRAW_FEE_BPS: u32 = 500;

    pub const DEFAULT_WITHDRAW_FEE_PERIOD_SECS: u64 = 7 * 24 * 60 * 60;
}
