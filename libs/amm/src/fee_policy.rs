//! Withdraw fee and time-lock rules for the staking vault
//!
//! Rules, in priority order:
//! 1. zero-fee accounts pay nothing
//! 2. a delayed withdrawal whose reserve is at least `period` old pays nothing
//! 3. otherwise `amount * fee_bps / 10_000`, truncated
//!
//! Instant withdrawals never consult the period.

use ledger_config::vault::{MAX_WITHDRAW_FEE_BPS, MAX_WITHDRAW_FEE_PERIOD_SECS};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use types::{LedgerError, MathError, Parameter, UFixed, U256};

/// How the withdrawn amount left the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawPath {
    /// Completion of a reserve created `elapsed` ago
    Delayed { elapsed: Duration },
    /// Direct share burn without a reserve stage
    Instant,
}

/// Fee rate and fee-free window, bounded by the protocol maxima
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    fee_bps: u32,
    period: Duration,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            fee_bps: ledger_config::vault::DEFAULT_WITHDRAW_FEE_BPS,
            period: Duration::from_secs(ledger_config::vault::DEFAULT_WITHDRAW_FEE_PERIOD_SECS),
        }
    }
}

impl FeePolicy {
    pub fn new(fee_bps: u32, period: Duration) -> Result<Self, LedgerError> {
        let mut policy = Self::default();
        policy.set_fee_bps(fee_bps)?;
        policy.set_period(period)?;
        Ok(policy)
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn set_fee_bps(&mut self, fee_bps: u32) -> Result<(), LedgerError> {
        if fee_bps > MAX_WITHDRAW_FEE_BPS {
            return Err(LedgerError::OutOfRange {
                parameter: Parameter::WithdrawFee,
                value: UFixed::from_raw(U256::from(fee_bps)),
                max: UFixed::from_raw(U256::from(MAX_WITHDRAW_FEE_BPS)),
            });
        }
        self.fee_bps = fee_bps;
        Ok(())
    }

    pub fn set_period(&mut self, period: Duration) -> Result<(), LedgerError> {
        if period > Duration::from_secs(MAX_WITHDRAW_FEE_PERIOD_SECS) {
            return Err(LedgerError::OutOfRange {
                parameter: Parameter::WithdrawFeePeriod,
                value: UFixed::from_raw(U256::from(period.as_secs())),
                max: UFixed::from_raw(U256::from(MAX_WITHDRAW_FEE_PERIOD_SECS)),
            });
        }
        self.period = period;
        Ok(())
    }

    /// Fee owed on `amount` leaving through `path`
    pub fn fee(
        &self,
        amount: UFixed,
        path: WithdrawPath,
        zero_fee_account: bool,
    ) -> Result<UFixed, MathError> {
        let elapsed = match path {
            WithdrawPath::Delayed { elapsed } => Some(elapsed),
            WithdrawPath::Instant => None,
        };
        compute_fee(amount, self.fee_bps, elapsed, self.period, zero_fee_account)
    }
}

/// Stateless form of [`FeePolicy::fee`]; `elapsed` is `None` on the instant path
pub fn compute_fee(
    amount: UFixed,
    fee_bps: u32,
    elapsed: Option<Duration>,
    period: Duration,
    zero_fee_account: bool,
) -> Result<UFixed, MathError> {
    if zero_fee_account {
        return Ok(UFixed::ZERO);
    }
    if matches!(elapsed, Some(elapsed) if elapsed >= period) {
        return Ok(UFixed::ZERO);
    }
    amount.mul_bps(fee_bps)
}
