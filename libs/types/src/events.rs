//! Ledger notifications
//!
//! Operations return their notifications alongside the result instead of
//! publishing them through a global bus. Payload field order follows the
//! published event signatures.

use crate::common::fixed_point::UFixed;
use crate::common::identifiers::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Notification emitted by a successful ledger operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    // Pool
    WooSwap {
        token_in: Address,
        token_out: Address,
        amount_in: UFixed,
        amount_out: UFixed,
        from: Address,
        to: Address,
    },
    ParametersUpdated {
        token: Address,
        threshold: UFixed,
        lp_fee_rate: UFixed,
        coefficient_r: UFixed,
    },
    ChainlinkRefOracleUpdated {
        token: Address,
        ref_oracle: Option<Address>,
    },
    StrategistUpdated {
        strategist: Address,
        flag: bool,
    },
    /// Pool `Withdraw(token, to, amount)`
    PoolWithdraw {
        token: Address,
        to: Address,
        amount: UFixed,
    },
    WooracleUpdated {
        oracle: Address,
    },
    RewardManagerUpdated {
        manager: Address,
    },

    // Vault
    Deposit {
        user: Address,
        amount: UFixed,
        shares: UFixed,
    },
    ReserveWithdraw {
        user: Address,
        amount: UFixed,
        shares: UFixed,
    },
    /// Vault `Withdraw(user, amount, fee)`
    VaultWithdraw {
        user: Address,
        amount: UFixed,
        fee: UFixed,
    },
    InstantWithdraw {
        user: Address,
        amount: UFixed,
        fee: UFixed,
    },
    RewardAdded {
        caller: Address,
        balance_before: UFixed,
        price_before: UFixed,
        balance_after: UFixed,
        price_after: UFixed,
    },
    SharesTransferred {
        from: Address,
        to: Address,
        shares: UFixed,
    },
    WithdrawFeeUpdated {
        withdraw_fee_bps: u32,
    },
    WithdrawFeePeriodUpdated {
        period: Duration,
    },
    TreasuryUpdated {
        treasury: Address,
    },
    AccessManagerUpdated {
        manager: Address,
    },
    Paused {
        account: Address,
    },
    Unpaused {
        account: Address,
    },

    // Access manager
    ZeroFeeAccountUpdated {
        account: Address,
        flag: bool,
    },
}

/// Result of a state-mutating operation plus its ordered notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub events: Vec<LedgerEvent>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, events: Vec<LedgerEvent>) -> Self {
        Self { value, events }
    }

    /// Result with no notifications (e.g. a zero-amount deposit)
    pub fn silent(value: T) -> Self {
        Self {
            value,
            events: Vec::new(),
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
