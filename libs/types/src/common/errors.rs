//! Error types for fixed-point arithmetic and ledger operations
//!
//! Every failure is a distinguishable variant so callers can branch on the
//! kind of rejection. A failed operation never leaves partial state behind.

use crate::common::fixed_point::UFixed;
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during fixed-point arithmetic operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Result exceeds the representable range
    #[error("Overflow: result exceeds maximum representable value")]
    Overflow,

    /// Subtraction would go below zero
    #[error("Underflow: result is below zero")]
    Underflow,

    /// Division by zero in fixed-point arithmetic
    #[error("Division by zero in fixed-point arithmetic")]
    DivisionByZero,

    /// Value exceeds its documented bound
    #[error("Value {value} exceeds maximum {max}")]
    OutOfRange { value: UFixed, max: UFixed },

    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected unsigned numeric format")]
    InvalidDecimal { input: String },
}

/// Bounded parameters whose range violations are reported separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Threshold,
    LpFeeRate,
    CoefficientR,
    WithdrawFee,
    WithdrawFeePeriod,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Parameter::Threshold => "threshold",
            Parameter::LpFeeRate => "lp fee rate",
            Parameter::CoefficientR => "coefficient R",
            Parameter::WithdrawFee => "withdraw fee",
            Parameter::WithdrawFeePeriod => "withdraw fee period",
        };
        f.write_str(name)
    }
}

/// Which pool balance could not cover a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquiditySide {
    Base,
    Quote,
}

/// Which caller limit a swap violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlippageKind {
    /// `sellBase` produced less quote than `minQuoteAmount`
    MinQuote,
    /// `sellQuote` produced less base than `minBaseAmount`
    PriceExceedsLimit,
}

/// Privilege a caller was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Strategist,
}

/// Errors surfaced by the pool and vault ledgers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{field} cannot be the zero address")]
    ZeroAddress { field: &'static str },

    #[error("Token {0:?} does not exist")]
    TokenNotFound(Address),

    #[error("Base token {0:?} cannot be the quote token")]
    BaseTokenInvalid(Address),

    #[error("Token {0:?} already exists")]
    TokenAlreadyExists(Address),

    #[error("{parameter} {value} is out of range (max {max})")]
    OutOfRange {
        parameter: Parameter,
        value: UFixed,
        max: UFixed,
    },

    #[error("Insufficient {side:?} liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        side: LiquiditySide,
        requested: UFixed,
        available: UFixed,
    },

    #[error("Slippage exceeded ({kind:?}): output {output} below minimum {minimum}")]
    SlippageExceeded {
        kind: SlippageKind,
        output: UFixed,
        minimum: UFixed,
    },

    #[error("Oracle price unavailable for {0:?}")]
    PriceUnavailable(Address),

    #[error("Oracle price {price} for {token:?} deviates from reference {reference}")]
    PriceUnreliable {
        token: Address,
        price: UFixed,
        reference: UFixed,
    },

    #[error("Shares cannot be zero")]
    SharesZero,

    #[error("Amount cannot be zero")]
    AmountZero,

    #[error("Withdraw amount cannot be zero")]
    WithdrawAmountZero,

    #[error("Shares {requested} exceed balance {available}")]
    InsufficientShares { requested: UFixed, available: UFixed },

    #[error("Stuck token {0:?} cannot be the staked token")]
    StakedTokenNotSweepable(Address),

    #[error("Caller {caller:?} lacks {role:?} privilege")]
    Unauthorized { caller: Address, role: Role },

    #[error("Paused")]
    Paused,

    #[error("Not paused")]
    NotPaused,

    #[error("Insufficient balance of {token:?} for {holder:?}: needed {needed}, available {available}")]
    InsufficientBalance {
        token: Address,
        holder: Address,
        needed: UFixed,
        available: UFixed,
    },

    #[error("Insufficient allowance of {token:?} from {owner:?} to {spender:?}: needed {needed}, available {available}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        needed: UFixed,
        available: UFixed,
    },

    #[error(transparent)]
    Math(#[from] MathError),
}

impl LedgerError {
    /// Stable short name for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::ZeroAddress { .. } => "zero_address",
            LedgerError::TokenNotFound(_) => "token_not_found",
            LedgerError::BaseTokenInvalid(_) => "base_token_invalid",
            LedgerError::TokenAlreadyExists(_) => "token_already_exists",
            LedgerError::OutOfRange { .. } => "out_of_range",
            LedgerError::InsufficientLiquidity { .. } => "insufficient_liquidity",
            LedgerError::SlippageExceeded { .. } => "slippage_exceeded",
            LedgerError::PriceUnavailable(_) => "price_unavailable",
            LedgerError::PriceUnreliable { .. } => "price_unreliable",
            LedgerError::SharesZero => "shares_zero",
            LedgerError::AmountZero => "amount_zero",
            LedgerError::WithdrawAmountZero => "withdraw_amount_zero",
            LedgerError::InsufficientShares { .. } => "insufficient_shares",
            LedgerError::StakedTokenNotSweepable(_) => "staked_token_not_sweepable",
            LedgerError::Unauthorized { .. } => "unauthorized",
            LedgerError::Paused => "paused",
            LedgerError::NotPaused => "not_paused",
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::InsufficientAllowance { .. } => "insufficient_allowance",
            LedgerError::Math(_) => "math",
        }
    }

    /// Range check that reports which parameter was violated
    pub fn check_range(parameter: Parameter, value: UFixed, max: UFixed) -> Result<UFixed, Self> {
        value
            .range_check(max)
            .map_err(|_| LedgerError::OutOfRange {
                parameter,
                value,
                max,
            })
    }
}
