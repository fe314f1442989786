//! Fixed-point arithmetic for token amounts, prices and fractions
//!
//! Every amount in the ledgers is an unsigned integer scaled by 10^18. The
//! representation is a 256-bit word; products are formed in 512 bits so
//! `mul_div` never overflows for realistic supplies (up to 2^112 units).
//!
//! ## Design Principles
//!
//! - **No Precision Loss**: Values are stored as scaled integers, never floats
//! - **Truncating Division**: Every `*_floor` operation rounds toward zero
//! - **Checked Arithmetic**: Overflow and underflow surface as [`MathError`]
//! - **Clear Boundaries**: `to_decimal` exists for logs and test tolerances only

use crate::common::errors::MathError;
use ethers_core::types::{U256, U512};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional decimal digits carried by [`UFixed`]
pub const DECIMALS: u32 = 18;

/// Raw value of 1.0 (10^18)
const ONE_RAW: u64 = 1_000_000_000_000_000_000;

/// Unsigned fixed-point value with 18 decimal places
///
/// Scale factor: 1,000,000,000,000,000,000 (10^18)
///
/// Examples:
/// - 1.0 = UFixed(10^18)
/// - 0.001 = UFixed(10^15)
/// - 50,000 = UFixed(5 * 10^22)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UFixed(U256);

impl UFixed {
    /// Zero
    pub const ZERO: Self = Self(U256([0, 0, 0, 0]));

    /// 1.0, also "100%" for every fraction parameter
    pub const ONE: Self = Self(U256([ONE_RAW, 0, 0, 0]));

    /// Largest representable value
    pub const MAX: Self = Self(U256::MAX);

    /// Wrap a raw scaled integer
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Wrap a raw scaled integer given as `u128`
    pub fn from_raw_u128(raw: u128) -> Self {
        Self(U256::from(raw))
    }

    /// The raw scaled integer
    pub const fn raw(self) -> U256 {
        self.0
    }

    /// Whole units, e.g. `from_units(100)` is 100.0
    pub fn from_units(units: u64) -> Self {
        Self(U256::from(units) * U256::from(ONE_RAW))
    }

    /// Ratio `numerator / denominator` as a fixed-point fraction
    pub fn from_ratio(numerator: u64, denominator: u64) -> Result<Self, MathError> {
        mul_div(U256::from(numerator), U256::from(ONE_RAW), U256::from(denominator)).map(Self)
    }

    /// Create from a decimal string with exact parsing
    ///
    /// This is the PRIMARY method for creating values from external data
    /// (configuration files, CLI input). Digits beyond the 18th decimal
    /// place are rejected rather than silently truncated.
    ///
    /// # Examples
    /// ```
    /// use types::UFixed;
    ///
    /// let fee = UFixed::from_decimal_str("0.001").unwrap();
    /// assert_eq!(fee, UFixed::from_ratio(1, 1000).unwrap());
    /// ```
    pub fn from_decimal_str(s: &str) -> Result<Self, MathError> {
        let invalid = || MathError::InvalidDecimal {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (trimmed, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) || frac_part.len() > DECIMALS as usize
        {
            return Err(invalid());
        }

        let integer = if int_part.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(int_part).map_err(|_| invalid())?
        };
        let fraction = if frac_part.is_empty() {
            U256::zero()
        } else {
            let padded = format!("{:0<width$}", frac_part, width = DECIMALS as usize);
            U256::from_dec_str(&padded).map_err(|_| invalid())?
        };

        integer
            .checked_mul(U256::from(ONE_RAW))
            .and_then(|scaled| scaled.checked_add(fraction))
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    /// Lossless conversion for values below ~7.9e10 units, `None` beyond
    ///
    /// # Warning
    /// Only use for display, logging, or tolerance checks in tests. Never
    /// feed the result back into ledger arithmetic.
    pub fn to_decimal(self) -> Option<Decimal> {
        if self.0 > U256::from(i128::MAX as u128) {
            return None;
        }
        Decimal::try_from_i128_with_scale(self.0.low_u128() as i128, DECIMALS).ok()
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    // CHECKED ARITHMETIC - every ledger mutation goes through these

    pub fn checked_add(self, rhs: Self) -> Result<Self, MathError> {
        self.0.checked_add(rhs.0).map(Self).ok_or(MathError::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, MathError> {
        self.0.checked_sub(rhs.0).map(Self).ok_or(MathError::Underflow)
    }

    /// Clamps at zero
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// `self * rhs`, truncated
    pub fn mul_floor(self, rhs: Self) -> Result<Self, MathError> {
        mul_div(self.0, rhs.0, U256::from(ONE_RAW)).map(Self)
    }

    /// `self * rhs`, rounded up
    pub fn mul_ceil(self, rhs: Self) -> Result<Self, MathError> {
        mul_div_ceil(self.0, rhs.0, U256::from(ONE_RAW)).map(Self)
    }

    /// `self / rhs`, truncated
    pub fn div_floor(self, rhs: Self) -> Result<Self, MathError> {
        mul_div(self.0, U256::from(ONE_RAW), rhs.0).map(Self)
    }

    /// `self / rhs`, rounded up
    pub fn div_ceil(self, rhs: Self) -> Result<Self, MathError> {
        mul_div_ceil(self.0, U256::from(ONE_RAW), rhs.0).map(Self)
    }

    /// `self * numerator / denominator` with a full-width intermediate
    pub fn mul_div(self, numerator: Self, denominator: Self) -> Result<Self, MathError> {
        mul_div(self.0, numerator.0, denominator.0).map(Self)
    }

    /// `self * bps / 10_000`, truncated
    pub fn mul_bps(self, bps: u32) -> Result<Self, MathError> {
        mul_div(self.0, U256::from(bps), U256::from(BPS_DENOMINATOR)).map(Self)
    }

    /// Fails with [`MathError::OutOfRange`] when `self > max`
    pub fn range_check(self, max: Self) -> Result<Self, MathError> {
        if self > max {
            return Err(MathError::OutOfRange { value: self, max });
        }
        Ok(self)
    }
}

/// Denominator of basis-point fractions
pub const BPS_DENOMINATOR: u32 = 10_000;

/// `a * b / denominator` with a 512-bit intermediate, truncating toward zero
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    U256::try_from(quotient).map_err(|_| MathError::Overflow)
}

/// `a * b / denominator` with a 512-bit intermediate, rounding up
pub fn mul_div_ceil(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let (quotient, remainder) = a.full_mul(b).div_mod(U512::from(denominator));
    let rounded = if remainder.is_zero() {
        quotient
    } else {
        quotient + U512::one()
    };
    U256::try_from(rounded).map_err(|_| MathError::Overflow)
}

impl From<U256> for UFixed {
    fn from(raw: U256) -> Self {
        Self(raw)
    }
}

impl FromStr for UFixed {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

/// Decimal rendering with trailing zeros trimmed, e.g. `49992.5`
impl fmt::Display for UFixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let one = U256::from(ONE_RAW);
        let integer = self.0 / one;
        let fraction = (self.0 % one).low_u64();
        if fraction == 0 {
            return write!(f, "{}", integer);
        }
        let digits = format!("{:018}", fraction);
        write!(f, "{}.{}", integer, digits.trim_end_matches('0'))
    }
}
