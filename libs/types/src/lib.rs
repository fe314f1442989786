//! # Ledger Types Library
//!
//! Shared vocabulary for the oracle-priced pool and the staking vault.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: Amounts, prices and fractions are 18-decimal scaled integers
//! - **Distinguishable Failures**: Every rejection is its own [`LedgerError`] variant
//! - **Explicit Notifications**: Operations hand back [`LedgerEvent`]s in an [`Outcome`]
//! - **Clear Boundaries**: `rust_decimal` appears only at display and test edges
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{UFixed, LedgerError, Parameter};
//!
//! let fee = UFixed::from_decimal_str("0.001").unwrap();
//! let checked = LedgerError::check_range(Parameter::LpFeeRate, fee, UFixed::ONE).unwrap();
//! assert_eq!(checked, fee);
//!
//! let too_big = UFixed::from_units(2);
//! assert!(LedgerError::check_range(Parameter::LpFeeRate, too_big, UFixed::ONE).is_err());
//! ```
//!
//! ## Integration Points
//!
//! - **amm**: PMM pricing and fee policy operate on [`UFixed`]
//! - **ledger-config**: Parses decimal strings from TOML into [`UFixed`]
//! - **ledger**: Pool and vault state, settlement and event emission

pub mod common;
pub mod events;

pub use common::errors::{LedgerError, LiquiditySide, MathError, Parameter, Role, SlippageKind};
pub use common::fixed_point::{mul_div, mul_div_ceil, UFixed, BPS_DENOMINATOR, DECIMALS};
pub use common::identifiers::{address_from_index, require_non_zero, Address, Timestamp};
pub use ethers_core::types::{U256, U512};
pub use events::{LedgerEvent, Outcome};

/// Result alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
