//! # Ledger Configuration
//!
//! Centralized constants and configuration loading for the pool and vault
//! ledgers, so bounds are defined once and shared by every crate.
//!
//! ## Features
//!
//! - **Protocol Constants**: Withdraw fee bounds, basis-point denominator, parameter ranges
//! - **Ledger Configuration**: TOML files with `LEDGER__` environment overrides
//!
//! ## Usage
//!
//! ```rust
//! use ledger_config::{protocol, LedgerConfig};
//!
//! assert_eq!(protocol::vault::MAX_WITHDRAW_FEE_BPS, 500);
//!
//! let config = LedgerConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod protocol;
pub mod service_config;

// Re-export commonly used types
pub use protocol::*;
pub use service_config::{
    GlobalConfig, LedgerConfig, PoolConfig, TokenConfig, TokenParameters, VaultConfig,
};
