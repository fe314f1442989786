//! Ledger Configuration Module
//!
//! Loads pool and vault settings from a TOML file with environment overrides.
//! Fractions are written as decimal strings (`"0.001"`) and parsed exactly
//! into 18-decimal fixed point; nothing passes through a float.

use crate::protocol::{pool, vault};
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use types::{LedgerError, Parameter, UFixed};

/// Environment variable prefix, e.g. `LEDGER__VAULT__WITHDRAW_FEE_BPS=250`
pub const ENV_PREFIX: &str = "LEDGER";

/// Main ledger configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    pub global: GlobalConfig,
    pub pool: PoolConfig,
    pub vault: VaultConfig,
    /// Base token parameters keyed by symbol
    pub tokens: BTreeMap<String, TokenConfig>,
}

/// Global configuration settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
    pub json_logs: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    pub pairs_info: String,
    /// Decimal fraction, e.g. `"0.01"` for 1%
    pub reference_price_bound: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct VaultConfig {
    pub withdraw_fee_bps: u32,
    pub withdraw_fee_period_secs: u64,
}

/// Raw per-token parameters as written in the file
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TokenConfig {
    pub threshold: String,
    pub lp_fee_rate: String,
    pub coefficient_r: String,
}

/// Parsed and range-checked token parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenParameters {
    pub threshold: UFixed,
    pub lp_fee_rate: UFixed,
    pub coefficient_r: UFixed,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pairs_info: String::new(),
            reference_price_bound: pool::DEFAULT_REFERENCE_PRICE_BOUND.to_string(),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            withdraw_fee_bps: vault::DEFAULT_WITHDRAW_FEE_BPS,
            withdraw_fee_period_secs: vault::DEFAULT_WITHDRAW_FEE_PERIOD_SECS,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            threshold: "0".to_string(),
            lp_fee_rate: "0".to_string(),
            coefficient_r: "0".to_string(),
        }
    }
}

impl TokenConfig {
    /// Parse the decimal strings and apply the pool's parameter bounds
    pub fn parameters(&self) -> Result<TokenParameters, LedgerError> {
        let threshold = UFixed::from_decimal_str(&self.threshold)?;
        let lp_fee_rate = UFixed::from_decimal_str(&self.lp_fee_rate)?;
        let coefficient_r = UFixed::from_decimal_str(&self.coefficient_r)?;
        Ok(TokenParameters {
            threshold: LedgerError::check_range(Parameter::Threshold, threshold, pool::MAX_THRESHOLD)?,
            lp_fee_rate: LedgerError::check_range(
                Parameter::LpFeeRate,
                lp_fee_rate,
                pool::MAX_LP_FEE_RATE,
            )?,
            coefficient_r: LedgerError::check_range(
                Parameter::CoefficientR,
                coefficient_r,
                pool::MAX_COEFFICIENT_R,
            )?,
        })
    }
}

impl LedgerConfig {
    /// Load configuration from an optional TOML file with environment overrides
    ///
    /// Without a file every section takes its default. Environment variables
    /// use the `LEDGER` prefix and `__` as the nesting separator.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading ledger config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let loaded: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        debug!(tokens = loaded.tokens.len(), "ledger config loaded");
        Ok(loaded)
    }

    /// Load and validate in one step
    pub fn load_validated(path: Option<&Path>) -> Result<Self> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Enforce the vault bounds and check every token's parameters
    pub fn validate(&self) -> Result<()> {
        if self.vault.withdraw_fee_bps > vault::MAX_WITHDRAW_FEE_BPS {
            bail!(
                "vault.withdraw_fee_bps {} exceeds maximum {}",
                self.vault.withdraw_fee_bps,
                vault::MAX_WITHDRAW_FEE_BPS
            );
        }
        if self.vault.withdraw_fee_period_secs > vault::MAX_WITHDRAW_FEE_PERIOD_SECS {
            bail!(
                "vault.withdraw_fee_period_secs {} exceeds maximum {}",
                self.vault.withdraw_fee_period_secs,
                vault::MAX_WITHDRAW_FEE_PERIOD_SECS
            );
        }
        let bound = self.reference_price_bound()?;
        if bound > UFixed::ONE {
            bail!("pool.reference_price_bound {} exceeds 1", bound);
        }
        for (symbol, token) in &self.tokens {
            token
                .parameters()
                .with_context(|| format!("Invalid parameters for token {}", symbol))?;
        }
        Ok(())
    }

    /// Parsed parameters for one configured token
    pub fn token_parameters(&self, symbol: &str) -> Result<TokenParameters> {
        let token = self
            .tokens
            .get(symbol)
            .with_context(|| format!("Token {} is not configured", symbol))?;
        token
            .parameters()
            .with_context(|| format!("Invalid parameters for token {}", symbol))
    }

    pub fn reference_price_bound(&self) -> Result<UFixed> {
        UFixed::from_decimal_str(&self.pool.reference_price_bound)
            .context("Invalid pool.reference_price_bound")
    }

    pub fn withdraw_fee_period(&self) -> Duration {
        Duration::from_secs(self.vault.withdraw_fee_period_secs)
    }

    /// Render back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
