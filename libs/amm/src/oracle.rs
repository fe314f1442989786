//! Oracle price adapter
//!
//! Wraps the external price oracle and turns its `(value, feasible)` answers
//! into typed results. An infeasible or zero price fails the enclosing
//! operation with [`LedgerError::PriceUnavailable`]; no stale value is ever
//! substituted and no retry happens here.

use crate::pool_traits::ReferenceOracle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use types::{Address, LedgerError, Timestamp, UFixed};

/// Raw answer of the oracle's state query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OracleState {
    pub price: UFixed,
    pub spread: UFixed,
    pub coefficient: UFixed,
    pub feasible: bool,
}

/// Validated market state used for pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketState {
    pub price: UFixed,
    pub spread: UFixed,
    pub coefficient: UFixed,
}

/// External price oracle
pub trait PriceOracle: Send + Sync {
    fn address(&self) -> Address;

    /// `(price, feasible)`
    fn get_price(&self, token: Address) -> (UFixed, bool);

    fn get_state(&self, token: Address) -> OracleState;

    fn timestamp(&self) -> Timestamp;
}

/// Typed facade over a [`PriceOracle`] with an optional reference check
#[derive(Clone)]
pub struct OracleAdapter {
    oracle: Arc<dyn PriceOracle>,
    reference: Option<Arc<dyn ReferenceOracle>>,
    reference_bound: UFixed,
}

impl OracleAdapter {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            oracle,
            reference: None,
            reference_bound: ledger_config::pool::DEFAULT_REFERENCE_PRICE_BOUND,
        }
    }

    /// Enable the reference-feed deviation check with the given bound
    pub fn with_reference(mut self, reference: Arc<dyn ReferenceOracle>, bound: UFixed) -> Self {
        self.reference = Some(reference);
        self.reference_bound = bound;
        self
    }

    pub fn address(&self) -> Address {
        self.oracle.address()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.oracle.timestamp()
    }

    pub fn replace_oracle(&mut self, oracle: Arc<dyn PriceOracle>) {
        self.oracle = oracle;
    }

    /// Spot price of `token`, checked against `ref_feed` when one is registered
    pub fn price(&self, token: Address, ref_feed: Option<Address>) -> Result<UFixed, LedgerError> {
        let (price, feasible) = self.oracle.get_price(token);
        if !feasible || price.is_zero() {
            warn!(?token, feasible, "oracle price unavailable");
            return Err(LedgerError::PriceUnavailable(token));
        }
        self.check_reference(token, price, ref_feed)?;
        Ok(price)
    }

    /// Price, spread and coefficient of `token`
    pub fn state(&self, token: Address, ref_feed: Option<Address>) -> Result<MarketState, LedgerError> {
        let state = self.oracle.get_state(token);
        if !state.feasible || state.price.is_zero() {
            warn!(?token, feasible = state.feasible, "oracle state unavailable");
            return Err(LedgerError::PriceUnavailable(token));
        }
        self.check_reference(token, state.price, ref_feed)?;
        debug!(?token, price = %state.price, spread = %state.spread, "oracle state");
        Ok(MarketState {
            price: state.price,
            spread: state.spread,
            coefficient: state.coefficient,
        })
    }

    fn check_reference(
        &self,
        token: Address,
        price: UFixed,
        ref_feed: Option<Address>,
    ) -> Result<(), LedgerError> {
        let (Some(reference), Some(feed)) = (self.reference.as_ref(), ref_feed) else {
            return Ok(());
        };
        let Some(reference_price) = reference.latest_price(feed) else {
            return Ok(());
        };

        let lower = reference_price.mul_floor(UFixed::ONE.saturating_sub(self.reference_bound))?;
        let upper = reference_price.mul_ceil(UFixed::ONE.checked_add(self.reference_bound)?)?;
        if price < lower || price > upper {
            warn!(?token, %price, %reference_price, "oracle price outside reference band");
            return Err(LedgerError::PriceUnreliable {
                token,
                price,
                reference: reference_price,
            });
        }
        Ok(())
    }
}

/// In-memory oracle for tests and demos
///
/// Also serves reference readings, keyed by feed address.
#[derive(Debug)]
pub struct StaticOracle {
    address: Address,
    states: RwLock<HashMap<Address, OracleState>>,
    references: RwLock<HashMap<Address, UFixed>>,
    timestamp: AtomicU64,
}

impl StaticOracle {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            states: RwLock::new(HashMap::new()),
            references: RwLock::new(HashMap::new()),
            timestamp: AtomicU64::new(0),
        }
    }

    /// Publish a feasible state for `token`
    pub fn set_state(&self, token: Address, price: UFixed, spread: UFixed, coefficient: UFixed) {
        self.states.write().insert(
            token,
            OracleState {
                price,
                spread,
                coefficient,
                feasible: true,
            },
        );
    }

    pub fn set_feasible(&self, token: Address, feasible: bool) {
        self.states.write().entry(token).or_default().feasible = feasible;
    }

    pub fn set_reference_price(&self, feed: Address, price: UFixed) {
        self.references.write().insert(feed, price);
    }

    pub fn set_timestamp(&self, timestamp: Timestamp) {
        self.timestamp.store(timestamp, Ordering::Relaxed);
    }
}

impl PriceOracle for StaticOracle {
    fn address(&self) -> Address {
        self.address
    }

    fn get_price(&self, token: Address) -> (UFixed, bool) {
        let state = self.get_state(token);
        (state.price, state.feasible)
    }

    fn get_state(&self, token: Address) -> OracleState {
        self.states.read().get(&token).copied().unwrap_or_default()
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp.load(Ordering::Relaxed)
    }
}

impl ReferenceOracle for StaticOracle {
    fn latest_price(&self, feed: Address) -> Option<UFixed> {
        self.references.read().get(&feed).copied()
    }
}
