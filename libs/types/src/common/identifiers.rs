//! Account and token identifiers
//!
//! Accounts and tokens share the 20-byte [`Address`] representation. The zero
//! address is never a valid argument; optional references (a token's reference
//! feed, a swap's rebate recipient) are `Option<Address>` instead.

pub use ethers_core::types::Address;

use crate::common::errors::LedgerError;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Rejects the zero address, naming the offending argument
///
/// ```
/// use types::{require_non_zero, Address, LedgerError};
///
/// let err = require_non_zero(Address::zero(), "baseToken").unwrap_err();
/// assert_eq!(err, LedgerError::ZeroAddress { field: "baseToken" });
/// ```
pub fn require_non_zero(address: Address, field: &'static str) -> Result<Address, LedgerError> {
    if address.is_zero() {
        return Err(LedgerError::ZeroAddress { field });
    }
    Ok(address)
}

/// Deterministic test/demo address derived from a small integer
pub fn address_from_index(index: u64) -> Address {
    Address::from_low_u64_be(index)
}
