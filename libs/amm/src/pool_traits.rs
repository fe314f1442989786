//! Collaborator trait definitions consumed by the pool and vault ledgers

use serde::{Deserialize, Serialize};
use types::{Address, LedgerError, UFixed};

/// One token movement inside a settlement batch
///
/// With a `spender` the movement consumes `from`'s allowance to that spender
/// (pull semantics); without one it is a direct transfer by `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub amount: UFixed,
    pub spender: Option<Address>,
}

impl Transfer {
    /// Direct transfer out of `from`
    pub fn push(token: Address, from: Address, to: Address, amount: UFixed) -> Self {
        Self {
            token,
            from,
            to,
            amount,
            spender: None,
        }
    }

    /// Allowance-consuming pull of `from`'s tokens by `spender`
    pub fn pull(token: Address, from: Address, to: Address, amount: UFixed, spender: Address) -> Self {
        Self {
            token,
            from,
            to,
            amount,
            spender: Some(spender),
        }
    }
}

/// Token custody shared by the ledgers
pub trait AssetTransfer: Send {
    fn balance_of(&self, token: Address, holder: Address) -> UFixed;

    /// Fail exactly as `settle` would, without applying anything
    fn check(&self, transfers: &[Transfer]) -> Result<(), LedgerError>;

    /// Apply every transfer or none of them
    fn settle(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError>;
}

/// Privileged-role registry injected into both ledgers
pub trait AccessControl: Send + Sync {
    fn address(&self) -> Address;

    fn is_strategist(&self, account: Address) -> bool;

    /// Grant or revoke the strategist role; `caller` must own the registry
    fn set_strategist(&self, caller: Address, account: Address, flag: bool) -> Result<(), LedgerError>;

    fn is_zero_fee_account(&self, account: Address) -> bool;
}

/// Swap rebate sink
///
/// A rejected reward fails the swap that triggered it.
pub trait RewardManager: Send + Sync {
    fn address(&self) -> Address;

    fn add_reward(&self, user: Address, amount: UFixed) -> Result<(), LedgerError>;
}

/// Secondary price feed used to sanity-check the primary oracle
pub trait ReferenceOracle: Send + Sync {
    /// `None` when the feed has no reading
    fn latest_price(&self, feed: Address) -> Option<UFixed>;
}
