//! In-memory token custody
//!
//! Balances and allowances for any number of tokens. Settlement batches are
//! staged against scratch copies of the touched entries and committed only
//! when every transfer in the batch succeeds.

use crate::SharedAssets;
use amm::{AssetTransfer, Transfer};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use types::{Address, LedgerError, UFixed};

type BalanceKey = (Address, Address);
type AllowanceKey = (Address, Address, Address);
type Staged = (HashMap<BalanceKey, UFixed>, HashMap<AllowanceKey, UFixed>);

/// Token balances keyed by `(token, holder)`
#[derive(Debug, Default)]
pub struct TokenLedger {
    balances: HashMap<BalanceKey, UFixed>,
    allowances: HashMap<AllowanceKey, UFixed>,
    supplies: HashMap<Address, UFixed>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap for sharing between ledgers while keeping the concrete handle
    pub fn into_shared(self) -> Arc<Mutex<TokenLedger>> {
        Arc::new(Mutex::new(self))
    }

    /// Create `amount` new tokens for `to`
    pub fn mint(&mut self, token: Address, to: Address, amount: UFixed) -> Result<(), LedgerError> {
        let supply = self.total_supply(token).checked_add(amount)?;
        let balance = self.balance(token, to).checked_add(amount)?;
        self.supplies.insert(token, supply);
        self.balances.insert((token, to), balance);
        debug!(?token, ?to, %amount, "minted");
        Ok(())
    }

    /// Set `spender`'s allowance over `owner`'s tokens; `UFixed::MAX` never decreases
    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: UFixed) {
        self.allowances.insert((token, owner, spender), amount);
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> UFixed {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn total_supply(&self, token: Address) -> UFixed {
        self.supplies.get(&token).copied().unwrap_or_default()
    }

    fn balance(&self, token: Address, holder: Address) -> UFixed {
        self.balances
            .get(&(token, holder))
            .copied()
            .unwrap_or_default()
    }
}

impl AssetTransfer for TokenLedger {
    fn balance_of(&self, token: Address, holder: Address) -> UFixed {
        self.balance(token, holder)
    }

    fn check(&self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        self.stage(transfers).map(|_| ())
    }

    fn settle(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        let (balances, allowances) = self.stage(transfers)?;
        self.balances.extend(balances);
        self.allowances.extend(allowances);
        debug!(transfers = transfers.len(), "settled");
        Ok(())
    }
}

impl TokenLedger {
    /// Apply `transfers` to scratch copies of the touched entries
    fn stage(&self, transfers: &[Transfer]) -> Result<Staged, LedgerError> {
        let mut balances: HashMap<BalanceKey, UFixed> = HashMap::new();
        let mut allowances: HashMap<AllowanceKey, UFixed> = HashMap::new();

        for transfer in transfers {
            if let Some(spender) = transfer.spender {
                let key = (transfer.token, transfer.from, spender);
                let available = allowances
                    .get(&key)
                    .copied()
                    .unwrap_or_else(|| self.allowance(transfer.token, transfer.from, spender));
                if available < transfer.amount {
                    return Err(LedgerError::InsufficientAllowance {
                        token: transfer.token,
                        owner: transfer.from,
                        spender,
                        needed: transfer.amount,
                        available,
                    });
                }
                if available != UFixed::MAX {
                    allowances.insert(key, available.checked_sub(transfer.amount)?);
                }
            }

            let from_key = (transfer.token, transfer.from);
            let available = balances
                .get(&from_key)
                .copied()
                .unwrap_or_else(|| self.balance(transfer.token, transfer.from));
            if available < transfer.amount {
                return Err(LedgerError::InsufficientBalance {
                    token: transfer.token,
                    holder: transfer.from,
                    needed: transfer.amount,
                    available,
                });
            }
            balances.insert(from_key, available.checked_sub(transfer.amount)?);

            let to_key = (transfer.token, transfer.to);
            let current = balances
                .get(&to_key)
                .copied()
                .unwrap_or_else(|| self.balance(transfer.token, transfer.to));
            balances.insert(to_key, current.checked_add(transfer.amount)?);
        }

        Ok((balances, allowances))
    }
}

/// Upcast a concrete ledger handle into the shared trait object
pub fn share(ledger: &Arc<Mutex<TokenLedger>>) -> SharedAssets {
    ledger.clone()
}
