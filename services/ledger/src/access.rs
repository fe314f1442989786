//! Role registry shared by the pool and the vault

use crate::record;
use amm::AccessControl;
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::info;
use types::{require_non_zero, Address, LedgerError, LedgerEvent, Outcome, Role};

/// In-memory [`AccessControl`] with its own owner
#[derive(Debug)]
pub struct AccessManager {
    address: Address,
    owner: Address,
    strategists: RwLock<HashSet<Address>>,
    zero_fee_accounts: RwLock<HashSet<Address>>,
}

impl AccessManager {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            strategists: RwLock::new(HashSet::new()),
            zero_fee_accounts: RwLock::new(HashSet::new()),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    fn only_owner(&self, caller: Address) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized {
                caller,
                role: Role::Owner,
            });
        }
        Ok(())
    }

    /// Exempt `account` from vault withdraw fees (owner only)
    pub fn set_zero_fee_account(
        &self,
        caller: Address,
        account: Address,
        flag: bool,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_owner(caller)?;
        require_non_zero(account, "account")?;

        {
            let mut accounts = self.zero_fee_accounts.write();
            if flag {
                accounts.insert(account);
            } else {
                accounts.remove(&account);
            }
        }
        info!(?account, flag, "zero fee account updated");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::ZeroFeeAccountUpdated { account, flag });
        Ok(Outcome::new((), events))
    }
}

impl AccessControl for AccessManager {
    fn address(&self) -> Address {
        self.address
    }

    fn is_strategist(&self, account: Address) -> bool {
        self.strategists.read().contains(&account)
    }

    fn set_strategist(&self, caller: Address, account: Address, flag: bool) -> Result<(), LedgerError> {
        self.only_owner(caller)?;
        let mut strategists = self.strategists.write();
        if flag {
            strategists.insert(account);
        } else {
            strategists.remove(&account);
        }
        Ok(())
    }

    fn is_zero_fee_account(&self, account: Address) -> bool {
        self.zero_fee_accounts.read().contains(&account)
    }
}
