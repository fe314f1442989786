//! Accumulating reward sink for swap rebates

use amm::RewardManager;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use types::{Address, LedgerError, UFixed};

/// Records rebate volume per user without paying anything out
#[derive(Debug)]
pub struct RewardTracker {
    address: Address,
    volumes: RwLock<HashMap<Address, UFixed>>,
}

impl RewardTracker {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            volumes: RwLock::new(HashMap::new()),
        }
    }

    /// Accumulated volume credited to `user`
    pub fn volume_of(&self, user: Address) -> UFixed {
        self.volumes.read().get(&user).copied().unwrap_or_default()
    }
}

impl RewardManager for RewardTracker {
    fn address(&self) -> Address {
        self.address
    }

    fn add_reward(&self, user: Address, amount: UFixed) -> Result<(), LedgerError> {
        let mut volumes = self.volumes.write();
        let entry = volumes.entry(user).or_default();
        *entry = entry.checked_add(amount)?;
        debug!(?user, %amount, "rebate volume recorded");
        Ok(())
    }
}
