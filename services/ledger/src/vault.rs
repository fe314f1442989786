//! Vault Ledger
//!
//! Share accounting for a single staked token. Shares are minted against the
//! vault's active balance (holdings minus outstanding reserves), so rewards
//! raise the price of every share without minting.
//!
//! A holder exits either through the reserve lifecycle
//! (`reserve_withdraw` then `withdraw`, fee-free once the fee period has
//! elapsed) or at once through `instant_withdraw`, which always pays the fee
//! unless the holder is a zero-fee account.

use crate::clock::Clock;
use crate::{log_rejection, record, SharedAssets};
use amm::{AccessControl, AssetTransfer, FeePolicy, Transfer, WithdrawPath};
use ledger_config::vault::{MAX_WITHDRAW_FEE_BPS, MAX_WITHDRAW_FEE_PERIOD_SECS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use types::{require_non_zero, Address, LedgerError, LedgerEvent, Outcome, Role, Timestamp, UFixed};

/// Per-depositor reserve state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    pub reserve_amount: UFixed,
    pub last_reserve_withdraw_time: Timestamp,
    /// Share price after the user's last deposit
    pub cost_share_price: UFixed,
}

/// Construction arguments for [`VaultLedger`]
pub struct VaultSetup {
    /// The vault's own account in the asset ledger
    pub address: Address,
    pub owner: Address,
    pub staked_token: Address,
    pub treasury: Address,
    pub access: Arc<dyn AccessControl>,
    pub assets: SharedAssets,
    pub clock: Arc<dyn Clock>,
}

/// Staking vault with appreciating shares
pub struct VaultLedger {
    address: Address,
    owner: Address,
    staked_token: Address,
    treasury: Address,
    access: Arc<dyn AccessControl>,
    assets: SharedAssets,
    clock: Arc<dyn Clock>,
    fee_policy: FeePolicy,
    users: HashMap<Address, UserInfo>,
    shares: HashMap<Address, UFixed>,
    total_shares: UFixed,
    total_reserve_amount: UFixed,
    paused: bool,
}

impl VaultLedger {
    /// 5%
    pub const MAX_WITHDRAW_FEE: u32 = MAX_WITHDRAW_FEE_BPS;

    /// 7 days
    pub const MAX_WITHDRAW_FEE_PERIOD: Duration = Duration::from_secs(MAX_WITHDRAW_FEE_PERIOD_SECS);

    pub fn new(setup: VaultSetup) -> Result<Self, LedgerError> {
        require_non_zero(setup.address, "vault")?;
        require_non_zero(setup.owner, "owner")?;
        require_non_zero(setup.staked_token, "stakedToken")?;
        require_non_zero(setup.treasury, "initialTreasury")?;
        require_non_zero(setup.access.address(), "wooAccessManager")?;

        info!(
            vault = ?setup.address,
            staked_token = ?setup.staked_token,
            "vault ledger created"
        );
        Ok(Self {
            address: setup.address,
            owner: setup.owner,
            staked_token: setup.staked_token,
            treasury: setup.treasury,
            access: setup.access,
            assets: setup.assets,
            clock: setup.clock,
            fee_policy: FeePolicy::default(),
            users: HashMap::new(),
            shares: HashMap::new(),
            total_shares: UFixed::ZERO,
            total_reserve_amount: UFixed::ZERO,
            paused: false,
        })
    }

    /// Start from the configured fee policy instead of the defaults
    pub fn with_fee_policy(mut self, fee_policy: FeePolicy) -> Self {
        self.fee_policy = fee_policy;
        self
    }

    // ACCESSORS

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn staked_token(&self) -> Address {
        self.staked_token
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn access_manager(&self) -> Address {
        self.access.address()
    }

    pub fn withdraw_fee(&self) -> u32 {
        self.fee_policy.fee_bps()
    }

    pub fn withdraw_fee_period(&self) -> Duration {
        self.fee_policy.period()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn total_shares(&self) -> UFixed {
        self.total_shares
    }

    pub fn total_reserve_amount(&self) -> UFixed {
        self.total_reserve_amount
    }

    pub fn share_balance_of(&self, user: Address) -> UFixed {
        self.shares.get(&user).copied().unwrap_or_default()
    }

    pub fn user_info(&self, user: Address) -> UserInfo {
        self.users.get(&user).copied().unwrap_or_default()
    }

    /// Share price recorded at the user's last deposit, zero if none
    pub fn cost_share_price(&self, user: Address) -> UFixed {
        self.user_info(user).cost_share_price
    }

    /// Holdings not earmarked for reserves
    pub fn balance(&self) -> Result<UFixed, LedgerError> {
        let assets = self.assets.lock();
        self.active_balance(&*assets)
    }

    /// `balance * ONE / totalShares`, or `ONE` before any shares exist
    pub fn get_price_per_full_share(&self) -> Result<UFixed, LedgerError> {
        let assets = self.assets.lock();
        self.share_price(&*assets)
    }

    fn active_balance(&self, assets: &dyn AssetTransfer) -> Result<UFixed, LedgerError> {
        let held = assets.balance_of(self.staked_token, self.address);
        Ok(held.checked_sub(self.total_reserve_amount)?)
    }

    fn share_price(&self, assets: &dyn AssetTransfer) -> Result<UFixed, LedgerError> {
        if self.total_shares.is_zero() {
            return Ok(UFixed::ONE);
        }
        Ok(self
            .active_balance(assets)?
            .mul_div(UFixed::ONE, self.total_shares)?)
    }

    // USER OPERATIONS

    /// Stake `amount` for `caller`, returning the minted shares
    pub fn deposit(&mut self, caller: Address, amount: UFixed) -> Result<Outcome<UFixed>, LedgerError> {
        self.execute_deposit(caller, amount)
            .inspect_err(|error| log_rejection("deposit", error))
    }

    /// Convert `shares` into a pending reserve at the current price
    pub fn reserve_withdraw(&mut self, caller: Address, shares: UFixed) -> Result<Outcome<UFixed>, LedgerError> {
        self.execute_reserve_withdraw(caller, shares)
            .inspect_err(|error| log_rejection("reserveWithdraw", error))
    }

    /// Pay out the caller's reserve, returning the amount received after fee
    pub fn withdraw(&mut self, caller: Address) -> Result<Outcome<UFixed>, LedgerError> {
        self.execute_withdraw(caller)
            .inspect_err(|error| log_rejection("withdraw", error))
    }

    /// Burn `shares` and pay out immediately, returning the amount received after fee
    pub fn instant_withdraw(&mut self, caller: Address, shares: UFixed) -> Result<Outcome<UFixed>, LedgerError> {
        self.execute_instant_withdraw(caller, shares)
            .inspect_err(|error| log_rejection("instantWithdraw", error))
    }

    /// Add `amount` to the vault without minting, returning the new share price
    pub fn add_reward(&mut self, caller: Address, amount: UFixed) -> Result<Outcome<UFixed>, LedgerError> {
        self.execute_add_reward(caller, amount)
            .inspect_err(|error| log_rejection("addReward", error))
    }

    /// Move shares between holders
    pub fn transfer_shares(
        &mut self,
        from: Address,
        to: Address,
        shares: UFixed,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_transfer_shares(from, to, shares)
            .inspect_err(|error| log_rejection("transferShares", error))
    }

    fn execute_transfer_shares(
        &mut self,
        from: Address,
        to: Address,
        shares: UFixed,
    ) -> Result<Outcome<()>, LedgerError> {
        self.when_not_paused()?;
        require_non_zero(from, "from")?;
        require_non_zero(to, "to")?;
        let from_balance = self.share_balance_of(from);
        if shares > from_balance {
            return Err(LedgerError::InsufficientShares {
                requested: shares,
                available: from_balance,
            });
        }

        self.burn(from, shares)?;
        self.mint(to, shares)?;

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::SharesTransferred { from, to, shares });
        Ok(Outcome::new((), events))
    }

    fn execute_deposit(&mut self, caller: Address, amount: UFixed) -> Result<Outcome<UFixed>, LedgerError> {
        self.when_not_paused()?;
        if amount.is_zero() {
            return Ok(Outcome::silent(UFixed::ZERO));
        }

        let assets = self.assets.clone();
        let mut assets = assets.lock();
        // Sampled before the incoming transfer lands
        let balance_before = self.active_balance(&*assets)?;
        let shares = if self.total_shares.is_zero() {
            amount
        } else {
            amount.mul_div(self.total_shares, balance_before)?
        };

        assets.settle(&[Transfer::pull(
            self.staked_token,
            caller,
            self.address,
            amount,
            self.address,
        )])?;

        self.mint(caller, shares)?;
        let price = self.share_price(&*assets)?;
        self.users.entry(caller).or_default().cost_share_price = price;
        debug!(user = ?caller, %amount, %shares, %price, "deposit");

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::Deposit {
                user: caller,
                amount,
                shares,
            },
        );
        Ok(Outcome::new(shares, events))
    }

    fn execute_reserve_withdraw(
        &mut self,
        caller: Address,
        shares: UFixed,
    ) -> Result<Outcome<UFixed>, LedgerError> {
        self.when_not_paused()?;
        self.check_burnable(caller, shares)?;

        let assets = self.assets.clone();
        let assets = assets.lock();
        let price = self.share_price(&*assets)?;
        let reserve_amount = shares.mul_floor(price)?;

        let total_reserve_amount = self.total_reserve_amount.checked_add(reserve_amount)?;
        let mut user = self.user_info(caller);
        user.reserve_amount = user.reserve_amount.checked_add(reserve_amount)?;
        user.last_reserve_withdraw_time = self.clock.now();

        self.burn(caller, shares)?;
        self.total_reserve_amount = total_reserve_amount;
        self.users.insert(caller, user);
        debug!(user = ?caller, %shares, %reserve_amount, "reserve withdraw");

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::ReserveWithdraw {
                user: caller,
                amount: reserve_amount,
                shares,
            },
        );
        Ok(Outcome::new(reserve_amount, events))
    }

    fn execute_withdraw(&mut self, caller: Address) -> Result<Outcome<UFixed>, LedgerError> {
        self.when_not_paused()?;
        let user = self.user_info(caller);
        let amount = user.reserve_amount;
        if amount.is_zero() {
            return Err(LedgerError::WithdrawAmountZero);
        }

        let elapsed = Duration::from_secs(self.clock.now().saturating_sub(user.last_reserve_withdraw_time));
        let fee = self.fee_policy.fee(
            amount,
            WithdrawPath::Delayed { elapsed },
            self.access.is_zero_fee_account(caller),
        )?;
        let total_reserve_amount = self.total_reserve_amount.checked_sub(amount)?;

        let assets = self.assets.clone();
        self.pay_out(&mut *assets.lock(), caller, amount, fee)?;

        self.total_reserve_amount = total_reserve_amount;
        self.users.insert(
            caller,
            UserInfo {
                reserve_amount: UFixed::ZERO,
                last_reserve_withdraw_time: 0,
                ..user
            },
        );
        debug!(user = ?caller, %amount, %fee, ?elapsed, "withdraw");

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::VaultWithdraw {
                user: caller,
                amount,
                fee,
            },
        );
        Ok(Outcome::new(amount.checked_sub(fee)?, events))
    }

    fn execute_instant_withdraw(
        &mut self,
        caller: Address,
        shares: UFixed,
    ) -> Result<Outcome<UFixed>, LedgerError> {
        self.when_not_paused()?;
        self.check_burnable(caller, shares)?;

        let assets = self.assets.clone();
        let mut assets = assets.lock();
        let amount = shares.mul_floor(self.share_price(&*assets)?)?;
        let fee = self.fee_policy.fee(
            amount,
            WithdrawPath::Instant,
            self.access.is_zero_fee_account(caller),
        )?;

        self.pay_out(&mut *assets, caller, amount, fee)?;
        self.burn(caller, shares)?;
        debug!(user = ?caller, %shares, %amount, %fee, "instant withdraw");

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::InstantWithdraw {
                user: caller,
                amount,
                fee,
            },
        );
        Ok(Outcome::new(amount.checked_sub(fee)?, events))
    }

    fn execute_add_reward(&mut self, caller: Address, amount: UFixed) -> Result<Outcome<UFixed>, LedgerError> {
        self.when_not_paused()?;
        if amount.is_zero() {
            return Err(LedgerError::AmountZero);
        }

        let mut assets = self.assets.lock();
        let balance_before = self.active_balance(&*assets)?;
        let price_before = self.share_price(&*assets)?;

        assets.settle(&[Transfer::pull(
            self.staked_token,
            caller,
            self.address,
            amount,
            self.address,
        )])?;

        let balance_after = self.active_balance(&*assets)?;
        let price_after = self.share_price(&*assets)?;
        info!(%amount, %price_before, %price_after, "reward added");

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::RewardAdded {
                caller,
                balance_before,
                price_before,
                balance_after,
                price_after,
            },
        );
        Ok(Outcome::new(price_after, events))
    }

    // ADMINISTRATION

    pub fn set_withdraw_fee(&mut self, caller: Address, withdraw_fee_bps: u32) -> Result<Outcome<()>, LedgerError> {
        self.execute_set_withdraw_fee(caller, withdraw_fee_bps)
            .inspect_err(|error| log_rejection("setWithdrawFee", error))
    }

    fn execute_set_withdraw_fee(&mut self, caller: Address, withdraw_fee_bps: u32) -> Result<Outcome<()>, LedgerError> {
        self.only_owner(caller)?;
        self.fee_policy.set_fee_bps(withdraw_fee_bps)?;
        info!(withdraw_fee_bps, "withdraw fee updated");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::WithdrawFeeUpdated { withdraw_fee_bps });
        Ok(Outcome::new((), events))
    }

    pub fn set_withdraw_fee_period(&mut self, caller: Address, period: Duration) -> Result<Outcome<()>, LedgerError> {
        self.execute_set_withdraw_fee_period(caller, period)
            .inspect_err(|error| log_rejection("setWithdrawFeePeriod", error))
    }

    fn execute_set_withdraw_fee_period(&mut self, caller: Address, period: Duration) -> Result<Outcome<()>, LedgerError> {
        self.only_owner(caller)?;
        self.fee_policy.set_period(period)?;
        info!(?period, "withdraw fee period updated");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::WithdrawFeePeriodUpdated { period });
        Ok(Outcome::new((), events))
    }

    pub fn set_treasury(&mut self, caller: Address, treasury: Address) -> Result<Outcome<()>, LedgerError> {
        self.execute_set_treasury(caller, treasury)
            .inspect_err(|error| log_rejection("setTreasury", error))
    }

    fn execute_set_treasury(&mut self, caller: Address, treasury: Address) -> Result<Outcome<()>, LedgerError> {
        self.only_owner(caller)?;
        self.treasury = require_non_zero(treasury, "treasury")?;
        info!(?treasury, "treasury updated");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::TreasuryUpdated { treasury });
        Ok(Outcome::new((), events))
    }

    pub fn set_woo_access_manager(
        &mut self,
        caller: Address,
        access: Arc<dyn AccessControl>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_set_woo_access_manager(caller, access)
            .inspect_err(|error| log_rejection("setWooAccessManager", error))
    }

    fn execute_set_woo_access_manager(
        &mut self,
        caller: Address,
        access: Arc<dyn AccessControl>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_owner(caller)?;
        let manager = require_non_zero(access.address(), "wooAccessManager")?;
        self.access = access;
        info!(?manager, "access manager updated");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::AccessManagerUpdated { manager });
        Ok(Outcome::new((), events))
    }

    /// Sweep a stray token balance to the owner, returning the swept amount
    pub fn in_case_tokens_get_stuck(&mut self, caller: Address, token: Address) -> Result<Outcome<UFixed>, LedgerError> {
        self.execute_in_case_tokens_get_stuck(caller, token)
            .inspect_err(|error| log_rejection("inCaseTokensGetStuck", error))
    }

    fn execute_in_case_tokens_get_stuck(&mut self, caller: Address, token: Address) -> Result<Outcome<UFixed>, LedgerError> {
        self.only_owner(caller)?;
        require_non_zero(token, "stuckToken")?;
        if token == self.staked_token {
            return Err(LedgerError::StakedTokenNotSweepable(token));
        }

        let mut assets = self.assets.lock();
        let amount = assets.balance_of(token, self.address);
        if !amount.is_zero() {
            assets.settle(&[Transfer::push(token, self.address, self.owner, amount)])?;
        }
        info!(?token, %amount, "stuck tokens swept");
        Ok(Outcome::silent(amount))
    }

    pub fn pause(&mut self, caller: Address) -> Result<Outcome<()>, LedgerError> {
        self.execute_pause(caller)
            .inspect_err(|error| log_rejection("pause", error))
    }

    fn execute_pause(&mut self, caller: Address) -> Result<Outcome<()>, LedgerError> {
        self.only_owner(caller)?;
        self.when_not_paused()?;
        self.paused = true;
        info!("vault paused");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::Paused { account: caller });
        Ok(Outcome::new((), events))
    }

    pub fn unpause(&mut self, caller: Address) -> Result<Outcome<()>, LedgerError> {
        self.execute_unpause(caller)
            .inspect_err(|error| log_rejection("unpause", error))
    }

    fn execute_unpause(&mut self, caller: Address) -> Result<Outcome<()>, LedgerError> {
        self.only_owner(caller)?;
        if !self.paused {
            return Err(LedgerError::NotPaused);
        }
        self.paused = false;
        info!("vault unpaused");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::Unpaused { account: caller });
        Ok(Outcome::new((), events))
    }

    // HELPERS

    fn only_owner(&self, caller: Address) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized {
                caller,
                role: Role::Owner,
            });
        }
        Ok(())
    }

    fn when_not_paused(&self) -> Result<(), LedgerError> {
        if self.paused {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    fn check_burnable(&self, holder: Address, shares: UFixed) -> Result<(), LedgerError> {
        if shares.is_zero() {
            return Err(LedgerError::SharesZero);
        }
        let available = self.share_balance_of(holder);
        if shares > available {
            return Err(LedgerError::InsufficientShares {
                requested: shares,
                available,
            });
        }
        Ok(())
    }

    /// Send `amount - fee` to `user` and `fee` to the treasury in one batch
    fn pay_out(
        &self,
        assets: &mut dyn AssetTransfer,
        user: Address,
        amount: UFixed,
        fee: UFixed,
    ) -> Result<(), LedgerError> {
        let net = amount.checked_sub(fee)?;
        let mut transfers = Vec::with_capacity(2);
        if !fee.is_zero() {
            transfers.push(Transfer::push(self.staked_token, self.address, self.treasury, fee));
        }
        transfers.push(Transfer::push(self.staked_token, self.address, user, net));
        assets.settle(&transfers)
    }

    fn mint(&mut self, holder: Address, shares: UFixed) -> Result<(), LedgerError> {
        let total = self.total_shares.checked_add(shares)?;
        let balance = self.share_balance_of(holder).checked_add(shares)?;
        self.total_shares = total;
        self.shares.insert(holder, balance);
        Ok(())
    }

    fn burn(&mut self, holder: Address, shares: UFixed) -> Result<(), LedgerError> {
        let total = self.total_shares.checked_sub(shares)?;
        let balance = self.share_balance_of(holder).checked_sub(shares)?;
        self.total_shares = total;
        self.shares.insert(holder, balance);
        Ok(())
    }
}
