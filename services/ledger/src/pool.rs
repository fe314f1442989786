//! Pool Ledger
//!
//! Registry of tradable base tokens and the swap engine that prices them
//! against the single quote token. Balances are never cached: `pool_size`
//! always reads the asset ledger, so it reflects the on-hand amount.
//!
//! Every mutating operation holds the asset-ledger lock from its first read
//! to its settlement, and touches ledger state only after settlement.

use crate::{log_rejection, record, SharedAssets};
use amm::{
    AccessControl, AssetTransfer, OracleAdapter, PmmMath, PriceOracle, PricingParams,
    ReferenceOracle, RewardManager, Transfer,
};
use ledger_config::pool::{MAX_COEFFICIENT_R, MAX_LP_FEE_RATE, MAX_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use types::{
    require_non_zero, Address, LedgerError, LedgerEvent, LiquiditySide, Outcome, Parameter, Role,
    SlippageKind, UFixed,
};

/// Registration and trading parameters of one base token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenInfo {
    pub is_valid: bool,
    pub threshold: UFixed,
    pub lp_fee_rate: UFixed,
    pub coefficient_r: UFixed,
    pub ref_oracle: Option<Address>,
}

impl TokenInfo {
    fn pricing(&self) -> PricingParams {
        PricingParams {
            threshold: self.threshold,
            lp_fee_rate: self.lp_fee_rate,
            coefficient_r: self.coefficient_r,
        }
    }
}

/// Construction arguments for [`PoolLedger`]
pub struct PoolSetup {
    /// The pool's own account in the asset ledger
    pub address: Address,
    pub owner: Address,
    pub quote_token: Address,
    pub oracle: Arc<dyn PriceOracle>,
    pub access: Arc<dyn AccessControl>,
    pub assets: SharedAssets,
}

/// Oracle-priced swap pool
pub struct PoolLedger {
    address: Address,
    owner: Address,
    quote_token: Address,
    oracle: OracleAdapter,
    access: Arc<dyn AccessControl>,
    assets: SharedAssets,
    reward_manager: Option<Arc<dyn RewardManager>>,
    tokens: HashMap<Address, TokenInfo>,
    pairs_info: String,
}

impl PoolLedger {
    pub fn new(setup: PoolSetup) -> Result<Self, LedgerError> {
        require_non_zero(setup.address, "pool")?;
        require_non_zero(setup.owner, "owner")?;
        require_non_zero(setup.quote_token, "quoteToken")?;
        require_non_zero(setup.oracle.address(), "wooracle")?;

        info!(
            pool = ?setup.address,
            quote_token = ?setup.quote_token,
            "pool ledger created"
        );
        Ok(Self {
            address: setup.address,
            owner: setup.owner,
            quote_token: setup.quote_token,
            oracle: OracleAdapter::new(setup.oracle),
            access: setup.access,
            assets: setup.assets,
            reward_manager: None,
            tokens: HashMap::new(),
            pairs_info: String::new(),
        })
    }

    /// Check oracle prices against reference feeds within `bound`
    pub fn with_reference_oracle(mut self, reference: Arc<dyn ReferenceOracle>, bound: UFixed) -> Self {
        self.oracle = self.oracle.with_reference(reference, bound);
        self
    }

    // ACCESSORS

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn quote_token(&self) -> Address {
        self.quote_token
    }

    pub fn wooracle(&self) -> Address {
        self.oracle.address()
    }

    pub fn reward_manager(&self) -> Option<Address> {
        self.reward_manager.as_ref().map(|manager| manager.address())
    }

    pub fn pairs_info(&self) -> &str {
        &self.pairs_info
    }

    pub fn is_strategist(&self, account: Address) -> bool {
        self.access.is_strategist(account)
    }

    /// Stored parameters; unregistered tokens read as all-zero and invalid
    pub fn token_info(&self, token: Address) -> TokenInfo {
        self.tokens.get(&token).copied().unwrap_or_default()
    }

    /// Current on-hand balance of `token`
    pub fn pool_size(&self, token: Address) -> UFixed {
        self.assets.lock().balance_of(token, self.address)
    }

    // ADMINISTRATION

    fn only_owner(&self, caller: Address) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized {
                caller,
                role: Role::Owner,
            });
        }
        Ok(())
    }

    fn only_strategist(&self, caller: Address) -> Result<(), LedgerError> {
        if caller != self.owner && !self.access.is_strategist(caller) {
            return Err(LedgerError::Unauthorized {
                caller,
                role: Role::Strategist,
            });
        }
        Ok(())
    }

    pub fn set_strategist(
        &mut self,
        caller: Address,
        strategist: Address,
        flag: bool,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_set_strategist(caller, strategist, flag)
            .inspect_err(|error| log_rejection("setStrategist", error))
    }

    fn execute_set_strategist(
        &mut self,
        caller: Address,
        strategist: Address,
        flag: bool,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_owner(caller)?;
        require_non_zero(strategist, "strategist")?;

        self.access.set_strategist(caller, strategist, flag)?;
        info!(?strategist, flag, "strategist updated");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::StrategistUpdated { strategist, flag });
        Ok(Outcome::new((), events))
    }

    pub fn set_wooracle(
        &mut self,
        caller: Address,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_set_wooracle(caller, oracle)
            .inspect_err(|error| log_rejection("setWooracle", error))
    }

    fn execute_set_wooracle(
        &mut self,
        caller: Address,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_strategist(caller)?;
        let address = require_non_zero(oracle.address(), "newWooracle")?;

        self.oracle.replace_oracle(oracle);
        info!(oracle = ?address, "oracle updated");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::WooracleUpdated { oracle: address });
        Ok(Outcome::new((), events))
    }

    pub fn set_reward_manager(
        &mut self,
        caller: Address,
        manager: Arc<dyn RewardManager>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_set_reward_manager(caller, manager)
            .inspect_err(|error| log_rejection("setRewardManager", error))
    }

    fn execute_set_reward_manager(
        &mut self,
        caller: Address,
        manager: Arc<dyn RewardManager>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_strategist(caller)?;
        let address = require_non_zero(manager.address(), "newRewardManager")?;

        self.reward_manager = Some(manager);
        info!(manager = ?address, "reward manager updated");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::RewardManagerUpdated { manager: address });
        Ok(Outcome::new((), events))
    }

    pub fn set_chainlink_ref_oracle(
        &mut self,
        caller: Address,
        token: Address,
        ref_oracle: Option<Address>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_set_chainlink_ref_oracle(caller, token, ref_oracle)
            .inspect_err(|error| log_rejection("setChainlinkRefOracle", error))
    }

    fn execute_set_chainlink_ref_oracle(
        &mut self,
        caller: Address,
        token: Address,
        ref_oracle: Option<Address>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_strategist(caller)?;
        require_non_zero(token, "token")?;
        let info = self.active_token_mut(token)?;

        info.ref_oracle = ref_oracle;
        info!(?token, ?ref_oracle, "reference oracle updated");

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::ChainlinkRefOracleUpdated { token, ref_oracle },
        );
        Ok(Outcome::new((), events))
    }

    pub fn set_pairs_info(&mut self, caller: Address, pairs_info: impl Into<String>) -> Result<(), LedgerError> {
        self.execute_set_pairs_info(caller, pairs_info)
            .inspect_err(|error| log_rejection("setPairsInfo", error))
    }

    fn execute_set_pairs_info(&mut self, caller: Address, pairs_info: impl Into<String>) -> Result<(), LedgerError> {
        self.only_strategist(caller)?;
        self.pairs_info = pairs_info.into();
        Ok(())
    }

    /// Register `token` for trading
    pub fn add_base_token(
        &mut self,
        caller: Address,
        token: Address,
        threshold: UFixed,
        lp_fee_rate: UFixed,
        coefficient_r: UFixed,
        ref_oracle: Option<Address>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_add_base_token(caller, token, threshold, lp_fee_rate, coefficient_r, ref_oracle)
            .inspect_err(|error| log_rejection("addBaseToken", error))
    }

    fn execute_add_base_token(
        &mut self,
        caller: Address,
        token: Address,
        threshold: UFixed,
        lp_fee_rate: UFixed,
        coefficient_r: UFixed,
        ref_oracle: Option<Address>,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_strategist(caller)?;
        require_non_zero(token, "baseToken")?;
        if token == self.quote_token {
            return Err(LedgerError::BaseTokenInvalid(token));
        }
        let params = Self::checked_params(threshold, lp_fee_rate, coefficient_r)?;
        if self.token_info(token).is_valid {
            return Err(LedgerError::TokenAlreadyExists(token));
        }

        self.tokens.insert(
            token,
            TokenInfo {
                is_valid: true,
                threshold: params.threshold,
                lp_fee_rate: params.lp_fee_rate,
                coefficient_r: params.coefficient_r,
                ref_oracle,
            },
        );
        info!(?token, %threshold, %lp_fee_rate, %coefficient_r, "base token added");

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::ParametersUpdated {
                token,
                threshold,
                lp_fee_rate,
                coefficient_r,
            },
        );
        record(
            &mut events,
            LedgerEvent::ChainlinkRefOracleUpdated { token, ref_oracle },
        );
        Ok(Outcome::new((), events))
    }

    /// Deactivate `token`; the entry stays behind, zeroed
    pub fn remove_base_token(&mut self, caller: Address, token: Address) -> Result<Outcome<()>, LedgerError> {
        self.execute_remove_base_token(caller, token)
            .inspect_err(|error| log_rejection("removeBaseToken", error))
    }

    fn execute_remove_base_token(&mut self, caller: Address, token: Address) -> Result<Outcome<()>, LedgerError> {
        self.only_strategist(caller)?;
        require_non_zero(token, "baseToken")?;
        let info = self.active_token_mut(token)?;

        *info = TokenInfo::default();
        info!(?token, "base token removed");

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::ParametersUpdated {
                token,
                threshold: UFixed::ZERO,
                lp_fee_rate: UFixed::ZERO,
                coefficient_r: UFixed::ZERO,
            },
        );
        record(
            &mut events,
            LedgerEvent::ChainlinkRefOracleUpdated {
                token,
                ref_oracle: None,
            },
        );
        Ok(Outcome::new((), events))
    }

    /// Overwrite trading parameters, leaving the reference feed untouched
    pub fn tune_parameters(
        &mut self,
        caller: Address,
        token: Address,
        threshold: UFixed,
        lp_fee_rate: UFixed,
        coefficient_r: UFixed,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_tune_parameters(caller, token, threshold, lp_fee_rate, coefficient_r)
            .inspect_err(|error| log_rejection("tuneParameters", error))
    }

    fn execute_tune_parameters(
        &mut self,
        caller: Address,
        token: Address,
        threshold: UFixed,
        lp_fee_rate: UFixed,
        coefficient_r: UFixed,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_strategist(caller)?;
        require_non_zero(token, "token")?;
        self.active_token(token)?;
        let params = Self::checked_params(threshold, lp_fee_rate, coefficient_r)?;

        let info = self.active_token_mut(token)?;
        info.threshold = params.threshold;
        info.lp_fee_rate = params.lp_fee_rate;
        info.coefficient_r = params.coefficient_r;
        info!(?token, %threshold, %lp_fee_rate, %coefficient_r, "parameters tuned");

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::ParametersUpdated {
                token,
                threshold,
                lp_fee_rate,
                coefficient_r,
            },
        );
        Ok(Outcome::new((), events))
    }

    /// Owner-only raw transfer of pool funds to `to`
    pub fn withdraw(
        &mut self,
        caller: Address,
        token: Address,
        to: Address,
        amount: UFixed,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_withdraw(caller, token, to, amount)
            .inspect_err(|error| log_rejection("withdraw", error))
    }

    fn execute_withdraw(
        &mut self,
        caller: Address,
        token: Address,
        to: Address,
        amount: UFixed,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_owner(caller)?;
        require_non_zero(token, "token")?;
        require_non_zero(to, "to")?;
        self.transfer_out(token, to, amount)
    }

    /// Strategist transfer of pool funds to the owner
    pub fn withdraw_to_owner(
        &mut self,
        caller: Address,
        token: Address,
        amount: UFixed,
    ) -> Result<Outcome<()>, LedgerError> {
        self.execute_withdraw_to_owner(caller, token, amount)
            .inspect_err(|error| log_rejection("withdrawToOwner", error))
    }

    fn execute_withdraw_to_owner(
        &mut self,
        caller: Address,
        token: Address,
        amount: UFixed,
    ) -> Result<Outcome<()>, LedgerError> {
        self.only_strategist(caller)?;
        require_non_zero(token, "token")?;
        self.transfer_out(token, self.owner, amount)
    }

    fn transfer_out(&self, token: Address, to: Address, amount: UFixed) -> Result<Outcome<()>, LedgerError> {
        self.assets
            .lock()
            .settle(&[Transfer::push(token, self.address, to, amount)])?;
        info!(?token, ?to, %amount, "pool withdraw");

        let mut events = Vec::new();
        record(&mut events, LedgerEvent::PoolWithdraw { token, to, amount });
        Ok(Outcome::new((), events))
    }

    // QUOTES

    /// Quote for selling `base_amount` of `token`
    pub fn query_sell_base(&self, token: Address, base_amount: UFixed) -> Result<UFixed, LedgerError> {
        self.evaluate_sell_base(token, base_amount)
            .inspect_err(|error| log_rejection("querySellBase", error))
    }

    fn evaluate_sell_base(&self, token: Address, base_amount: UFixed) -> Result<UFixed, LedgerError> {
        require_non_zero(token, "baseToken")?;
        let assets = self.assets.lock();
        self.quote_sell_base(&*assets, token, base_amount)
    }

    /// Base received for selling `quote_amount` into `token`
    pub fn query_sell_quote(&self, token: Address, quote_amount: UFixed) -> Result<UFixed, LedgerError> {
        self.evaluate_sell_quote(token, quote_amount)
            .inspect_err(|error| log_rejection("querySellQuote", error))
    }

    fn evaluate_sell_quote(&self, token: Address, quote_amount: UFixed) -> Result<UFixed, LedgerError> {
        require_non_zero(token, "baseToken")?;
        let assets = self.assets.lock();
        self.quote_sell_quote(&*assets, token, quote_amount)
    }

    fn quote_sell_base(
        &self,
        assets: &dyn AssetTransfer,
        token: Address,
        base_amount: UFixed,
    ) -> Result<UFixed, LedgerError> {
        let info = self.active_token(token)?;
        let state = self.oracle.state(token, info.ref_oracle)?;
        let quote_reserve = assets.balance_of(self.quote_token, self.address);

        let quote_amount = PmmMath::sell_base(base_amount, &state, &info.pricing(), quote_reserve)?;
        if quote_amount > quote_reserve {
            return Err(LedgerError::InsufficientLiquidity {
                side: LiquiditySide::Quote,
                requested: quote_amount,
                available: quote_reserve,
            });
        }
        debug!(?token, %base_amount, %quote_amount, "sell base quote");
        Ok(quote_amount)
    }

    fn quote_sell_quote(
        &self,
        assets: &dyn AssetTransfer,
        token: Address,
        quote_amount: UFixed,
    ) -> Result<UFixed, LedgerError> {
        let info = self.active_token(token)?;
        let state = self.oracle.state(token, info.ref_oracle)?;
        let base_reserve = assets.balance_of(token, self.address);

        let base_amount = PmmMath::sell_quote(quote_amount, &state, &info.pricing(), base_reserve)?;
        if base_amount > base_reserve {
            return Err(LedgerError::InsufficientLiquidity {
                side: LiquiditySide::Base,
                requested: base_amount,
                available: base_reserve,
            });
        }
        debug!(?token, %quote_amount, %base_amount, "sell quote quote");
        Ok(base_amount)
    }

    // SWAPS

    /// Sell `base_amount` of `token` pulled from `from`; quote goes to `to`
    pub fn sell_base(
        &mut self,
        token: Address,
        base_amount: UFixed,
        min_quote_amount: UFixed,
        from: Address,
        to: Address,
        rebate_to: Option<Address>,
    ) -> Result<Outcome<UFixed>, LedgerError> {
        self.execute_sell_base(token, base_amount, min_quote_amount, from, to, rebate_to)
            .inspect_err(|error| log_rejection("sellBase", error))
    }

    /// Sell `quote_amount` of the quote token pulled from `from`; `token` goes to `to`
    pub fn sell_quote(
        &mut self,
        token: Address,
        quote_amount: UFixed,
        min_base_amount: UFixed,
        from: Address,
        to: Address,
        rebate_to: Option<Address>,
    ) -> Result<Outcome<UFixed>, LedgerError> {
        self.execute_sell_quote(token, quote_amount, min_base_amount, from, to, rebate_to)
            .inspect_err(|error| log_rejection("sellQuote", error))
    }

    fn execute_sell_base(
        &mut self,
        token: Address,
        base_amount: UFixed,
        min_quote_amount: UFixed,
        from: Address,
        to: Address,
        rebate_to: Option<Address>,
    ) -> Result<Outcome<UFixed>, LedgerError> {
        require_non_zero(token, "baseToken")?;
        require_non_zero(from, "from")?;
        require_non_zero(to, "to")?;

        let mut assets = self.assets.lock();
        let quote_amount = self.quote_sell_base(&*assets, token, base_amount)?;
        if quote_amount < min_quote_amount {
            return Err(LedgerError::SlippageExceeded {
                kind: SlippageKind::MinQuote,
                output: quote_amount,
                minimum: min_quote_amount,
            });
        }

        let transfers = [
            Transfer::pull(token, from, self.address, base_amount, self.address),
            Transfer::push(self.quote_token, self.address, to, quote_amount),
        ];
        assets.check(&transfers)?;
        self.rebate(rebate_to, quote_amount)?;
        assets.settle(&transfers)?;
        drop(assets);

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::WooSwap {
                token_in: token,
                token_out: self.quote_token,
                amount_in: base_amount,
                amount_out: quote_amount,
                from,
                to,
            },
        );
        Ok(Outcome::new(quote_amount, events))
    }

    fn execute_sell_quote(
        &mut self,
        token: Address,
        quote_amount: UFixed,
        min_base_amount: UFixed,
        from: Address,
        to: Address,
        rebate_to: Option<Address>,
    ) -> Result<Outcome<UFixed>, LedgerError> {
        require_non_zero(token, "baseToken")?;
        require_non_zero(from, "from")?;
        require_non_zero(to, "to")?;

        let mut assets = self.assets.lock();
        let base_amount = self.quote_sell_quote(&*assets, token, quote_amount)?;
        if base_amount < min_base_amount {
            return Err(LedgerError::SlippageExceeded {
                kind: SlippageKind::PriceExceedsLimit,
                output: base_amount,
                minimum: min_base_amount,
            });
        }

        let transfers = [
            Transfer::pull(self.quote_token, from, self.address, quote_amount, self.address),
            Transfer::push(token, self.address, to, base_amount),
        ];
        assets.check(&transfers)?;
        self.rebate(rebate_to, quote_amount)?;
        assets.settle(&transfers)?;
        drop(assets);

        let mut events = Vec::new();
        record(
            &mut events,
            LedgerEvent::WooSwap {
                token_in: self.quote_token,
                token_out: token,
                amount_in: quote_amount,
                amount_out: base_amount,
                from,
                to,
            },
        );
        Ok(Outcome::new(base_amount, events))
    }

    /// Credit the swap's quote volume to `rebate_to`
    ///
    /// Runs after the settlement batch has been checked and before it is
    /// applied, so a rejected reward leaves every balance untouched.
    fn rebate(&self, rebate_to: Option<Address>, quote_volume: UFixed) -> Result<(), LedgerError> {
        let (Some(user), Some(manager)) = (rebate_to, self.reward_manager.as_ref()) else {
            return Ok(());
        };
        if user.is_zero() {
            return Ok(());
        }
        manager.add_reward(user, quote_volume)?;
        debug!(?user, %quote_volume, "rebate recorded");
        Ok(())
    }

    // HELPERS

    fn active_token(&self, token: Address) -> Result<TokenInfo, LedgerError> {
        self.tokens
            .get(&token)
            .filter(|info| info.is_valid)
            .copied()
            .ok_or(LedgerError::TokenNotFound(token))
    }

    fn active_token_mut(&mut self, token: Address) -> Result<&mut TokenInfo, LedgerError> {
        self.tokens
            .get_mut(&token)
            .filter(|info| info.is_valid)
            .ok_or(LedgerError::TokenNotFound(token))
    }

    fn checked_params(
        threshold: UFixed,
        lp_fee_rate: UFixed,
        coefficient_r: UFixed,
    ) -> Result<PricingParams, LedgerError> {
        Ok(PricingParams {
            threshold: LedgerError::check_range(Parameter::Threshold, threshold, MAX_THRESHOLD)?,
            lp_fee_rate: LedgerError::check_range(Parameter::LpFeeRate, lp_fee_rate, MAX_LP_FEE_RATE)?,
            coefficient_r: LedgerError::check_range(
                Parameter::CoefficientR,
                coefficient_r,
                MAX_COEFFICIENT_R,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessManager;
    use crate::assets::{share, TokenLedger};
    use amm::StaticOracle;
    use types::address_from_index;

    const OWNER: u64 = 1;
    const POOL: u64 = 2;
    const USDT: u64 = 3;
    const BTC: u64 = 4;
    const ORACLE: u64 = 5;
    const STRATEGIST: u64 = 6;

    fn addr(index: u64) -> Address {
        address_from_index(index)
    }

    fn pool() -> PoolLedger {
        let ledger = TokenLedger::new().into_shared();
        let oracle = Arc::new(StaticOracle::new(addr(ORACLE)));
        oracle.set_state(
            addr(BTC),
            UFixed::from_units(50_000),
            UFixed::from_ratio(1, 10_000).unwrap(),
            UFixed::from_decimal_str("0.000000002").unwrap(),
        );
        PoolLedger::new(PoolSetup {
            address: addr(POOL),
            owner: addr(OWNER),
            quote_token: addr(USDT),
            oracle,
            access: Arc::new(AccessManager::new(addr(40), addr(OWNER))),
            assets: share(&ledger),
        })
        .unwrap()
    }

    #[test]
    fn test_zero_quote_token_rejected() {
        let ledger = TokenLedger::new().into_shared();
        let result = PoolLedger::new(PoolSetup {
            address: addr(POOL),
            owner: addr(OWNER),
            quote_token: Address::zero(),
            oracle: Arc::new(StaticOracle::new(addr(ORACLE))),
            access: Arc::new(AccessManager::new(addr(40), addr(OWNER))),
            assets: share(&ledger),
        });
        assert!(matches!(
            result,
            Err(LedgerError::ZeroAddress { field: "quoteToken" })
        ));
    }

    #[test]
    fn test_unregistered_token_reads_as_invalid() {
        let pool = pool();
        assert_eq!(pool.token_info(addr(BTC)), TokenInfo::default());
        assert_eq!(
            pool.query_sell_base(addr(BTC), UFixed::ONE),
            Err(LedgerError::TokenNotFound(addr(BTC)))
        );
    }

    #[test]
    fn test_strategist_can_administer() {
        let mut pool = pool();
        let strategist = addr(STRATEGIST);
        assert!(matches!(
            pool.add_base_token(strategist, addr(BTC), UFixed::ZERO, UFixed::ZERO, UFixed::ZERO, None),
            Err(LedgerError::Unauthorized {
                role: Role::Strategist,
                ..
            })
        ));

        pool.set_strategist(addr(OWNER), strategist, true).unwrap();
        assert!(pool.is_strategist(strategist));
        pool.add_base_token(strategist, addr(BTC), UFixed::ZERO, UFixed::ZERO, UFixed::ZERO, None)
            .unwrap();
        assert!(pool.token_info(addr(BTC)).is_valid);
    }

    #[test]
    fn test_set_strategist_is_owner_only() {
        let mut pool = pool();
        pool.set_strategist(addr(OWNER), addr(STRATEGIST), true).unwrap();
        assert_eq!(
            pool.set_strategist(addr(STRATEGIST), addr(7), true),
            Err(LedgerError::Unauthorized {
                caller: addr(STRATEGIST),
                role: Role::Owner
            })
        );
    }

    #[test]
    fn test_authorization_precedes_validation() {
        let mut pool = pool();
        assert!(matches!(
            pool.remove_base_token(addr(99), Address::zero()),
            Err(LedgerError::Unauthorized { .. })
        ));
    }
}
