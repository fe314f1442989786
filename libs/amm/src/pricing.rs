//! Proactive market maker (PMM) pricing anchored on an oracle price
//!
//! Unlike a constant-product curve, the executed price starts from the
//! oracle's bid/ask and degrades with trade size through the oracle's
//! slippage coefficient `k`:
//!
//! ```text
//! sellBase:  N     = base * bid
//!            quote = N / (1 + k'N) * (1 - lpFeeRate)
//! sellQuote: Q     = quote / (1 + k'quote)
//!            base  = Q / ask * (1 - lpFeeRate)
//! ```
//!
//! `k' = k * (1 + R)` once the output-side reserve has fallen below the
//! token's `threshold`, so thin liquidity is priced more defensively.
//! Every rounding step truncates toward zero, in the pool's favour.

use crate::oracle::MarketState;
use types::{MathError, UFixed, U256, U512};

/// Per-token trading parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PricingParams {
    pub threshold: UFixed,
    pub lp_fee_rate: UFixed,
    pub coefficient_r: UFixed,
}

/// PMM math functions
pub struct PmmMath;

impl PmmMath {
    /// Half of the oracle spread, rounded up
    pub fn half_spread(spread: UFixed) -> UFixed {
        let raw = spread.raw();
        let half = raw >> 1;
        if raw.low_u64() & 1 == 0 {
            UFixed::from_raw(half)
        } else {
            UFixed::from_raw(half + U256::one())
        }
    }

    /// `price * (1 - spread/2)`, truncated
    pub fn bid_price(state: &MarketState) -> Result<UFixed, MathError> {
        let factor = UFixed::ONE.saturating_sub(Self::half_spread(state.spread));
        state.price.mul_floor(factor)
    }

    /// `price * (1 + spread/2)`, rounded up
    pub fn ask_price(state: &MarketState) -> Result<UFixed, MathError> {
        let factor = UFixed::ONE.checked_add(Self::half_spread(state.spread))?;
        state.price.mul_ceil(factor)
    }

    /// Slippage coefficient after the low-liquidity penalty
    pub fn effective_coefficient(
        coefficient: UFixed,
        params: &PricingParams,
        output_reserve: UFixed,
    ) -> Result<UFixed, MathError> {
        if output_reserve < params.threshold {
            coefficient.mul_ceil(UFixed::ONE.checked_add(params.coefficient_r)?)
        } else {
            Ok(coefficient)
        }
    }

    /// Quote received for selling `base_amount` of the base token
    ///
    /// `quote_reserve` is the pool's current quote balance; it only selects
    /// the coefficient here, the liquidity guard belongs to the caller.
    pub fn sell_base(
        base_amount: UFixed,
        state: &MarketState,
        params: &PricingParams,
        quote_reserve: UFixed,
    ) -> Result<UFixed, MathError> {
        if base_amount.is_zero() {
            return Ok(UFixed::ZERO);
        }
        let bid = Self::bid_price(state)?;
        let notional = base_amount.mul_floor(bid)?;

        let reserve_in_base = quote_reserve.div_floor(state.price)?;
        let k = Self::effective_coefficient(state.coefficient, params, reserve_in_base)?;

        let gross = Self::apply_impact(notional, k)?;
        Self::deduct_fee(gross, params.lp_fee_rate)
    }

    /// Base received for selling `quote_amount` of the quote token
    pub fn sell_quote(
        quote_amount: UFixed,
        state: &MarketState,
        params: &PricingParams,
        base_reserve: UFixed,
    ) -> Result<UFixed, MathError> {
        if quote_amount.is_zero() {
            return Ok(UFixed::ZERO);
        }
        let k = Self::effective_coefficient(state.coefficient, params, base_reserve)?;
        let effective_quote = Self::apply_impact(quote_amount, k)?;

        let ask = Self::ask_price(state)?;
        let gross = effective_quote.div_floor(ask)?;
        Self::deduct_fee(gross, params.lp_fee_rate)
    }

    /// `amount / (1 + k * amount)` evaluated as one exact rational
    ///
    /// With `C = ONE^2` the raw form is `amount * C / (C + k * amount)`,
    /// which keeps the result monotone in `amount` at the raw-unit level.
    fn apply_impact(amount: UFixed, k: UFixed) -> Result<UFixed, MathError> {
        let one = UFixed::ONE.raw();
        let scale = one.full_mul(one);
        let numerator = U512::from(amount.raw()) * scale;
        let denominator = scale
            .checked_add(k.raw().full_mul(amount.raw()))
            .ok_or(MathError::Overflow)?;
        let quotient = numerator / denominator;
        U256::try_from(quotient)
            .map(UFixed::from_raw)
            .map_err(|_| MathError::Overflow)
    }

    fn deduct_fee(gross: UFixed, lp_fee_rate: UFixed) -> Result<UFixed, MathError> {
        gross.mul_floor(UFixed::ONE.saturating_sub(lp_fee_rate))
    }
}
