//! Pool swap integration tests
//!
//! Covers quoting, settlement, slippage guards, liquidity limits, oracle
//! failures and the rebate hook against a funded in-memory pool.

mod common;

use amm::RewardManager;
use common::*;
use rust_decimal_macros::dec;
use std::sync::Arc;
use types::{Address, LedgerError, LedgerEvent, LiquiditySide, SlippageKind, UFixed};

/// Reward sink that rejects every rebate
struct RejectingRewards;

impl RewardManager for RejectingRewards {
    fn address(&self) -> Address {
        addr(77)
    }

    fn add_reward(&self, _user: Address, _amount: UFixed) -> Result<(), LedgerError> {
        Err(LedgerError::AmountZero)
    }
}

#[test]
fn test_query_sell_one_btc_near_oracle_price() {
    let fixture = PoolFixture::new();

    let quote = fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).unwrap();

    assert!(quote >= units(49_950), "quote {} below 0.1% band", quote);
    let deviation = (quote.to_decimal().unwrap() - dec!(50000)).abs();
    assert!(deviation <= dec!(10), "quote {} deviates by {}", quote, deviation);
    // Selling pays the bid, never more than the oracle price
    assert!(quote < units(50_000));
}

#[test]
fn test_query_sell_quote_near_one_btc() {
    let fixture = PoolFixture::new();

    let base = fixture
        .pool
        .query_sell_quote(addr(BTC), units(50_000))
        .unwrap();

    assert!(base < UFixed::ONE);
    assert!(base > fixed("0.9998"));
}

#[test]
fn test_queries_do_not_mutate() {
    let fixture = PoolFixture::new();
    let before = (fixture.pool.pool_size(addr(BTC)), fixture.pool.pool_size(addr(USDT)));

    fixture.pool.query_sell_base(addr(BTC), units(3)).unwrap();
    fixture.pool.query_sell_quote(addr(BTC), units(70_000)).unwrap();

    let after = (fixture.pool.pool_size(addr(BTC)), fixture.pool.pool_size(addr(USDT)));
    assert_eq!(before, after);
}

#[test]
fn test_sell_base_conserves_balances() {
    let mut fixture = PoolFixture::new();
    let quote_quoted = fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).unwrap();
    let pool_base = fixture.pool.pool_size(addr(BTC));
    let pool_quote = fixture.pool.pool_size(addr(USDT));
    let alice_quote = fixture.balance(USDT, ALICE);

    let outcome = fixture
        .pool
        .sell_base(
            addr(BTC),
            UFixed::ONE,
            units(49_950),
            addr(ALICE),
            addr(BOB),
            None,
        )
        .unwrap();

    let quote_amount = outcome.value;
    assert_eq!(quote_amount, quote_quoted);
    assert_eq!(
        fixture.pool.pool_size(addr(BTC)),
        pool_base.checked_add(UFixed::ONE).unwrap()
    );
    assert_eq!(
        fixture.pool.pool_size(addr(USDT)),
        pool_quote.checked_sub(quote_amount).unwrap()
    );
    assert_eq!(fixture.balance(BTC, ALICE), units(9));
    assert_eq!(fixture.balance(USDT, ALICE), alice_quote);
    assert_eq!(fixture.balance(USDT, BOB), quote_amount);

    assert_eq!(
        outcome.events,
        vec![LedgerEvent::WooSwap {
            token_in: addr(BTC),
            token_out: addr(USDT),
            amount_in: UFixed::ONE,
            amount_out: quote_amount,
            from: addr(ALICE),
            to: addr(BOB),
        }]
    );
}

#[test]
fn test_sell_quote_conserves_balances() {
    let mut fixture = PoolFixture::new();
    let pool_base = fixture.pool.pool_size(addr(BTC));
    let pool_quote = fixture.pool.pool_size(addr(USDT));

    let outcome = fixture
        .pool
        .sell_quote(
            addr(BTC),
            units(100_000),
            fixed("1.99"),
            addr(ALICE),
            addr(ALICE),
            None,
        )
        .unwrap();

    let base_amount = outcome.value;
    assert_eq!(
        fixture.pool.pool_size(addr(USDT)),
        pool_quote.checked_add(units(100_000)).unwrap()
    );
    assert_eq!(
        fixture.pool.pool_size(addr(BTC)),
        pool_base.checked_sub(base_amount).unwrap()
    );
    assert_eq!(
        fixture.balance(BTC, ALICE),
        units(10).checked_add(base_amount).unwrap()
    );
    assert!(matches!(
        outcome.events.as_slice(),
        [LedgerEvent::WooSwap { token_in, token_out, .. }]
            if *token_in == addr(USDT) && *token_out == addr(BTC)
    ));
}

#[test]
fn test_sell_base_below_minimum_rejected_without_state_change() {
    let mut fixture = PoolFixture::new();
    let quote = fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).unwrap();

    let result = fixture.pool.sell_base(
        addr(BTC),
        UFixed::ONE,
        units(50_001),
        addr(ALICE),
        addr(ALICE),
        Some(addr(ALICE)),
    );

    assert_eq!(
        result,
        Err(LedgerError::SlippageExceeded {
            kind: SlippageKind::MinQuote,
            output: quote,
            minimum: units(50_001),
        })
    );
    assert_eq!(fixture.balance(BTC, ALICE), units(10));
    assert_eq!(fixture.pool.pool_size(addr(BTC)), units(100));
    assert_eq!(fixture.rewards.volume_of(addr(ALICE)), UFixed::ZERO);
}

#[test]
fn test_sell_quote_below_minimum_rejected() {
    let mut fixture = PoolFixture::new();

    let result = fixture.pool.sell_quote(
        addr(BTC),
        units(50_000),
        UFixed::ONE,
        addr(ALICE),
        addr(ALICE),
        None,
    );

    assert!(matches!(
        result,
        Err(LedgerError::SlippageExceeded {
            kind: SlippageKind::PriceExceedsLimit,
            ..
        })
    ));
    assert_eq!(fixture.pool.pool_size(addr(USDT)), units(10_000_000));
}

#[test]
fn test_sell_base_beyond_quote_reserve() {
    let fixture = PoolFixture::new();

    // 1,000 BTC at ~50k needs ~50M USDT; the pool holds 10M
    let result = fixture.pool.query_sell_base(addr(BTC), units(1_000));

    assert!(matches!(
        result,
        Err(LedgerError::InsufficientLiquidity {
            side: LiquiditySide::Quote,
            available,
            ..
        }) if available == units(10_000_000)
    ));
}

#[test]
fn test_sell_quote_beyond_base_reserve() {
    let mut fixture = PoolFixture::new();
    fixture
        .tokens
        .lock()
        .mint(addr(USDT), addr(ALICE), units(10_000_000))
        .unwrap();

    let result = fixture.pool.sell_quote(
        addr(BTC),
        units(10_000_000),
        UFixed::ZERO,
        addr(ALICE),
        addr(ALICE),
        None,
    );

    assert!(matches!(
        result,
        Err(LedgerError::InsufficientLiquidity {
            side: LiquiditySide::Base,
            available,
            ..
        }) if available == units(100)
    ));
    assert_eq!(fixture.balance(USDT, ALICE), units(11_000_000));
}

#[test]
fn test_unapproved_seller_rejected() {
    let mut fixture = PoolFixture::new();

    let result = fixture.pool.sell_base(
        addr(BTC),
        UFixed::ONE,
        UFixed::ZERO,
        addr(CAROL),
        addr(CAROL),
        None,
    );

    assert!(matches!(
        result,
        Err(LedgerError::InsufficientAllowance { .. })
    ));
    assert_eq!(fixture.balance(BTC, CAROL), units(10));
    assert_eq!(fixture.pool.pool_size(addr(USDT)), units(10_000_000));
}

#[test]
fn test_zero_addresses_rejected_in_order() {
    let mut fixture = PoolFixture::new();

    assert_eq!(
        fixture.pool.sell_base(
            Address::zero(),
            UFixed::ONE,
            UFixed::ZERO,
            Address::zero(),
            Address::zero(),
            None,
        ),
        Err(LedgerError::ZeroAddress { field: "baseToken" })
    );
    assert_eq!(
        fixture.pool.sell_base(
            addr(BTC),
            UFixed::ONE,
            UFixed::ZERO,
            Address::zero(),
            Address::zero(),
            None,
        ),
        Err(LedgerError::ZeroAddress { field: "from" })
    );
    assert_eq!(
        fixture.pool.sell_quote(
            addr(BTC),
            UFixed::ONE,
            UFixed::ZERO,
            addr(ALICE),
            Address::zero(),
            None,
        ),
        Err(LedgerError::ZeroAddress { field: "to" })
    );
}

#[test]
fn test_rebate_credits_quote_volume() {
    let mut fixture = PoolFixture::new();

    let sold = fixture
        .pool
        .sell_base(
            addr(BTC),
            UFixed::ONE,
            UFixed::ZERO,
            addr(ALICE),
            addr(ALICE),
            Some(addr(BOB)),
        )
        .unwrap()
        .value;
    assert_eq!(fixture.rewards.volume_of(addr(BOB)), sold);

    fixture
        .pool
        .sell_quote(
            addr(BTC),
            units(20_000),
            UFixed::ZERO,
            addr(ALICE),
            addr(ALICE),
            Some(addr(BOB)),
        )
        .unwrap();
    assert_eq!(
        fixture.rewards.volume_of(addr(BOB)),
        sold.checked_add(units(20_000)).unwrap()
    );
    assert_eq!(fixture.rewards.volume_of(addr(ALICE)), UFixed::ZERO);
}

#[test]
fn test_rebate_without_recipient_is_inert() {
    let mut fixture = PoolFixture::new();

    fixture
        .pool
        .sell_base(
            addr(BTC),
            UFixed::ONE,
            UFixed::ZERO,
            addr(ALICE),
            addr(ALICE),
            None,
        )
        .unwrap();

    assert_eq!(fixture.rewards.volume_of(addr(ALICE)), UFixed::ZERO);
}

#[test]
fn test_rejected_rebate_fails_the_swap() {
    let mut fixture = PoolFixture::new();
    fixture
        .pool
        .set_reward_manager(addr(OWNER), Arc::new(RejectingRewards))
        .unwrap();

    let base_sale = fixture.pool.sell_base(
        addr(BTC),
        UFixed::ONE,
        UFixed::ZERO,
        addr(ALICE),
        addr(ALICE),
        Some(addr(ALICE)),
    );
    assert_eq!(base_sale, Err(LedgerError::AmountZero));

    let quote_sale = fixture.pool.sell_quote(
        addr(BTC),
        units(50_000),
        UFixed::ZERO,
        addr(ALICE),
        addr(ALICE),
        Some(addr(ALICE)),
    );
    assert_eq!(quote_sale, Err(LedgerError::AmountZero));

    assert_eq!(fixture.balance(BTC, ALICE), units(10));
    assert_eq!(fixture.balance(USDT, ALICE), units(1_000_000));
    assert_eq!(fixture.pool.pool_size(addr(BTC)), units(100));
    assert_eq!(fixture.pool.pool_size(addr(USDT)), units(10_000_000));

    // Without a rebate recipient the sink is never consulted
    fixture
        .pool
        .sell_base(addr(BTC), UFixed::ONE, UFixed::ZERO, addr(ALICE), addr(ALICE), None)
        .unwrap();
    assert_eq!(fixture.balance(BTC, ALICE), units(9));
}

#[test]
fn test_failed_settlement_records_no_rebate() {
    let mut fixture = PoolFixture::new();

    let result = fixture.pool.sell_base(
        addr(BTC),
        UFixed::ONE,
        UFixed::ZERO,
        addr(CAROL),
        addr(CAROL),
        Some(addr(CAROL)),
    );

    assert!(matches!(
        result,
        Err(LedgerError::InsufficientAllowance { .. })
    ));
    assert_eq!(fixture.rewards.volume_of(addr(CAROL)), UFixed::ZERO);
    assert_eq!(fixture.balance(BTC, CAROL), units(10));
}

#[test]
fn test_removed_token_cannot_trade() {
    let mut fixture = PoolFixture::new();
    fixture.pool.remove_base_token(addr(OWNER), addr(BTC)).unwrap();

    assert_eq!(
        fixture.pool.query_sell_base(addr(BTC), UFixed::ONE),
        Err(LedgerError::TokenNotFound(addr(BTC)))
    );
    assert_eq!(
        fixture.pool.query_sell_quote(addr(BTC), units(50_000)),
        Err(LedgerError::TokenNotFound(addr(BTC)))
    );
    assert_eq!(
        fixture.pool.sell_base(
            addr(BTC),
            UFixed::ONE,
            UFixed::ZERO,
            addr(ALICE),
            addr(ALICE),
            None,
        ),
        Err(LedgerError::TokenNotFound(addr(BTC)))
    );
    // Other registrations are unaffected
    assert!(fixture.pool.query_sell_base(addr(WOO), units(100)).is_ok());
}

#[test]
fn test_infeasible_oracle_price_fails_swap() {
    let mut fixture = PoolFixture::new();
    fixture.oracle.set_feasible(addr(BTC), false);

    assert_eq!(
        fixture.pool.query_sell_base(addr(BTC), UFixed::ONE),
        Err(LedgerError::PriceUnavailable(addr(BTC)))
    );
    assert_eq!(
        fixture.pool.sell_quote(
            addr(BTC),
            units(1_000),
            UFixed::ZERO,
            addr(ALICE),
            addr(ALICE),
            None,
        ),
        Err(LedgerError::PriceUnavailable(addr(BTC)))
    );
    assert_eq!(fixture.balance(USDT, ALICE), units(1_000_000));

    fixture.oracle.set_feasible(addr(BTC), true);
    assert!(fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).is_ok());
}

#[test]
fn test_reference_feed_deviation_fails_swap() {
    let mut fixture = PoolFixture::new();
    fixture
        .pool
        .set_chainlink_ref_oracle(addr(OWNER), addr(BTC), Some(addr(BTC_FEED)))
        .unwrap();

    // No reading published yet, so the check is skipped
    assert!(fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).is_ok());

    fixture.oracle.set_reference_price(addr(BTC_FEED), units(50_200));
    assert!(fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).is_ok());

    fixture.oracle.set_reference_price(addr(BTC_FEED), units(52_000));
    assert_eq!(
        fixture.pool.query_sell_base(addr(BTC), UFixed::ONE),
        Err(LedgerError::PriceUnreliable {
            token: addr(BTC),
            price: units(50_000),
            reference: units(52_000),
        })
    );
}

#[test]
fn test_threshold_penalty_worsens_price() {
    let mut fixture = PoolFixture::new();
    let plain = fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).unwrap();

    // Quote reserve covers 200 BTC; a 500 BTC threshold with R = 1 doubles k
    fixture
        .pool
        .tune_parameters(addr(OWNER), addr(BTC), units(500), UFixed::ZERO, UFixed::ONE)
        .unwrap();
    let penalised = fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).unwrap();

    assert!(penalised < plain);
}

#[test]
fn test_lp_fee_is_deducted() {
    let mut fixture = PoolFixture::new();
    let plain = fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).unwrap();

    fixture
        .pool
        .tune_parameters(
            addr(OWNER),
            addr(BTC),
            UFixed::ZERO,
            UFixed::from_ratio(1, 1_000).unwrap(),
            UFixed::ZERO,
        )
        .unwrap();
    let with_fee = fixture.pool.query_sell_base(addr(BTC), UFixed::ONE).unwrap();

    let expected = plain.mul_floor(UFixed::from_ratio(999, 1_000).unwrap()).unwrap();
    assert_eq!(with_fee, expected);
}
