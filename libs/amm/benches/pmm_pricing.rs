//! Performance benchmarks for the PMM quote path

use amm::{MarketState, PmmMath, PricingParams};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use types::UFixed;

fn btc_state() -> MarketState {
    MarketState {
        price: UFixed::from_units(50_000),
        spread: UFixed::from_ratio(1, 10_000).unwrap(),
        coefficient: UFixed::from_decimal_str("0.000000002").unwrap(),
    }
}

fn bench_sell_base(c: &mut Criterion) {
    let state = btc_state();
    let params = PricingParams {
        lp_fee_rate: UFixed::from_ratio(1, 1000).unwrap(),
        ..PricingParams::default()
    };
    let reserve = UFixed::from_units(10_000_000);

    let mut group = c.benchmark_group("sell_base");
    for units in [1u64, 10, 100] {
        let amount = UFixed::from_units(units);
        group.bench_with_input(BenchmarkId::from_parameter(units), &amount, |b, amount| {
            b.iter(|| {
                let out = PmmMath::sell_base(
                    criterion::black_box(*amount),
                    &state,
                    &params,
                    reserve,
                );
                criterion::black_box(out)
            })
        });
    }
    group.finish();
}

fn bench_sell_quote(c: &mut Criterion) {
    let state = btc_state();
    let params = PricingParams::default();
    let reserve = UFixed::from_units(100);

    c.bench_function("sell_quote_50k", |b| {
        b.iter(|| {
            let out = PmmMath::sell_quote(
                criterion::black_box(UFixed::from_units(50_000)),
                &state,
                &params,
                reserve,
            );
            criterion::black_box(out)
        })
    });
}

criterion_group!(benches, bench_sell_base, bench_sell_quote);
criterion_main!(benches);
