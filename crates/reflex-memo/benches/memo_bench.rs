//! Benchmarks for memoized vs raw recursive computation and key production.
//!
//! Run with: cargo bench -p reflex-memo -- fib

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use reflex_memo::{CacheKey, Memo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn raw_fib(n: u64) -> u64 {
    if n < 2 { n } else { raw_fib(n - 1) + raw_fib(n - 2) }
}

fn memo_fib() -> Memo<u64, u64> {
    Memo::recursive(|fib, n: &u64| {
        if *n < 2 {
            *n
        } else {
            fib.call(&(n - 1)).unwrap() + fib.call(&(n - 2)).unwrap()
        }
    })
}

// ---------------------------------------------------------------------------
// 1. Recursive Fibonacci: raw vs memoized
// ---------------------------------------------------------------------------

fn bench_fib(c: &mut Criterion) {
    let mut group = c.benchmark_group("memo/fib");

    for n in [15u64, 20, 25] {
        group.bench_with_input(BenchmarkId::new("raw", n), &n, |b, &n| {
            b.iter(|| black_box(raw_fib(black_box(n))));
        });

        // Fresh cache per iteration: measures the memoized cold path.
        group.bench_with_input(BenchmarkId::new("memoized_cold", n), &n, |b, &n| {
            b.iter(|| {
                let fib = memo_fib();
                black_box(fib.call(&n).unwrap())
            });
        });

        // Warm cache: every call is a single lookup.
        group.bench_with_input(BenchmarkId::new("memoized_warm", n), &n, |b, &n| {
            let fib = memo_fib();
            let _ = fib.call(&n).unwrap();
            b.iter(|| black_box(fib.call(&n).unwrap()));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// 2. Canonical key production
// ---------------------------------------------------------------------------

fn bench_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("memo/key");

    group.bench_function("scalar", |b| {
        b.iter(|| CacheKey::for_args(black_box(&42u64)).unwrap());
    });

    group.bench_function("tuple", |b| {
        let args = (42u64, "query", true);
        b.iter(|| CacheKey::for_args(black_box(&args)).unwrap());
    });

    group.bench_function("nested", |b| {
        let args = vec![(1u32, vec!["a"; 8]); 8];
        b.iter(|| CacheKey::for_args(black_box(&args)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_fib, bench_key);
criterion_main!(benches);
