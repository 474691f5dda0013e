//! Memoizer comparison benchmarks
//!
//! Each iteration fires a batch of concurrent lookups at a slow function,
//! with keys drawn uniformly or with an 80/20 hot-key skew, and measures how
//! long the batch takes under each coordination strategy.
//!
//! Run with: `cargo bench --bench memo_bench -p flightcache`

use std::convert::Infallible;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flightcache::cache::CacheConfig;
use flightcache::memo::{CachedMemo, FlightMemo, LockedMemo, Memoize, MonitorMemo};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type SharedMemo = Arc<dyn Memoize<u64, u64, Infallible> + Send + Sync>;

const KEY_SPACE: u64 = 10_000;
const BATCH: usize = 64;
const WORK: Duration = Duration::from_micros(200);

/// A slow function to simulate expensive computation
fn slow_func(key: &u64) -> Result<u64, Infallible> {
    thread::sleep(WORK);
    Ok(key.wrapping_mul(31))
}

const MEMOS: [&str; 4] = ["locked", "flight", "monitor", "cached"];

fn build_memo(name: &str) -> SharedMemo {
    match name {
        "locked" => Arc::new(LockedMemo::new(slow_func)),
        "flight" => Arc::new(FlightMemo::new(slow_func)),
        "monitor" => Arc::new(MonitorMemo::new(slow_func).expect("spawn memo coordinator")),
        _ => Arc::new(CachedMemo::new(CacheConfig::lru(KEY_SPACE as usize), slow_func)),
    }
}

fn uniform_keys(rng: &mut StdRng) -> Vec<u64> {
    (0..BATCH).map(|_| rng.gen_range(0..KEY_SPACE)).collect()
}

/// 80% of requests go to the first 20% of keys
fn skewed_keys(rng: &mut StdRng) -> Vec<u64> {
    let hot = KEY_SPACE / 5;
    (0..BATCH)
        .map(|_| if rng.gen_bool(0.8) { rng.gen_range(0..hot) } else { rng.gen_range(hot..KEY_SPACE) })
        .collect()
}

fn run_batch(memo: &SharedMemo, keys: Vec<u64>) {
    let handles: Vec<_> = keys
        .into_iter()
        .map(|key| {
            let memo = Arc::clone(memo);
            thread::spawn(move || black_box(memo.get(&key)))
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }
}

fn bench_access_pattern(
    c: &mut Criterion,
    group_name: &str,
    draw: fn(&mut StdRng) -> Vec<u64>,
) {
    let mut group = c.benchmark_group(group_name);
    group.sample_size(10);

    for name in MEMOS {
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            let memo = build_memo(name);
            let mut rng = StdRng::seed_from_u64(42);
            b.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for _ in 0..iters {
                    let keys = draw(&mut rng);
                    let begin = Instant::now();
                    run_batch(&memo, keys);
                    total += begin.elapsed();
                }
                total
            });
        });
    }

    group.finish();
}

fn bench_memo_uniform(c: &mut Criterion) {
    bench_access_pattern(c, "memo_uniform", uniform_keys);
}

fn bench_memo_skewed(c: &mut Criterion) {
    bench_access_pattern(c, "memo_skewed", skewed_keys);
}

criterion_group!(benches, bench_memo_uniform, bench_memo_skewed);
criterion_main!(benches);
