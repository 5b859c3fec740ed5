use std::hint::black_box;
use std::time::{Duration, Instant};

use balanced_map::{Avl, Balance, BalancedTree, RedBlack};
use bench::{RuntimeProfile, apply_runtime_profile, ascending_keys, mix_seed, seed_for, shuffled_keys};
use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, BenchmarkId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 4] = [1_000, 8_000, 64_000, 256_000];
const OPS_PER_ITER: usize = 200;
const SEARCH_HIT_RATE_PERCENT: u64 = 80;

type Map<B> = BalancedTree<u64, u64, B>;

#[derive(Clone, Copy)]
enum ChurnOp {
    Insert { key: u64, value: u64 },
    Delete { key: u64 },
}

fn build<B: Balance>(keys: &[u64]) -> Map<B> {
    let mut map = Map::<B>::with_capacity(keys.len());
    for &k in keys {
        let _ = black_box(map.insert(k, mix_seed(k)));
    }
    map
}

pub fn bench_build<B, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    B: Balance,
{
    for &size in &SIZES {
        apply_runtime_profile(group, RuntimeProfile::Medium);
        let orders = [
            ("ascending", ascending_keys(size)),
            ("shuffled", shuffled_keys(size, seed_for(1, size as u64))),
        ];
        for (order, keys) in &orders {
            group.bench_function(BenchmarkId::new(format!("{label}/{order}"), size), |bencher| {
                bencher.iter(|| black_box(build::<B>(keys).len()))
            });
        }
    }
}

pub fn bench_search<B, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    B: Balance,
{
    for &size in &SIZES {
        apply_runtime_profile(group, RuntimeProfile::Small);
        let base_seed = seed_for(2, size as u64);
        let map = build::<B>(&shuffled_keys(size, base_seed));

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = StdRng::seed_from_u64(mix_seed(base_seed ^ iter));
                    let probes: Vec<u64> = (0..OPS_PER_ITER)
                        .map(|_| {
                            if rng.random_range(0..100) < SEARCH_HIT_RATE_PERCENT {
                                rng.random_range(0..size as u64)
                            } else {
                                size as u64 + rng.random_range(0..size as u64)
                            }
                        })
                        .collect();
                    let start = Instant::now();
                    for key in &probes {
                        black_box(map.search(key));
                    }
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

/// Half inserts of fresh keys, half deletes of keys inserted in the same batch,
/// so the tree size is stable across iterations.
fn generate_churn_ops(size: usize, iter: u64, rng: &mut StdRng) -> Vec<ChurnOp> {
    let mut live = Vec::with_capacity(OPS_PER_ITER / 2);
    let mut ops = Vec::with_capacity(OPS_PER_ITER);
    for i in 0..OPS_PER_ITER {
        if i % 2 == 0 {
            let key = size as u64 + iter * OPS_PER_ITER as u64 + i as u64;
            live.push(key);
            ops.push(ChurnOp::Insert { key, value: rng.random() });
        } else {
            let idx = rng.random_range(0..live.len());
            ops.push(ChurnOp::Delete { key: live.swap_remove(idx) });
        }
    }
    debug_assert!(live.is_empty());
    ops
}

pub fn bench_churn<B, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    B: Balance,
{
    for &size in &SIZES {
        apply_runtime_profile(group, RuntimeProfile::Small);
        let base_seed = seed_for(3, size as u64);
        let mut map = build::<B>(&shuffled_keys(size, base_seed));

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = StdRng::seed_from_u64(mix_seed(base_seed ^ iter));
                    let ops = generate_churn_ops(size, iter, &mut rng);
                    let start = Instant::now();
                    for op in &ops {
                        match *op {
                            ChurnOp::Insert { key, value } => {
                                let _ = black_box(map.insert(key, value));
                            }
                            ChurnOp::Delete { key } => {
                                let _ = black_box(map.delete(&key));
                            }
                        }
                    }
                    black_box(map.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

pub fn bench_all_build<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_build::<Avl, _>(group, "avl");
    bench_build::<RedBlack, _>(group, "rb");
}

pub fn bench_all_search<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_search::<Avl, _>(group, "avl");
    bench_search::<RedBlack, _>(group, "rb");
}

pub fn bench_all_churn<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_churn::<Avl, _>(group, "avl");
    bench_churn::<RedBlack, _>(group, "rb");
}
