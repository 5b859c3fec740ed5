//! Shared helpers for the workspace benchmarks.

use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::Measurement;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const RNG_SEED: u64 = 0x5EED_2026;
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Sample count, warm-up and measurement window for a benchmark group.
#[derive(Clone, Copy, Debug)]
pub enum RuntimeProfile {
    Small,
    Medium,
}

impl RuntimeProfile {
    fn settings(self) -> (usize, u64, u64) {
        match self {
            RuntimeProfile::Small => (15, 100, 200),
            RuntimeProfile::Medium => (15, 500, 1000),
        }
    }
}

pub fn apply_runtime_profile<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, profile: RuntimeProfile) {
    let (samples, warm_up_ms, measure_ms) = profile.settings();
    group.sample_size(samples);
    group.warm_up_time(Duration::from_millis(warm_up_ms));
    group.measurement_time(Duration::from_millis(measure_ms));
}

/// SplitMix64 finalizer.
pub fn mix_seed(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn seed_for(workload: u64, size: u64) -> u64 {
    mix_seed(RNG_SEED ^ (workload << 48) ^ size.wrapping_mul(SEED_MIX))
}

/// `0..n` in ascending order: the worst case for an unbalanced tree.
pub fn ascending_keys(n: usize) -> Vec<u64> {
    (0..n as u64).collect()
}

/// `0..n` in a deterministic shuffled order.
pub fn shuffled_keys(n: usize, seed: u64) -> Vec<u64> {
    let mut keys = ascending_keys(n);
    keys.shuffle(&mut StdRng::seed_from_u64(seed));
    keys
}
