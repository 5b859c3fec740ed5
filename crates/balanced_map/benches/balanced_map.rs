use criterion::{Criterion, criterion_group, criterion_main};

mod common;

fn bench(c: &mut Criterion) {
    let mut build = c.benchmark_group("balanced_map/build");
    common::bench_all_build(&mut build);
    build.finish();

    let mut search = c.benchmark_group("balanced_map/search");
    common::bench_all_search(&mut search);
    search.finish();

    let mut churn = c.benchmark_group("balanced_map/churn");
    common::bench_all_churn(&mut churn);
    churn.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
