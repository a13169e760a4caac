//! Benchmarks for submission and drain throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fixed_pool::Pool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

fn run_batch(workers: usize, tasks: u64) -> u64 {
    let pool = Pool::new(workers, None).expect("Failed to build pool");
    let sum = Arc::new(AtomicU64::new(0));

    for i in 0..tasks {
        let sum = sum.clone();
        pool.submit(move || {
            sum.fetch_add(black_box(i), Ordering::Relaxed);
        })
        .expect("pool closed");
    }
    pool.shutdown();

    sum.load(Ordering::Relaxed)
}

fn sequential_batch(tasks: u64) -> u64 {
    (0..tasks).map(black_box).sum()
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_and_drain");

    for tasks in [100u64, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("sequential", tasks), tasks, |b, &tasks| {
            b.iter(|| sequential_batch(tasks))
        });

        for workers in [1usize, 4].iter() {
            let id = format!("pool_{}w", workers);
            group.bench_with_input(BenchmarkId::new(id, tasks), tasks, |b, &tasks| {
                b.iter(|| run_batch(*workers, tasks))
            });
        }
    }

    group.finish();
}

fn bench_result_handle(c: &mut Criterion) {
    let pool = Pool::new(2, None).expect("Failed to build pool");

    c.bench_function("submit_with_result_roundtrip", |b| {
        b.iter(|| {
            let handle = pool
                .submit_with_result(|| black_box(21) * 2)
                .expect("pool closed");
            handle.wait().expect("task failed")
        })
    });
}

criterion_group!(benches, bench_drain, bench_result_handle);
criterion_main!(benches);
