//! Stress tests for the worker pool

use fixed_pool::prelude::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_many_small_tasks() {
    let pool = Pool::new(8, None).unwrap();
    let sum = Arc::new(AtomicU64::new(0));

    for i in 0..1_000_000u64 {
        let sum = sum.clone();
        pool.submit(move || {
            sum.fetch_add(i, Ordering::Relaxed);
        })
        .unwrap();
    }
    pool.shutdown();

    assert_eq!(sum.load(Ordering::Relaxed), 499_999_500_000);
}

#[test]
#[ignore]
fn stress_test_repeated_create_shutdown() {
    for i in 0..200 {
        let pool = Pool::new(1 + i % 8, None).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..50 {
            let counter = counter.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        drop(pool);

        assert_eq!(counter.load(Ordering::SeqCst), 50, "Iteration {}", i);
    }
}

#[test]
#[ignore]
fn stress_test_high_contention() {
    let pool = Pool::new(16, None).unwrap();
    let data = Arc::new(Mutex::new(vec![0i32; 100]));

    for _ in 0..10_000 {
        let data = data.clone();
        pool.submit(move || {
            let mut guard = data.lock();
            for item in guard.iter_mut() {
                *item += 1;
            }
        })
        .unwrap();
    }
    pool.shutdown();

    assert!(data.lock().iter().all(|&x| x == 10_000));
}

#[test]
#[ignore]
fn stress_test_panic_recovery() {
    let failures = Arc::new(AtomicUsize::new(0));
    let f = failures.clone();
    let sink: ErrorSink = Arc::new(move |_: TaskError| {
        f.fetch_add(1, Ordering::Relaxed);
    });

    let pool = Pool::new(4, Some(sink)).unwrap();
    let ok = Arc::new(AtomicUsize::new(0));

    for i in 0..10_000 {
        let ok = ok.clone();
        pool.submit(move || {
            if i % 10 == 0 {
                panic!("Intentional panic");
            }
            ok.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
    }
    pool.shutdown();

    assert_eq!(ok.load(Ordering::Relaxed), 9_000);
    assert_eq!(failures.load(Ordering::Relaxed), 1_000);
}

#[test]
#[ignore]
fn stress_test_producers_and_tasks_that_submit() {
    let pool = Arc::new(Pool::new(4, None).unwrap());
    let executed = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..8)
        .map(|_| {
            let pool = pool.clone();
            let executed = executed.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    let inner_pool = pool.clone();
                    let executed = executed.clone();
                    pool.submit(move || {
                        executed.fetch_add(1, Ordering::Relaxed);
                        let executed = executed.clone();
                        // nested submission from a worker
                        inner_pool
                            .submit(move || {
                                executed.fetch_add(1, Ordering::Relaxed);
                            })
                            .unwrap();
                    })
                    .unwrap();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    // outer tasks push inner ones; wait for both generations
    while executed.load(Ordering::Relaxed) < 16_000 {
        thread::yield_now();
    }
    pool.shutdown();

    assert_eq!(executed.load(Ordering::Relaxed), 16_000);
}
