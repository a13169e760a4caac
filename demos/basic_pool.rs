use fixed_pool::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const WORKERS: usize = 2;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let sink: ErrorSink = Arc::new(|err: TaskError| eprintln!("task error: {}", err));
    let pool = Pool::new(WORKERS, Some(sink)).expect("Failed to build pool");

    println!("=== Pool initialized with {} workers ===\n", WORKERS);
    println!("Adding jobs to the queue...");

    for job_id in 0..10 {
        pool.submit(move || {
            println!(
                "Job {} executed by {}",
                job_id,
                thread::current().name().unwrap_or("unknown")
            );
            thread::sleep(Duration::from_millis(200));
        })
        .expect("pool closed");
    }

    pool.submit_fallible(|| Err::<(), _>("job 10 failed on purpose"))
        .expect("pool closed");

    let answer = pool
        .submit_with_result(|| 6 * 7)
        .expect("pool closed")
        .wait()
        .expect("task failed");
    println!("Result handle returned {}", answer);

    pool.shutdown();

    let snapshot = pool.metrics();
    println!(
        "\nExecuted {} tasks ({} failed), p50 {} ns",
        snapshot.tasks_executed, snapshot.tasks_failed, snapshot.p50_duration_ns
    );
    println!("\n=== Example Complete ===");
}
