//! Memo LRU demo
//!
//! Runs a few workloads through the memoizing cache and logs what happens.

use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memo_lru::{lru_cache, MemoConfig, Memoizer, Recurse};

/// Entry point for the demo binary.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Trace a slow computation through a small expiring cache
/// 4. Compare a naive recursion with its memoized version
/// 5. Share one memoized computation between async tasks
#[tokio::main]
async fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memo_lru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting memo_lru demo");

    let config = MemoConfig::from_env();
    info!(
        "Configuration loaded: capacity={}, ttl={:?}, trigger={:?}",
        config.capacity, config.ttl, config.trigger
    );

    traced_demo()?;
    timing_demo(&config)?;
    shared_demo(&config).await?;

    info!("Demo complete");
    Ok(())
}

/// Prints a report for every call of a slow identity function.
fn traced_demo() -> Result<()> {
    let memoizer = lru_cache(5, Some(Duration::from_secs(4)))?;
    let mut slow_identity = memoizer.wrap(|n: &u64| {
        info!("Computing {n}");
        sleep(Duration::from_secs(1));
        *n
    });

    let mut last = None;
    for n in [1, 2, 3, 1, 3, 4] {
        let report = slow_identity.invoke_traced(n);
        println!("{report}");
        last = Some(report);
    }

    if let Some(report) = last {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

/// Times the naive recursion against the memoized one.
fn timing_demo(config: &MemoConfig) -> Result<()> {
    let memoizer =
        Memoizer::new(config.clone()).context("invalid MEMO_* environment configuration")?;
    let mut fib = memoizer.wrap_recursive(|recurse: &mut Recurse<'_, u64, u128>, n: &u64| {
        if *n < 2 {
            u128::from(*n)
        } else {
            recurse(n - 1) + recurse(n - 2)
        }
    });

    let start = Instant::now();
    let naive = fibonacci(32);
    info!("fibonacci(32) = {naive}, naive in {:?}", start.elapsed());

    let start = Instant::now();
    let memoized = fib.invoke(32);
    info!("fibonacci(32) = {memoized}, memoized in {:?}", start.elapsed());

    let start = Instant::now();
    let large = fib.invoke(138);
    info!(
        "fibonacci(138) = {large}, memoized in {:?} ({} misses)",
        start.elapsed(),
        fib.stats().misses
    );

    Ok(())
}

/// Runs several tasks against one shared cache.
async fn shared_demo(config: &MemoConfig) -> Result<()> {
    let shared = Memoizer::new(config.clone())?
        .wrap(|n: &u64| fibonacci(*n))
        .into_shared();

    let mut handles = vec![];
    for task in 0..4u64 {
        let shared = shared.clone();
        handles.push(tokio::spawn(async move {
            for n in 20..24u64 {
                let value = shared.invoke(n).await;
                info!("task {task}: fibonacci({n}) = {value}");
            }
        }));
    }
    for handle in handles {
        handle.await.context("shared demo task panicked")?;
    }

    let stats = shared.stats().await;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    info!("Shared cache hit rate: {:.2}", stats.hit_rate());
    Ok(())
}

fn fibonacci(n: u64) -> u64 {
    if n < 2 {
        n
    } else {
        fibonacci(n - 1) + fibonacci(n - 2)
    }
}
