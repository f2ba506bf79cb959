//! Integration Tests for the Memoizing Cache
//!
//! Drives the public API through the call patterns a real caller uses.

use std::cell::RefCell;
use std::time::Duration;

use memo_lru::cache::{LruCore, ManualClock, Outcome, TimedCache};
use memo_lru::{lru_cache, memoize, EvictionTrigger, MemoConfig, MemoError, Memoizer, Recurse};

// == Helper Functions ==

fn secs(n: i64) -> chrono::Duration {
    chrono::Duration::seconds(n)
}

// == Eviction ==

#[test]
fn test_capacity_two_keeps_two_most_recent() {
    let computed = RefCell::new(Vec::new());
    let mut upper = lru_cache(2, None).unwrap().wrap(|s: &String| {
        computed.borrow_mut().push(s.clone());
        s.to_uppercase()
    });

    for key in ["A", "B", "C"] {
        upper.invoke(key.to_string());
    }

    let resident: Vec<String> = upper.entries().into_iter().map(|e| e.key).collect();
    assert_eq!(resident, vec!["B".to_string(), "C".to_string()]);

    // B and C are hits, A is recomputed
    upper.invoke("B".to_string());
    upper.invoke("C".to_string());
    assert_eq!(computed.borrow().len(), 3);
    upper.invoke("A".to_string());
    assert_eq!(computed.borrow().last().map(String::as_str), Some("A"));
    assert_eq!(computed.borrow().len(), 4);
}

#[test]
fn test_reads_protect_entries_from_eviction() {
    let mut ident = lru_cache(3, None).unwrap().wrap(|n: &u32| *n);
    ident.invoke(1);
    ident.invoke(2);
    ident.invoke(3);

    ident.invoke(1);
    ident.invoke(4);

    let resident: Vec<u32> = ident.entries().into_iter().map(|e| e.key).collect();
    assert_eq!(resident, vec![3, 1, 4]);
}

#[test]
fn test_over_capacity_trigger_holds_one_extra() {
    let config = MemoConfig::default()
        .with_capacity(2)
        .with_trigger(EvictionTrigger::OverCapacity);
    let mut ident = Memoizer::new(config).unwrap().wrap(|n: &u32| *n);

    for n in 0..10 {
        ident.invoke(n);
        assert!(ident.len() <= 3);
    }
    assert_eq!(ident.len(), 3);
}

// == Expiry ==

#[test]
fn test_ttl_epoch_scenario() {
    let clock = ManualClock::default();
    let calls = RefCell::new(0);
    let mut tracked = lru_cache(10, Some(Duration::from_secs(4)))
        .unwrap()
        .wrap_with_clock(
            |k: &&str| {
                *calls.borrow_mut() += 1;
                k.len()
            },
            clock.clone(),
        );

    // t=0 miss
    assert_eq!(tracked.invoke_traced("K").outcome, Outcome::Miss);
    // t=1 hit
    clock.advance(secs(1));
    assert_eq!(tracked.invoke_traced("K").outcome, Outcome::Hit);
    // t=5 epoch elapsed
    clock.advance(secs(4));
    let report = tracked.invoke_traced("K");
    assert_eq!(report.outcome, Outcome::Miss);
    assert_eq!(report.stats.hits, 0);
    assert_eq!(report.stats.misses, 1);
    assert_eq!(*calls.borrow(), 2);
}

#[test]
fn test_expiry_clears_every_key() {
    let clock = ManualClock::default();
    let mut ident = lru_cache(10, Some(Duration::from_millis(500)))
        .unwrap()
        .wrap_with_clock(|n: &u32| *n, clock.clone());

    for n in 0..5 {
        ident.invoke(n);
    }
    assert_eq!(ident.len(), 5);

    clock.advance(chrono::Duration::milliseconds(500));
    ident.invoke(9);
    assert_eq!(ident.len(), 1);
    assert_eq!(ident.entries()[0].key, 9);
}

#[test]
fn test_expiry_is_lazy() {
    let clock = ManualClock::default();
    let mut ident = lru_cache(10, Some(Duration::from_secs(1)))
        .unwrap()
        .wrap_with_clock(|n: &u32| *n, clock.clone());
    ident.invoke(1);

    // No access, no clear
    clock.advance(secs(60));
    assert_eq!(ident.len(), 1);
}

// == Errors ==

#[test]
fn test_configuration_errors_at_construction() {
    assert_eq!(lru_cache(0, None).unwrap_err(), MemoError::InvalidCapacity(0));
    assert!(matches!(
        lru_cache(1, Some(Duration::ZERO)),
        Err(MemoError::InvalidTtl(_))
    ));
    assert!(matches!(
        Memoizer::new(MemoConfig::default().with_ttl(Duration::MAX)),
        Err(MemoError::TtlOutOfRange(_))
    ));
}

#[test]
fn test_low_level_constructors_validate() {
    assert!(matches!(
        LruCore::<u8, u8>::new(0),
        Err(MemoError::InvalidCapacity(0))
    ));
    assert!(matches!(
        TimedCache::<u8, u8>::new(4, Some(secs(-5))),
        Err(MemoError::InvalidTtl(_))
    ));
    assert!(TimedCache::<u8, u8>::new(4, Some(secs(5))).is_ok());
}

#[test]
fn test_failed_computation_is_not_cached() {
    let attempts = RefCell::new(0);
    let mut parse = Memoizer::default().wrap_fallible(|s: &&str| {
        *attempts.borrow_mut() += 1;
        s.parse::<i64>()
    });

    assert!(parse.try_invoke("x1").is_err());
    assert!(parse.is_empty());
    assert!(parse.try_invoke("x1").is_err());
    assert_eq!(*attempts.borrow(), 2);

    assert_eq!(parse.try_invoke("42"), Ok(42));
    assert_eq!(parse.try_invoke("42"), Ok(42));
    assert_eq!(*attempts.borrow(), 3);
}

// == Diagnostics ==

#[test]
fn test_traced_report_serializes() {
    let mut square = memoize(|n: &u64| n * n);
    square.invoke(3);
    let report = square.invoke_traced(3);

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"], "hit");
    assert_eq!(json["value"], 9);
    assert_eq!(json["stats"]["hits"], 1);
    assert_eq!(json["stats"]["capacity"], 10);
    assert!(json["ttl_ms"].is_null());
    assert!(report.to_string().starts_with("hit: 3 -> 9"));
}

#[test]
fn test_explicit_clear_resets_counters() {
    let mut square = memoize(|n: &u64| n * n);
    square.invoke(1);
    square.invoke(1);
    square.invoke(2);

    square.clear();

    let stats = square.stats();
    assert_eq!((stats.hits, stats.misses, stats.current_size), (0, 0, 0));
    assert_eq!(square.invoke(1), 1);
    assert_eq!(square.stats().misses, 1);
}

// == Recursion ==

#[test]
fn test_recursive_fibonacci_computes_once_per_argument() {
    let computed = RefCell::new(0);
    let mut fib = Memoizer::default().wrap_recursive(
        |recurse: &mut Recurse<'_, u64, u64>, n: &u64| {
            *computed.borrow_mut() += 1;
            if *n < 2 {
                *n
            } else {
                recurse(n - 1) + recurse(n - 2)
            }
        },
    );

    assert_eq!(fib.invoke(90), 2_880_067_194_370_816_120);
    assert_eq!(*computed.borrow(), 91);
    assert_eq!(fib.len(), 10);
}

// == Shared ==

#[tokio::test]
async fn test_shared_memoized_across_tasks() {
    let shared = lru_cache(16, None)
        .unwrap()
        .wrap(|n: &u64| (1..=*n).product::<u64>())
        .into_shared();

    let mut handles = vec![];
    for _ in 0..4 {
        let shared = shared.clone();
        handles.push(tokio::spawn(async move { shared.invoke(10).await }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 3_628_800);
    }

    let stats = shared.stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 3);
}
