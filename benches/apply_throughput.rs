//! Benchmark suite for comparing replay strategies
//!
//! This benchmark compares the throughput of the serial and concurrent
//! replay strategies using the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! # Benchmark Fixtures
//!
//! Two representative CSV files are used:
//! - `replay_small.csv` - Small dataset (100 operations)
//! - `replay_medium.csv` - Medium dataset (1,000 operations)
//!
//! Each fixture spreads earns and spends across ten accounts, so the
//! concurrent strategy has independent partitions to parallelize.

use bonus_ledger::cli::StrategyType;
use bonus_ledger::strategy::{create_strategy, ReplayConfig};
use bonus_ledger::{
    AccountId, BalanceStore, BonusTransactionService, InMemoryBalanceStore, InMemoryLedger,
    RetryPolicy, TransactionKind,
};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn main() {
    divan::main();
}

const APPLY_TASKS: usize = 100;

fn bench_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .expect("Failed to create tokio runtime")
}

/// Benchmark concurrent applies against separate accounts (no conflicts)
#[divan::bench]
fn apply_uncontended() {
    let runtime = bench_runtime();
    runtime.block_on(async {
        let balances = InMemoryBalanceStore::new();
        let accounts: Vec<AccountId> = (0..APPLY_TASKS).map(|_| AccountId::new_v4()).collect();
        for account in &accounts {
            balances.open_account(*account, Decimal::ZERO).unwrap();
        }
        let service = Arc::new(BonusTransactionService::new(balances, InMemoryLedger::new()));

        let handles: Vec<_> = accounts
            .into_iter()
            .map(|account| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .apply(account, Decimal::ONE, TransactionKind::Earn, "bench")
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    });
}

/// Benchmark concurrent applies against one account (conflict-retry path)
#[divan::bench]
fn apply_contended() {
    let runtime = bench_runtime();
    runtime.block_on(async {
        let balances = InMemoryBalanceStore::new();
        let account = AccountId::new_v4();
        balances.open_account(account, Decimal::ZERO).unwrap();
        // A wide retry bound with a short delay keeps the benchmark
        // measuring conflict resolution rather than backoff sleeps
        let service = Arc::new(BonusTransactionService::with_retry_policy(
            balances,
            InMemoryLedger::new(),
            RetryPolicy::new(APPLY_TASKS as u32, Duration::from_micros(50)),
        ));

        let handles: Vec<_> = (0..APPLY_TASKS)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .apply(account, Decimal::ONE, TransactionKind::Earn, "bench")
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    });
}

/// Benchmark serial replay with small dataset (100 operations)
#[divan::bench]
fn serial_strategy_small() {
    let strategy = create_strategy(StrategyType::Serial, ReplayConfig::default());
    let path = Path::new("benches/fixtures/replay_small.csv");
    let mut output = Vec::new();

    strategy
        .process(path, &mut output)
        .expect("Processing failed");
}

/// Benchmark concurrent replay with small dataset (100 operations)
#[divan::bench]
fn concurrent_strategy_small() {
    let strategy = create_strategy(StrategyType::Concurrent, ReplayConfig::default());
    let path = Path::new("benches/fixtures/replay_small.csv");
    let mut output = Vec::new();

    strategy
        .process(path, &mut output)
        .expect("Processing failed");
}

/// Benchmark serial replay with medium dataset (1,000 operations)
#[divan::bench]
fn serial_strategy_medium() {
    let strategy = create_strategy(StrategyType::Serial, ReplayConfig::default());
    let path = Path::new("benches/fixtures/replay_medium.csv");
    let mut output = Vec::new();

    strategy
        .process(path, &mut output)
        .expect("Processing failed");
}

/// Benchmark concurrent replay with medium dataset (1,000 operations)
#[divan::bench]
fn concurrent_strategy_medium() {
    let strategy = create_strategy(StrategyType::Concurrent, ReplayConfig::default());
    let path = Path::new("benches/fixtures/replay_medium.csv");
    let mut output = Vec::new();

    strategy
        .process(path, &mut output)
        .expect("Processing failed");
}
