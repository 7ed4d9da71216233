use crate::core::RetryPolicy;
use crate::strategy::ReplayConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Replay bonus-point operations with optimistic concurrency
#[derive(Parser, Debug)]
#[command(name = "bonus-ledger")]
#[command(about = "Replay bonus-point operations from CSV and report final balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation rows
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy to use for replaying operations
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "serial",
        help = "Processing strategy: 'serial' for in-order or 'concurrent' for parallel per-account replay"
    )]
    pub strategy: StrategyType,

    /// Number of operations per batch (concurrent mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of accounts processed concurrently (concurrent mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of account partitions processing concurrently (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Maximum number of retries after a conflicting balance update
    #[arg(
        long = "max-retries",
        value_name = "COUNT",
        help = "Retries after the initial attempt when a balance update conflicts (default: 3)"
    )]
    pub max_retries: Option<u32>,

    /// Delay before the first conflict retry, in milliseconds
    #[arg(
        long = "base-delay-ms",
        value_name = "MILLIS",
        help = "Backoff before the first retry; doubles per retry (default: 100)"
    )]
    pub base_delay_ms: Option<u64>,
}

/// Available processing strategies for operation replay
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Serial,
    Concurrent,
}

impl CliArgs {
    /// Build the retry policy from CLI arguments, using defaults for
    /// anything not given
    pub fn to_retry_policy(&self) -> RetryPolicy {
        let default = RetryPolicy::default();
        RetryPolicy::new(
            self.max_retries.unwrap_or(default.max_retries),
            self.base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(default.base_delay),
        )
    }

    /// Build the replay configuration from CLI arguments
    pub fn to_replay_config(&self) -> ReplayConfig {
        let default = ReplayConfig::default();
        ReplayConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent.unwrap_or(default.max_concurrent),
            self.to_retry_policy(),
        )
    }
}
