//! Processing strategy module for operation replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing CSV parsing, operation dispatch through the transaction
//! service, and balance output. This allows different processing
//! implementations (serial, concurrent) to be selected at runtime.

use crate::cli::StrategyType;
use crate::core::RetryPolicy;
use crate::types::LedgerError;
use log::warn;
use std::io::Write;
use std::path::Path;

pub mod concurrent;
pub mod dispatch;
pub mod serial;

pub use concurrent::ConcurrentStrategy;
pub use dispatch::OperationDispatcher;
pub use serial::SerialStrategy;

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads operations from a CSV file, dispatches them through
/// the bonus transaction service, and writes the final balances to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from input file and write balances to output
    ///
    /// # Errors
    ///
    /// Fatal errors (file not found, I/O failure, runtime construction)
    /// return an error. Individual rejected operations are logged and
    /// processing continues with the next row.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError>;
}

/// Configuration for replay processing
///
/// Controls batching and concurrency for the concurrent strategy, and the
/// retry policy used by both strategies.
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// Number of operations per batch (concurrent strategy only)
    pub batch_size: usize,
    /// Maximum number of accounts processed concurrently within a batch
    pub max_concurrent: usize,
    /// Retry policy for conflicting balance updates
    pub retry: RetryPolicy,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ReplayConfig {
    /// Create a ReplayConfig, falling back to defaults for zero values
    pub fn new(batch_size: usize, max_concurrent: usize, retry: RetryPolicy) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size (0), using default ({})",
                default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                "Invalid max_concurrent (0), using default ({})",
                default.max_concurrent
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
            retry,
        }
    }
}

/// Create a processing strategy based on the specified strategy type
pub fn create_strategy(
    strategy_type: StrategyType,
    config: ReplayConfig,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Serial => Box::new(SerialStrategy::new(config.retry)),
        StrategyType::Concurrent => Box::new(ConcurrentStrategy::new(config)),
    }
}
