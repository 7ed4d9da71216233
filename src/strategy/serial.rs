//! Serial processing strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates replay by coordinating between
//! the SyncReader (for CSV input), the OperationDispatcher (for applying
//! operations), and csv_format (for balance output).
//!
//! Operations are dispatched strictly in file order, so the output is fully
//! deterministic. A current-thread tokio runtime drives the async service;
//! the timer is enabled because conflict retries sleep between attempts
//! (unreachable under serial dispatch, but the policy is shared with the
//! concurrent strategy).

use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{OperationDispatcher, ProcessingStrategy};
use crate::core::RetryPolicy;
use crate::types::LedgerError;
use log::warn;
use std::io::Write;
use std::path::Path;

/// Serial processing strategy
///
/// Dispatches operations one at a time in file order. The simplest strategy
/// and the reference for output correctness.
#[derive(Debug, Clone)]
pub struct SerialStrategy {
    retry: RetryPolicy,
}

impl SerialStrategy {
    /// Create a serial strategy with the given retry policy
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

impl ProcessingStrategy for SerialStrategy {
    /// Process operations from input file and write balances to output
    ///
    /// Rejected operations and malformed rows are logged and skipped;
    /// processing continues with the next row.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| LedgerError::Io {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let dispatcher = OperationDispatcher::in_memory(self.retry.clone());
            let reader = SyncReader::new(input_path)?;

            for result in reader {
                match result {
                    Ok(record) => {
                        if let Err(e) = dispatcher.dispatch(record).await {
                            warn!("Operation rejected: {}", e);
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }

            let balances = dispatcher.balances_by_label()?;
            write_balances_csv(&balances, output)
        })
    }
}
