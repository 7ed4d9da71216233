//! Concurrent batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Operations are read in batches; within each
//! batch they are partitioned by account label and the partitions are
//! dispatched concurrently, bounded by the configured concurrency limit.
//!
//! # Ordering
//!
//! Batches are processed sequentially, and within a batch each account's
//! operations run in file order on one task. Operations for the same account
//! therefore always apply in file order, while different accounts proceed in
//! parallel. Cross-account conflicts cannot occur (each balance cell belongs
//! to one account); the retry path exists for callers that drive the service
//! directly from concurrent contexts.

use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_balances_csv;
use crate::strategy::{OperationDispatcher, ProcessingStrategy, ReplayConfig};
use crate::types::{LedgerError, OperationRecord};
use futures::stream::{self, StreamExt};
use log::warn;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;

/// Concurrent batch processing strategy
///
/// Reads operations in batches and dispatches per-account partitions in
/// parallel across a multi-threaded tokio runtime.
#[derive(Debug, Clone)]
pub struct ConcurrentStrategy {
    config: ReplayConfig,
}

impl ConcurrentStrategy {
    /// Create a concurrent strategy with the given configuration
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for ConcurrentStrategy {
    /// Process operations from input file and write balances to output
    ///
    /// Fatal errors (file not found, runtime construction) are returned
    /// immediately; rejected operations and malformed rows are logged and
    /// skipped.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .enable_all()
            .build()
            .map_err(|e| LedgerError::Io {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let dispatcher = OperationDispatcher::in_memory(self.config.retry.clone());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| LedgerError::Io {
                    message: format!("Failed to open file '{}': {}", input_path.display(), e),
                })?;

            // csv-async speaks futures::io, tokio files speak tokio::io
            let mut reader = AsyncReader::new(file.compat());

            // Batches run sequentially so that an account spanning batch
            // boundaries still sees its operations in file order
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let partitions = partition_by_account(batch);
                stream::iter(partitions)
                    .for_each_concurrent(self.config.max_concurrent, |(_, operations)| {
                        let dispatcher = &dispatcher;
                        async move {
                            for operation in operations {
                                if let Err(e) = dispatcher.dispatch(operation).await {
                                    warn!("Operation rejected: {}", e);
                                }
                            }
                        }
                    })
                    .await;
            }

            let balances = dispatcher.balances_by_label()?;
            write_balances_csv(&balances, output)
        })
    }
}

/// Group a batch by account label, preserving file order within each group
fn partition_by_account(
    batch: Vec<OperationRecord>,
) -> HashMap<String, Vec<OperationRecord>> {
    let mut partitions: HashMap<String, Vec<OperationRecord>> = HashMap::new();
    for record in batch {
        partitions
            .entry(record.account.clone())
            .or_default()
            .push(record);
    }
    partitions
}
