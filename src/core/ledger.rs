//! In-memory append-only transaction ledger
//!
//! This module provides the `InMemoryLedger`, a thread-safe ledger backed by
//! `DashMap`. Each appended record is tagged with a monotonically increasing
//! sequence number so that audit queries can break timestamp ties by append
//! order. Status transitions run under the per-entry lock, making the
//! `Completed -> Reversed` flip atomic: under a race between two reversals of
//! the same record, exactly one wins.

use crate::core::traits::TransactionLedger;
use crate::types::{AccountId, LedgerError, TransactionId, TransactionRecord, TransactionStatus};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe append-only ledger
///
/// Records are immutable once written apart from the status flag. Appends to
/// different accounts proceed in parallel; the ledger itself requires no
/// update locking beyond normal insert semantics.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    /// Records keyed by transaction id, tagged with their append sequence
    records: DashMap<TransactionId, (u64, TransactionRecord)>,
    /// Next append sequence number
    sequence: AtomicU64,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Number of records in the ledger
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TransactionLedger for InMemoryLedger {
    fn append(&self, record: TransactionRecord) -> Result<TransactionId, LedgerError> {
        if record.source.is_none() && record.destination.is_none() {
            return Err(LedgerError::validation(
                "transaction must reference a source or destination account",
            ));
        }
        if record.amount == Decimal::ZERO {
            return Err(LedgerError::validation("transaction amount must be non-zero"));
        }

        let id = record.id;
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.records.insert(id, (seq, record));
        Ok(id)
    }

    fn get(&self, tx: TransactionId) -> Option<TransactionRecord> {
        self.records.get(&tx).map(|entry| entry.value().1.clone())
    }

    fn get_by_account(&self, account: AccountId) -> Vec<TransactionRecord> {
        let mut entries: Vec<(u64, TransactionRecord)> = self
            .records
            .iter()
            .filter(|entry| entry.value().1.involves(account))
            .map(|entry| entry.value().clone())
            .collect();

        entries.sort_by_key(|(seq, record)| (record.timestamp, *seq));
        entries.into_iter().map(|(_, record)| record).collect()
    }

    fn update_status(&self, tx: TransactionId, new_status: TransactionStatus) -> Result<(), LedgerError> {
        let mut entry = self
            .records
            .get_mut(&tx)
            .ok_or(LedgerError::TransactionNotFound { tx })?;

        let record = &mut entry.value_mut().1;
        if record.status == TransactionStatus::Completed && new_status == TransactionStatus::Reversed {
            record.status = TransactionStatus::Reversed;
            Ok(())
        } else {
            Err(LedgerError::invalid_transition(tx, record.status, new_status))
        }
    }

    fn reinstate(&self, tx: TransactionId) -> Result<(), LedgerError> {
        let mut entry = self
            .records
            .get_mut(&tx)
            .ok_or(LedgerError::TransactionNotFound { tx })?;

        let record = &mut entry.value_mut().1;
        if record.status == TransactionStatus::Reversed {
            record.status = TransactionStatus::Completed;
            Ok(())
        } else {
            Err(LedgerError::invalid_transition(
                tx,
                record.status,
                TransactionStatus::Completed,
            ))
        }
    }
}
