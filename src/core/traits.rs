//! Core traits for balance storage and the transaction ledger
//!
//! This module defines the trait abstractions the service is written against,
//! allowing the in-memory implementations to be swapped for a durable store
//! without touching the balance-mutation logic.

use crate::types::{Account, AccountId, LedgerError, TransactionId, TransactionRecord, TransactionStatus};
use rust_decimal::Decimal;

/// Trait for balance storage with compare-and-set updates
///
/// The balance cell is the only contended resource in the system; it is
/// mutated exclusively through [`compare_and_set`], never through a blind
/// overwrite. Implementations must make the compare-and-set linearizable per
/// account: either via an atomic conditional update (the in-memory store) or
/// a row-version check inside the caller's database transaction.
///
/// [`compare_and_set`]: BalanceStore::compare_and_set
pub trait BalanceStore: Send + Sync {
    /// Create an account with an opening balance
    ///
    /// Fails with `AccountExists` if the account is already present.
    fn open_account(&self, account: AccountId, opening_balance: Decimal) -> Result<(), LedgerError>;

    /// Read the current balance
    ///
    /// Fails with `AccountNotFound` if the account does not exist.
    fn get_balance(&self, account: AccountId) -> Result<Decimal, LedgerError>;

    /// Atomically set the balance to `new_value` iff it currently equals `expected_current`
    ///
    /// Returns `Ok(false)` (not an error) on mismatch, signaling a concurrent
    /// modification the caller should retry from a fresh read. Fails with
    /// `AccountNotFound` if the account does not exist.
    fn compare_and_set(
        &self,
        account: AccountId,
        expected_current: Decimal,
        new_value: Decimal,
    ) -> Result<bool, LedgerError>;

    /// Snapshot all accounts for output
    fn accounts(&self) -> Vec<Account>;
}

/// Trait for the append-only transaction ledger
///
/// Records are immutable once written, except for the single permitted status
/// transition `Completed -> Reversed`. The ledger is the source of truth the
/// balance projection must never diverge from.
pub trait TransactionLedger: Send + Sync {
    /// Append a record immutably
    ///
    /// Fails with `ValidationError` if both source and destination are absent
    /// or the amount is zero.
    fn append(&self, record: TransactionRecord) -> Result<TransactionId, LedgerError>;

    /// Look up a record by id
    fn get(&self, tx: TransactionId) -> Option<TransactionRecord>;

    /// All records touching an account, ordered by timestamp ascending
    ///
    /// Ties are broken by append order. Used for audit and replay, not for
    /// the hot balance path.
    ///
    /// A read that overlaps an in-flight reversal can observe the original
    /// record already flipped to `Reversed` before its counter-entry has
    /// been appended. The balance-equals-sum-of-all-entries invariant holds
    /// throughout; the sum over non-reversed entries only converges once
    /// the counter-entry lands.
    fn get_by_account(&self, account: AccountId) -> Vec<TransactionRecord>;

    /// Apply a status transition
    ///
    /// The only permitted transition is `Completed -> Reversed`, applied
    /// atomically so that concurrent reversals of the same record have a
    /// single winner. Any other request fails with `InvalidTransition` and
    /// leaves the record unchanged.
    fn update_status(&self, tx: TransactionId, new_status: TransactionStatus) -> Result<(), LedgerError>;

    /// Undo a reversal claim, restoring `Reversed -> Completed`
    ///
    /// Recovery hook used by the service when a claimed reversal's
    /// counter-movement could not be applied (retry exhaustion). A durable
    /// implementation that runs the claim and the counter-movement in one
    /// database transaction never takes this path.
    fn reinstate(&self, tx: TransactionId) -> Result<(), LedgerError>;
}
