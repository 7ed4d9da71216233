//! Replay operation types
//!
//! This module defines the operations parsed from the input CSV. An operation
//! is the file-level request ("earn 50 points for alice"); the engine turns
//! accepted operations into immutable [`TransactionRecord`] ledger entries.
//!
//! [`TransactionRecord`]: crate::types::transaction::TransactionRecord

use rust_decimal::Decimal;

/// Operation identifier assigned by the input file
///
/// Unique per file. Reverse operations put the id of the operation being
/// reversed here instead of a fresh id.
pub type OperationId = u32;

/// Operations supported by the replay pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    /// Credit points to an account
    Earn,

    /// Debit points from an account (requires sufficient balance)
    Spend,

    /// Apply a signed manual correction
    Adjust,

    /// Remove aged-out points
    Expire,

    /// Undo a previously applied operation
    ///
    /// References an earlier operation by id and carries no amount.
    Reverse,
}

/// Input operation parsed from one CSV row
///
/// The amount is already signed according to the operation type (earns are
/// positive, spends and expirations negative, adjustments as given). Reverse
/// operations carry no amount; their `id` field names the operation to undo.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// The operation to perform
    pub op: OperationType,

    /// File-assigned operation id (or, for reverse, the referenced id)
    pub id: OperationId,

    /// Account label this operation applies to
    pub account: String,

    /// Signed amount; `None` for reverse operations
    pub amount: Option<Decimal>,

    /// Optional free-text description carried onto the ledger entry
    pub description: Option<String>,
}
