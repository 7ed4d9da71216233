//! Transaction-related types for the bonus ledger
//!
//! This module defines the ledger's transaction kinds, statuses, and the
//! immutable record appended for every balance-affecting event.

use crate::types::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction identifier
pub type TransactionId = Uuid;

/// Kinds of balance-affecting transactions
///
/// The kind classifies why points moved. Earns credit points, spends and
/// expirations debit them, and admin adjustments may do either. Reversals do
/// not get their own kind: the counter-entry posted by a reversal is an admin
/// adjustment referencing the original record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Points credited for a qualifying purchase or promotion
    ///
    /// The signed amount must be positive.
    Earn,

    /// Points redeemed by the account holder
    ///
    /// The signed amount must be negative, and the resulting balance may not
    /// drop below zero.
    Spend,

    /// Manual correction applied by an operator
    ///
    /// The signed amount may be positive or negative. Counter-entries posted
    /// by reversals use this kind.
    AdjustmentByAdmin,

    /// Points removed because they aged out
    ///
    /// The signed amount must be negative.
    Expire,
}

/// Lifecycle status of a ledger record
///
/// The only permitted transition after creation is `Completed -> Reversed`.
/// Records applied by the engine are written directly as `Completed`;
/// `Pending` and `Failed` exist for rows staged or rejected by outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Staged but not yet applied to a balance
    Pending,

    /// Applied to the balance; the normal terminal state
    Completed,

    /// Applied and later undone by a counter-entry
    ///
    /// The record itself is immutable apart from this flag; the balance
    /// movement is undone by a separate `Completed` counter-entry.
    Reversed,

    /// Rejected before any balance movement
    Failed,
}

/// Immutable ledger entry for a single balance-affecting event
///
/// One record is appended per applied operation. Credits carry the account in
/// `destination`, debits in `source`; entity relationships are expressed by
/// identifier only, never by owning references.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Unique record identifier
    pub id: TransactionId,

    /// Account debited by this entry, if any
    pub source: Option<AccountId>,

    /// Account credited by this entry, if any
    pub destination: Option<AccountId>,

    /// Signed amount applied to the account's balance
    pub amount: Decimal,

    /// Why the points moved
    pub kind: TransactionKind,

    /// When the record was created
    pub timestamp: DateTime<Utc>,

    /// Lifecycle status; see [`TransactionStatus`]
    pub status: TransactionStatus,

    /// Free-text description supplied by the caller
    pub description: String,
}

impl TransactionRecord {
    /// Build a `Completed` record for a single-account movement
    ///
    /// Places the account in `destination` for credits and in `source` for
    /// debits, stamps the current time, and assigns a fresh identifier.
    pub fn completed(
        account: AccountId,
        amount: Decimal,
        kind: TransactionKind,
        description: &str,
    ) -> Self {
        let (source, destination) = if amount < Decimal::ZERO {
            (Some(account), None)
        } else {
            (None, Some(account))
        };

        TransactionRecord {
            id: TransactionId::new_v4(),
            source,
            destination,
            amount,
            kind,
            timestamp: Utc::now(),
            status: TransactionStatus::Completed,
            description: description.to_string(),
        }
    }

    /// The account this entry moves points for
    ///
    /// Single-account entries always carry exactly one of `source` or
    /// `destination`; returns `None` only for malformed records.
    pub fn account(&self) -> Option<AccountId> {
        self.destination.or(self.source)
    }

    /// Whether this entry touches the given account (as source or destination)
    pub fn involves(&self, account: AccountId) -> bool {
        self.source == Some(account) || self.destination == Some(account)
    }
}
