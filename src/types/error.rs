//! Error types for the bonus ledger
//!
//! This module defines all error types that can occur while applying or
//! reversing bonus transactions and while replaying operations from CSV.
//!
//! # Error Categories
//!
//! - **Client errors**: unknown account/transaction, duplicate or malformed
//!   operations, illegal status transitions
//! - **Business rules**: insufficient balance (never retried)
//! - **Concurrency**: `ConcurrencyConflict` is an internal signal absorbed by
//!   the retrying executor; `RetriesExhausted` is the transient failure
//!   surfaced once the retry cap is hit
//! - **Pipeline errors**: file I/O and CSV parsing failures

use crate::types::account::AccountId;
use crate::types::operation::OperationId;
use crate::types::transaction::{TransactionId, TransactionStatus};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the bonus ledger
///
/// Every failure path in the engine returns one of these variants; no failure
/// is silently dropped. `ConcurrencyConflict` is the only retryable kind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The referenced account does not exist
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The unknown account id
        account: AccountId,
    },

    /// The referenced ledger transaction does not exist
    #[error("Transaction {tx} not found")]
    TransactionNotFound {
        /// The unknown transaction id
        tx: TransactionId,
    },

    /// An account with this id already exists
    #[error("Account {account} already exists")]
    AccountExists {
        /// The conflicting account id
        account: AccountId,
    },

    /// Malformed amount, kind, or record
    #[error("Validation error: {message}")]
    ValidationError {
        /// Description of the validation failure
        message: String,
    },

    /// A spend would take the balance below zero
    ///
    /// Business rule, never retried; balance and ledger are left unchanged.
    #[error("Insufficient balance for account {account}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        /// Account that attempted the spend
        account: AccountId,
        /// Balance at the time of the attempt
        balance: Decimal,
        /// Signed amount that was requested
        requested: Decimal,
    },

    /// A concurrent writer changed the balance between read and write
    ///
    /// Internal signal raised when compare-and-set observes a mismatch. The
    /// retrying executor absorbs it and re-runs the unit of work from a fresh
    /// read; callers only see it wrapped as [`LedgerError::RetriesExhausted`].
    #[error("Concurrent update detected for account {account}")]
    ConcurrencyConflict {
        /// Account whose balance was concurrently modified
        account: AccountId,
    },

    /// The retry cap was hit without the conflict resolving
    ///
    /// Transient failure, distinct from business errors so the caller can
    /// decide whether to retry at a higher level.
    #[error("Operation failed after {attempts} attempts due to concurrent updates")]
    RetriesExhausted {
        /// Total attempts made (initial attempt plus retries)
        attempts: u32,
    },

    /// An illegal status transition was requested
    ///
    /// The only permitted transition is `Completed -> Reversed`; the record
    /// is left unchanged.
    #[error("Invalid status transition for transaction {tx}: {from:?} -> {to:?}")]
    InvalidTransition {
        /// The transaction whose status change was rejected
        tx: TransactionId,
        /// Status the record currently has
        from: TransactionStatus,
        /// Status that was requested
        to: TransactionStatus,
    },

    /// Balance arithmetic would overflow
    #[error("Arithmetic overflow updating balance for account {account}")]
    ArithmeticOverflow {
        /// Account whose update was rejected
        account: AccountId,
    },

    /// A non-reverse operation reused an already-applied operation id
    #[error("Duplicate operation id {op_id}")]
    DuplicateOperation {
        /// The reused operation id
        op_id: OperationId,
    },

    /// A reverse operation referenced an id that was never applied
    #[error("Operation {op_id} not found for reverse")]
    UnknownOperation {
        /// The unknown operation id
        op_id: OperationId,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// Recoverable during replay: the malformed row is skipped and processing
    /// continues with the next row.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl LedgerError {
    /// Whether this error is the retryable conflict signal
    ///
    /// Only `ConcurrencyConflict` is retryable; validation, not-found, and
    /// business-rule errors always propagate immediately.
    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::ConcurrencyConflict { .. })
    }

    /// Create a ValidationError
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::ValidationError {
            message: message.into(),
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(account: AccountId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            account,
            balance,
            requested,
        }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(tx: TransactionId, from: TransactionStatus, to: TransactionStatus) -> Self {
        LedgerError::InvalidTransition { tx, from, to }
    }
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::uuid;

    const ACCOUNT: AccountId = uuid!("6b9f1c0a-92cd-4e7a-8a1d-3f4e5a6b7c8d");
    const TX: TransactionId = uuid!("0d8e7f6a-5b4c-4d3e-9f2a-1b0c9d8e7f6a");

    #[rstest]
    #[case::account_not_found(
        LedgerError::AccountNotFound { account: ACCOUNT },
        "Account 6b9f1c0a-92cd-4e7a-8a1d-3f4e5a6b7c8d not found"
    )]
    #[case::validation(
        LedgerError::validation("amount must be non-zero"),
        "Validation error: amount must be non-zero"
    )]
    #[case::insufficient_balance(
        LedgerError::insufficient_balance(ACCOUNT, Decimal::new(5000, 2), Decimal::new(-10000, 2)),
        "Insufficient balance for account 6b9f1c0a-92cd-4e7a-8a1d-3f4e5a6b7c8d: balance 50.00, requested -100.00"
    )]
    #[case::conflict(
        LedgerError::ConcurrencyConflict { account: ACCOUNT },
        "Concurrent update detected for account 6b9f1c0a-92cd-4e7a-8a1d-3f4e5a6b7c8d"
    )]
    #[case::retries_exhausted(
        LedgerError::RetriesExhausted { attempts: 4 },
        "Operation failed after 4 attempts due to concurrent updates"
    )]
    #[case::invalid_transition(
        LedgerError::invalid_transition(TX, TransactionStatus::Reversed, TransactionStatus::Reversed),
        "Invalid status transition for transaction 0d8e7f6a-5b4c-4d3e-9f2a-1b0c9d8e7f6a: Reversed -> Reversed"
    )]
    #[case::duplicate_operation(
        LedgerError::DuplicateOperation { op_id: 7 },
        "Duplicate operation id 7"
    )]
    #[case::parse_with_line(
        LedgerError::Parse { line: Some(42), message: "invalid field".to_string() },
        "CSV parse error at line 42: invalid field"
    )]
    #[case::parse_without_line(
        LedgerError::Parse { line: None, message: "invalid field".to_string() },
        "CSV parse error: invalid field"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(LedgerError::ConcurrencyConflict { account: ACCOUNT }.is_conflict());

        assert!(!LedgerError::AccountNotFound { account: ACCOUNT }.is_conflict());
        assert!(!LedgerError::RetriesExhausted { attempts: 4 }.is_conflict());
        assert!(!LedgerError::validation("bad").is_conflict());
        assert!(!LedgerError::insufficient_balance(ACCOUNT, Decimal::ZERO, Decimal::ONE).is_conflict());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::Io { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
