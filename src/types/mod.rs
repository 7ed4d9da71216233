//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account-related types and identifiers
//! - `transaction`: Ledger transaction records, kinds, and statuses
//! - `operation`: Replay operations parsed from CSV input
//! - `error`: Error types for the bonus ledger

pub mod account;
pub mod error;
pub mod operation;
pub mod transaction;

pub use account::{Account, AccountId};
pub use error::LedgerError;
pub use operation::{OperationId, OperationRecord, OperationType};
pub use transaction::{TransactionId, TransactionKind, TransactionRecord, TransactionStatus};
