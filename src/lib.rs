//! Bonus Ledger Library
//! # Overview
//!
//! This library provides a loyalty-points balance engine with optimistic
//! concurrency, plus a streaming CSV replay pipeline with serial and
//! concurrent strategies.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransactionRecord, operations)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::service`] - Applying and reversing bonus transactions
//!   - [`core::balance_store`] - Compare-and-set balance storage
//!   - [`core::ledger`] - Append-only transaction history
//!   - [`core::retry`] - Bounded retry with exponential backoff
//! - [`io`] - CSV input and balance output
//! - [`strategy`] - Pluggable replay strategies (serial, concurrent)
//!
//! # Operations
//!
//! The replay pipeline supports five operations:
//!
//! - **Earn**: Credit points to an account
//! - **Spend**: Debit points from an account (requires sufficient balance)
//! - **Adjust**: Apply a signed manual correction
//! - **Expire**: Remove aged-out points
//! - **Reverse**: Undo a previously applied operation via a counter-entry
//!
//! # Concurrency
//!
//! Balances are updated exclusively through compare-and-set. A lost race is
//! retried with exponential backoff (100ms, 200ms, 400ms by default) and
//! surfaces as `RetriesExhausted` once the cap is hit. The ledger is
//! append-only; the single permitted mutation is the atomic
//! `Completed -> Reversed` status flip that claims a reversal.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    BalanceStore, BonusTransactionService, InMemoryBalanceStore, InMemoryLedger, RetryPolicy,
    TransactionLedger,
};
pub use io::write_balances_csv;
pub use types::{
    Account, AccountId, LedgerError, OperationRecord, OperationType, TransactionId,
    TransactionKind, TransactionRecord, TransactionStatus,
};
