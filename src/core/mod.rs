//! Core business logic module
//!
//! This module contains the core balance-ledger components:
//! - `traits` - Trait abstractions over the balance store and ledger
//! - `balance_store` - Compare-and-set balance storage
//! - `ledger` - Append-only transaction ledger
//! - `retry` - Bounded-retry executor for write conflicts
//! - `service` - Bonus transaction service composing the above

pub mod balance_store;
pub mod ledger;
pub mod retry;
pub mod service;
pub mod traits;

pub use balance_store::InMemoryBalanceStore;
pub use ledger::InMemoryLedger;
pub use retry::RetryPolicy;
pub use service::BonusTransactionService;
pub use traits::{BalanceStore, TransactionLedger};
