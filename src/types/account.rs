//! Account-related types for the bonus ledger
//!
//! This module defines the Account structure used to snapshot the state of a
//! balance-holding entity (a user, store, or company in the loyalty domain).

use rust_decimal::Decimal;
use uuid::Uuid;

/// Account identifier
///
/// Accounts are keyed by UUID so that users, stores, and companies can all
/// hold balances in the same ledger without a shared numbering scheme.
pub type AccountId = Uuid;

/// Balance-holding account snapshot
///
/// Represents the current state of an account as observed at a single point
/// in time. The balance is a materialized projection of the transaction
/// ledger: it is mutated only through compare-and-set updates and must never
/// diverge from the sum of applied ledger entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The account identifier
    pub id: AccountId,

    /// Current bonus-point balance
    ///
    /// The store itself does not enforce a sign constraint; the service layer
    /// rejects spends that would take the balance below zero.
    pub balance: Decimal,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(id: AccountId) -> Self {
        Account {
            id,
            balance: Decimal::ZERO,
        }
    }

    /// Create a new account with an opening balance
    pub fn with_balance(id: AccountId, balance: Decimal) -> Self {
        Account { id, balance }
    }
}
