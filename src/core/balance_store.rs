//! In-memory compare-and-set balance store
//!
//! This module provides the `InMemoryBalanceStore`, a thread-safe balance
//! store backed by `DashMap`. The per-entry lock DashMap takes while a shard
//! entry is held is the linearization point for [`compare_and_set`]: the
//! comparison and the write happen under one lock, so two concurrent writers
//! can never both succeed against the same expected value.
//!
//! The store does not enforce a sign constraint on balances; the service
//! layer decides which movements are allowed.
//!
//! [`compare_and_set`]: crate::core::traits::BalanceStore::compare_and_set

use crate::core::traits::BalanceStore;
use crate::types::{Account, AccountId, LedgerError};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Thread-safe balance store keyed by account id
///
/// Multiple threads can operate on different accounts without blocking each
/// other; operations on the same account are serialized by the entry lock.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    balances: DashMap<AccountId, Decimal>,
}

impl InMemoryBalanceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn open_account(&self, account: AccountId, opening_balance: Decimal) -> Result<(), LedgerError> {
        use dashmap::mapref::entry::Entry;

        match self.balances.entry(account) {
            Entry::Occupied(_) => Err(LedgerError::AccountExists { account }),
            Entry::Vacant(entry) => {
                entry.insert(opening_balance);
                Ok(())
            }
        }
    }

    fn get_balance(&self, account: AccountId) -> Result<Decimal, LedgerError> {
        self.balances
            .get(&account)
            .map(|balance| *balance)
            .ok_or(LedgerError::AccountNotFound { account })
    }

    fn compare_and_set(
        &self,
        account: AccountId,
        expected_current: Decimal,
        new_value: Decimal,
    ) -> Result<bool, LedgerError> {
        let mut entry = self
            .balances
            .get_mut(&account)
            .ok_or(LedgerError::AccountNotFound { account })?;

        if *entry == expected_current {
            *entry = new_value;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn accounts(&self) -> Vec<Account> {
        self.balances
            .iter()
            .map(|entry| Account::with_balance(*entry.key(), *entry.value()))
            .collect()
    }
}
