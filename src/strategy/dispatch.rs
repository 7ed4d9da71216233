//! Operation dispatch
//!
//! This module bridges the replay pipeline and the transaction service. The
//! dispatcher resolves account labels to account ids (opening accounts at a
//! zero balance on first touch), tracks which file operation produced which
//! ledger transaction so reverse rows can reference earlier rows, and rejects
//! duplicate operation ids.

use crate::core::{
    BalanceStore, BonusTransactionService, InMemoryBalanceStore, InMemoryLedger, RetryPolicy,
    TransactionLedger,
};
use crate::types::{
    AccountId, LedgerError, OperationId, OperationRecord, OperationType, TransactionId,
    TransactionKind, TransactionRecord,
};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Dispatches parsed operations through the transaction service
///
/// Thread-safe: the concurrent strategy shares one dispatcher across account
/// partitions. Operations for the same account must be dispatched in file
/// order; the strategies guarantee this by partitioning per account label.
pub struct OperationDispatcher<B, L> {
    service: BonusTransactionService<B, L>,
    /// Account label -> account id, populated on first touch
    accounts: DashMap<String, AccountId>,
    /// Applied operation id -> the ledger transaction it produced
    ///
    /// `None` marks an id claimed by an in-flight movement; the claim is
    /// released if the movement is rejected.
    applied: DashMap<OperationId, Option<TransactionId>>,
}

impl OperationDispatcher<InMemoryBalanceStore, InMemoryLedger> {
    /// Create a dispatcher over fresh in-memory state
    pub fn in_memory(retry: RetryPolicy) -> Self {
        Self::new(BonusTransactionService::with_retry_policy(
            InMemoryBalanceStore::new(),
            InMemoryLedger::new(),
            retry,
        ))
    }
}

impl<B: BalanceStore, L: TransactionLedger> OperationDispatcher<B, L> {
    /// Create a dispatcher over an existing service
    pub fn new(service: BonusTransactionService<B, L>) -> Self {
        Self {
            service,
            accounts: DashMap::new(),
            applied: DashMap::new(),
        }
    }

    /// The underlying transaction service
    pub fn service(&self) -> &BonusTransactionService<B, L> {
        &self.service
    }

    /// Dispatch one operation, returning the ledger entry it produced
    ///
    /// Earn/spend/adjust/expire apply their signed amount through the
    /// service; reverse looks up the transaction its referenced operation
    /// produced and reverses it.
    ///
    /// # Errors
    ///
    /// - `DuplicateOperation` - a non-reverse row reused an applied id
    /// - `UnknownOperation` - a reverse row referenced an id never applied
    /// - `ValidationError` - missing amount, or a reverse row naming an
    ///   account that is unknown or that the referenced transaction does
    ///   not involve
    /// - any error the service reports for the movement itself
    pub async fn dispatch(
        &self,
        record: OperationRecord,
    ) -> Result<TransactionRecord, LedgerError> {
        match record.op {
            OperationType::Reverse => self.dispatch_reverse(&record).await,
            _ => self.dispatch_movement(record).await,
        }
    }

    async fn dispatch_movement(
        &self,
        record: OperationRecord,
    ) -> Result<TransactionRecord, LedgerError> {
        use dashmap::mapref::entry::Entry;

        // Claim the id before applying. Two rows reusing an id race on this
        // entry and only one may proceed; the claim starts empty and is
        // filled with the transaction id once the movement lands.
        match self.applied.entry(record.id) {
            Entry::Occupied(_) => {
                return Err(LedgerError::DuplicateOperation { op_id: record.id })
            }
            Entry::Vacant(entry) => {
                entry.insert(None);
            }
        }

        match self.apply_movement(&record).await {
            Ok(tx) => {
                self.applied.insert(record.id, Some(tx.id));
                Ok(tx)
            }
            Err(err) => {
                // A rejected operation does not consume its id
                self.applied.remove(&record.id);
                Err(err)
            }
        }
    }

    async fn apply_movement(
        &self,
        record: &OperationRecord,
    ) -> Result<TransactionRecord, LedgerError> {
        let amount = record.amount.ok_or_else(|| {
            LedgerError::validation(format!("operation {} is missing an amount", record.id))
        })?;

        let kind = match record.op {
            OperationType::Earn => TransactionKind::Earn,
            OperationType::Spend => TransactionKind::Spend,
            OperationType::Adjust => TransactionKind::AdjustmentByAdmin,
            OperationType::Expire => TransactionKind::Expire,
            // Handled by dispatch()
            OperationType::Reverse => unreachable!(),
        };

        let account = self.resolve_account(&record.account)?;
        let description = record.description.as_deref().unwrap_or_default();

        self.service.apply(account, amount, kind, description).await
    }

    async fn dispatch_reverse(
        &self,
        record: &OperationRecord,
    ) -> Result<TransactionRecord, LedgerError> {
        // A claimed-but-unfinished id is treated the same as an unknown one
        let tx = self
            .applied
            .get(&record.id)
            .and_then(|entry| *entry.value())
            .ok_or(LedgerError::UnknownOperation { op_id: record.id })?;

        // The row must name the account the original movement touched
        let account = self
            .accounts
            .get(&record.account)
            .map(|entry| *entry.value())
            .ok_or_else(|| {
                LedgerError::validation(format!(
                    "reverse of operation {} names unknown account {}",
                    record.id, record.account
                ))
            })?;
        let original = self
            .service
            .ledger()
            .get(tx)
            .ok_or(LedgerError::TransactionNotFound { tx })?;
        if !original.involves(account) {
            return Err(LedgerError::validation(format!(
                "reverse of operation {} names account {} but transaction {} does not involve it",
                record.id, record.account, tx
            )));
        }

        self.service.reverse(tx).await
    }

    /// Resolve an account label, opening the account on first touch
    fn resolve_account(&self, label: &str) -> Result<AccountId, LedgerError> {
        use dashmap::mapref::entry::Entry;

        match self.accounts.entry(label.to_string()) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let account = AccountId::new_v4();
                self.service
                    .balances()
                    .open_account(account, Decimal::ZERO)?;
                entry.insert(account);
                Ok(account)
            }
        }
    }

    /// Final balances keyed by account label
    pub fn balances_by_label(&self) -> Result<Vec<(String, Decimal)>, LedgerError> {
        self.accounts
            .iter()
            .map(|entry| {
                let balance = self.service.balances().get_balance(*entry.value())?;
                Ok((entry.key().clone(), balance))
            })
            .collect()
    }
}
