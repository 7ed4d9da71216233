//! Bonus transaction service
//!
//! This module provides the `BonusTransactionService`, which composes the
//! balance store, the transaction ledger, and the retrying executor into the
//! two operations the outer API layer consumes: applying an earn/spend/
//! adjust/expire movement, and reversing a previously applied one.
//!
//! # Consistency
//!
//! Each apply runs as one retried unit of work: read the balance, validate,
//! write the new balance conditioned on the value read, append the ledger
//! entry. A failed compare-and-set raises the retryable conflict signal and
//! the whole unit re-runs from a fresh read, so same-account operations are
//! serialized with no lost updates. The balance is a materialized projection
//! of the ledger and the two are only ever written together.
//!
//! # Reversal
//!
//! A reversal first claims the original record by atomically flipping its
//! status `Completed -> Reversed` (single winner under races), then posts a
//! `Completed` admin-adjustment counter-entry for the inverse amount through
//! the same read/CAS/append sequence. If the counter-movement exhausts its
//! retries the claim is undone via the ledger's reinstate hook before the
//! failure propagates.

use crate::core::retry::RetryPolicy;
use crate::core::traits::{BalanceStore, TransactionLedger};
use crate::types::{
    AccountId, LedgerError, TransactionId, TransactionKind, TransactionRecord, TransactionStatus,
};
use log::{error, warn};
use rust_decimal::Decimal;

/// Applies and reverses bonus transactions atomically
///
/// Generic over the store and ledger traits so the in-memory implementations
/// can be swapped for a durable backend without touching the balance-mutation
/// logic.
pub struct BonusTransactionService<B, L> {
    balances: B,
    ledger: L,
    retry: RetryPolicy,
}

impl<B: BalanceStore, L: TransactionLedger> BonusTransactionService<B, L> {
    /// Create a service with the default retry policy
    pub fn new(balances: B, ledger: L) -> Self {
        Self::with_retry_policy(balances, ledger, RetryPolicy::default())
    }

    /// Create a service with a custom retry policy
    pub fn with_retry_policy(balances: B, ledger: L, retry: RetryPolicy) -> Self {
        Self {
            balances,
            ledger,
            retry,
        }
    }

    /// The underlying balance store
    pub fn balances(&self) -> &B {
        &self.balances
    }

    /// The underlying transaction ledger
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Apply a signed balance movement and append its ledger entry
    ///
    /// Validates the sign/kind pairing, then runs the read/CAS/append unit of
    /// work under the retry policy. A spend that would take the balance below
    /// zero fails with `InsufficientBalance` and is never retried; a lost
    /// compare-and-set race is retried from a freshly read balance.
    ///
    /// # Errors
    ///
    /// - `ValidationError` - zero amount or sign inconsistent with the kind
    /// - `AccountNotFound` - the account does not exist
    /// - `InsufficientBalance` - a spend would overdraw the account
    /// - `ArithmeticOverflow` - the balance update would overflow
    /// - `RetriesExhausted` - the conflict never resolved within the cap
    pub async fn apply(
        &self,
        account: AccountId,
        amount: Decimal,
        kind: TransactionKind,
        description: &str,
    ) -> Result<TransactionRecord, LedgerError> {
        validate_signed_amount(amount, kind)?;

        self.retry
            .run(|| self.apply_once(account, amount, kind, description))
            .await
    }

    /// Reverse a previously applied transaction
    ///
    /// Flips the original record `Completed -> Reversed` and posts a
    /// `Completed` admin-adjustment counter-entry for the inverse amount.
    /// Returns the counter-entry.
    ///
    /// Reversing the same transaction twice fails with `InvalidTransition`
    /// the second time; the balance moves exactly once.
    ///
    /// # Errors
    ///
    /// - `TransactionNotFound` - no such transaction
    /// - `InvalidTransition` - the record is not `Completed`
    /// - `RetriesExhausted` - the counter-movement never won its
    ///   compare-and-set; the original record is reinstated as `Completed`
    pub async fn reverse(&self, tx: TransactionId) -> Result<TransactionRecord, LedgerError> {
        let original = self
            .ledger
            .get(tx)
            .ok_or(LedgerError::TransactionNotFound { tx })?;

        let account = original.account().ok_or_else(|| {
            LedgerError::validation("transaction does not reference an account")
        })?;

        // Claim the reversal. The atomic status flip is the linearization
        // point: a concurrent second reversal loses here with
        // InvalidTransition before any balance movement.
        self.ledger.update_status(tx, TransactionStatus::Reversed)?;

        let inverse = -original.amount;
        let description = format!("reversal of {}", tx);

        let result = self
            .retry
            .run(|| {
                self.apply_once(account, inverse, TransactionKind::AdjustmentByAdmin, &description)
            })
            .await;

        if let Err(err) = &result {
            // The claim was taken but the counter-movement could not be
            // applied; put the original back so the ledger and balance stay
            // consistent.
            warn!("reversal of {} failed, reinstating original: {}", tx, err);
            if let Err(reinstate_err) = self.ledger.reinstate(tx) {
                error!(
                    "failed to reinstate transaction {} after aborted reversal: {}",
                    tx, reinstate_err
                );
            }
        }

        result
    }

    /// One attempt of the read/CAS/append unit of work
    ///
    /// Must be retried by the caller when it reports a conflict; every retry
    /// starts from a fresh balance read.
    fn apply_once(
        &self,
        account: AccountId,
        amount: Decimal,
        kind: TransactionKind,
        description: &str,
    ) -> Result<TransactionRecord, LedgerError> {
        let current = self.balances.get_balance(account)?;

        let new_balance = current
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow { account })?;

        if kind == TransactionKind::Spend && new_balance < Decimal::ZERO {
            return Err(LedgerError::insufficient_balance(account, current, amount));
        }

        if !self.balances.compare_and_set(account, current, new_balance)? {
            return Err(LedgerError::ConcurrencyConflict { account });
        }

        let record = TransactionRecord::completed(account, amount, kind, description);
        self.ledger.append(record.clone())?;
        Ok(record)
    }
}

/// Validate that the signed amount is consistent with the transaction kind
///
/// Earns must be positive, spends and expirations negative, admin adjustments
/// any non-zero value.
fn validate_signed_amount(amount: Decimal, kind: TransactionKind) -> Result<(), LedgerError> {
    if amount == Decimal::ZERO {
        return Err(LedgerError::validation("amount must be non-zero"));
    }

    match kind {
        TransactionKind::Earn if amount < Decimal::ZERO => Err(LedgerError::validation(
            "earn amount must be positive",
        )),
        TransactionKind::Spend | TransactionKind::Expire if amount > Decimal::ZERO => {
            Err(LedgerError::validation(
                "spend and expire amounts must be negative",
            ))
        }
        _ => Ok(()),
    }
}
