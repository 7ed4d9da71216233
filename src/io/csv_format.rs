//! CSV format handling for replay operations and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRow structure for deserialization
//! - Conversion from CSV rows to domain operations, including sign
//!   application (spends and expirations are written as positive magnitudes
//!   in the file but applied as debits)
//! - Balance output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{LedgerError, OperationId, OperationRecord, OperationType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV row structure for deserialization
///
/// Matches the input CSV format with columns: op, id, account, amount,
/// description. The amount field is optional because reverse operations
/// reference an earlier operation instead of carrying their own amount.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRow {
    pub op: String,
    pub id: OperationId,
    pub account: String,
    pub amount: Option<String>,
    pub description: Option<String>,
}

/// Convert a CsvRow to an OperationRecord
///
/// This function:
/// - Parses the operation string into an OperationType
/// - Parses the amount string into a Decimal (if present)
/// - Validates that amounts are present and positive for earn/spend/expire,
///   present and non-zero for adjust, and absent for reverse
/// - Applies the sign convention: spend and expire magnitudes are negated so
///   the engine only ever sees signed movements
pub fn convert_csv_row(row: CsvRow) -> Result<OperationRecord, LedgerError> {
    let op = match row.op.to_lowercase().as_str() {
        "earn" => OperationType::Earn,
        "spend" => OperationType::Spend,
        "adjust" => OperationType::Adjust,
        "expire" => OperationType::Expire,
        "reverse" => OperationType::Reverse,
        _ => {
            return Err(LedgerError::validation(format!(
                "Invalid operation: '{}' for op id {}",
                row.op, row.id
            )))
        }
    };

    let magnitude = match row.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            match Decimal::from_str(amount_str.trim()) {
                Ok(decimal) => Some(decimal),
                Err(_) => {
                    return Err(LedgerError::validation(format!(
                        "Invalid amount '{}' for op id {}",
                        amount_str, row.id
                    )))
                }
            }
        }
        _ => None,
    };

    let amount = match op {
        OperationType::Earn | OperationType::Spend | OperationType::Expire => {
            let magnitude = magnitude.ok_or_else(|| {
                LedgerError::validation(format!(
                    "{:?} operation {} for account {} requires an amount",
                    op, row.id, row.account
                ))
            })?;
            if magnitude <= Decimal::ZERO {
                return Err(LedgerError::validation(format!(
                    "{:?} operation {} requires a positive amount, got {}",
                    op, row.id, magnitude
                )));
            }
            if op == OperationType::Earn {
                Some(magnitude)
            } else {
                Some(-magnitude)
            }
        }
        OperationType::Adjust => {
            let signed = magnitude.ok_or_else(|| {
                LedgerError::validation(format!(
                    "Adjust operation {} for account {} requires an amount",
                    row.id, row.account
                ))
            })?;
            if signed == Decimal::ZERO {
                return Err(LedgerError::validation(format!(
                    "Adjust operation {} requires a non-zero amount",
                    row.id
                )));
            }
            Some(signed)
        }
        // Reverse references an earlier operation; any amount given is
        // ignored rather than rejected.
        OperationType::Reverse => None,
    };

    Ok(OperationRecord {
        op,
        id: row.id,
        account: row.account,
        amount,
        description: row.description.filter(|d| !d.trim().is_empty()),
    })
}

/// Write account balances to CSV format
///
/// Writes balances with columns: account, balance. Rows are sorted by account
/// label for deterministic output.
pub fn write_balances_csv(
    balances: &[(String, Decimal)],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer.write_record(["account", "balance"])?;

    let mut sorted = balances.to_vec();
    sorted.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (account, balance) in sorted {
        writer.write_record(&[account, format!("{:.2}", balance)])?;
    }

    writer.flush()?;

    Ok(())
}
