//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over replay operations from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row parsing errors are yielded as Err variants in the
//!   iterator, carrying the line number for diagnostics
//!
//! # Memory Efficiency
//!
//! The reader streams rows one at a time; memory usage is O(1) per row, not
//! O(file_size).

use crate::io::csv_format::{convert_csv_row, CsvRow};
use crate::types::{LedgerError, OperationRecord};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over replay operations with constant
/// memory usage.
///
/// # Examples
///
/// ```no_run
/// use bonus_ledger::io::sync_reader::SyncReader;
/// use std::path::Path;
///
/// let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
/// let operations: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Parsed {} operations", operations.len());
/// ```
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// Opens the CSV file for streaming iteration. The reader trims
    /// whitespace from all fields, allows flexible field counts (the amount
    /// and description columns are optional), and uses an 8KB buffer.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| LedgerError::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<OperationRecord, LedgerError>;

    /// Get the next operation from the CSV file
    ///
    /// Yields `Some(Err(..))` for rows that fail to parse or convert, with
    /// the line number attached, and `None` at end of file.
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRow>();

        match deserializer.next()? {
            Ok(csv_row) => {
                self.line_num += 1;
                // +1 for the header row
                let line = self.line_num + 1;
                Some(convert_csv_row(csv_row).map_err(|e| LedgerError::Parse {
                    line: Some(line),
                    message: e.to_string(),
                }))
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(LedgerError::Parse {
                    line: Some(self.line_num + 1),
                    message: e.to_string(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationType;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_new_opens_file() {
        let file = create_temp_csv("op,id,account,amount,description\nearn,1,alice,50.0,\n");
        assert!(SyncReader::new(file.path()).is_ok());
    }

    #[test]
    fn test_sync_reader_new_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));

        match result {
            Err(LedgerError::Io { message }) => assert!(message.contains("Failed to open file")),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_sync_reader_iterates_valid_earn() {
        let file = create_temp_csv("op,id,account,amount,description\nearn,1,alice,50.0,bonus\n");

        let reader = SyncReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(records.len(), 1);
        let record = records[0].as_ref().unwrap();
        assert_eq!(record.op, OperationType::Earn);
        assert_eq!(record.id, 1);
        assert_eq!(record.account, "alice");
        assert_eq!(record.amount, Some(Decimal::new(500, 1)));
        assert_eq!(record.description.as_deref(), Some("bonus"));
    }

    #[test]
    fn test_sync_reader_handles_all_operations() {
        let csv_content = "op,id,account,amount,description\n\
            earn,1,alice,100.0,\n\
            spend,2,alice,50.0,\n\
            adjust,3,alice,-10.0,\n\
            expire,4,alice,5.0,\n\
            reverse,2,alice,,\n";
        let file = create_temp_csv(csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].op, OperationType::Earn);
        assert_eq!(records[1].op, OperationType::Spend);
        assert_eq!(records[1].amount, Some(Decimal::new(-500, 1)));
        assert_eq!(records[2].op, OperationType::Adjust);
        assert_eq!(records[3].op, OperationType::Expire);
        assert_eq!(records[3].amount, Some(Decimal::new(-50, 1)));
        assert_eq!(records[4].op, OperationType::Reverse);
        assert_eq!(records[4].id, 2);
        assert_eq!(records[4].amount, None);
    }

    #[test]
    fn test_sync_reader_includes_line_numbers_in_errors() {
        let csv_content = "op,id,account,amount,description\n\
            earn,1,alice,100.0,\n\
            earn,2,bob,invalid,\n\
            earn,3,carol,50.0,\n";
        let file = create_temp_csv(csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert!(records[2].is_ok());

        match records[1].as_ref().unwrap_err() {
            LedgerError::Parse { line, message } => {
                // Line 3 because of the header
                assert_eq!(*line, Some(3));
                assert!(message.contains("Invalid amount"));
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_sync_reader_continues_after_error() {
        let csv_content = "op,id,account,amount,description\n\
            earn,1,alice,100.0,\n\
            transfer,2,bob,50.0,\n\
            earn,3,carol,75.0,\n";
        let file = create_temp_csv(csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert!(records[1].is_err());
        assert!(records[2].is_ok());
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let file = create_temp_csv(
            "op,id,account,amount,description\n  earn  ,  1  ,  alice  ,  50.0  ,\n",
        );

        let reader = SyncReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].account, "alice");
        assert_eq!(records[0].amount, Some(Decimal::new(500, 1)));
    }

    #[test]
    fn test_sync_reader_empty_file_after_header() {
        let file = create_temp_csv("op,id,account,amount,description\n");

        let reader = SyncReader::new(file.path()).unwrap();
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn test_sync_reader_case_insensitive_ops() {
        let csv_content = "op,id,account,amount,description\n\
            EARN,1,alice,100.0,\n\
            Spend,2,alice,50.0,\n";
        let file = create_temp_csv(csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].op, OperationType::Earn);
        assert_eq!(records[1].op, OperationType::Spend);
    }
}
