//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over replay operations from a CSV source.
//! Supports batch reading for efficient async processing; rows that fail to
//! parse are logged and skipped so one malformed row never aborts the replay.

use crate::io::csv_format::{convert_csv_row, CsvRow};
use crate::types::OperationRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use log::warn;

/// Asynchronous CSV reader
///
/// Provides batch reading over replay operations with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async byte source
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of operations
    ///
    /// Reads up to `batch_size` rows, converting them to operation records.
    /// Invalid rows are logged and skipped. Returns an empty vector when the
    /// end of the input is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<OperationRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<CsvRow>();

        while batch.len() < batch_size {
            match rows.next().await {
                Some(Ok(csv_row)) => match convert_csv_row(csv_row) {
                    Ok(record) => batch.push(record),
                    Err(e) => warn!("Row conversion error: {}", e),
                },
                Some(Err(e)) => warn!("CSV parse error: {}", e),
                None => break,
            }
        }

        batch
    }
}
