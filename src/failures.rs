//! Durable failure log
//!
//! Permanently failed identifiers are appended to a CSV file with `id,error`
//! columns. The log is append-only: rows are never rewritten, deduplicated,
//! or deleted, so an identifier retried across several runs appears once per
//! failed run. The header row is written exactly once over the file's
//! lifetime — on the first flush into a missing or empty file — and never
//! again, including after restarts.

use crate::error::Result;
use crate::types::FailureRecord;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Append-only sink for permanently failed identifiers
#[derive(Clone, Debug)]
pub struct FailureSink {
    path: PathBuf,
}

impl FailureSink {
    /// Create a sink writing to the given path
    ///
    /// The file is not touched until the first non-empty flush.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the given records, returning how many rows were written
    ///
    /// A header row is emitted only when the file does not yet exist or is
    /// empty. An empty record slice is a no-op and does not create the file.
    pub fn flush(&self, records: &[FailureRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let write_header = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(records.len())
    }

    /// Count the data rows currently on disk (excluding the header)
    ///
    /// Returns 0 when the file does not exist. Used for the end-of-run
    /// summary, which reports failures accumulated across all runs.
    pub fn count(&self) -> Result<u64> {
        if !self.path.exists() {
            return Ok(0);
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = 0u64;
        for record in reader.records() {
            record?;
            rows += 1;
        }
        Ok(rows)
    }
}
