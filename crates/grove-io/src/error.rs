//! I/O error types for grove-io.

use std::path::PathBuf;

/// Errors from reading and validating example CSV files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the header has no column holding the class label.
    #[error("class column \"{column}\" not found in header of {path}")]
    MissingClassColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// The class column that was requested.
        column: String,
    },

    /// Returned when two header columns map to the same attribute name.
    #[error("duplicate column \"{column}\" in {path}: first at index {first_index}, again at index {second_index}")]
    DuplicateColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// The duplicated attribute name, after renaming the class column.
        column: String,
        /// Zero-based index of the first occurrence.
        first_index: usize,
        /// Zero-based index of the second occurrence.
        second_index: usize,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },
}
