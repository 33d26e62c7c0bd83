//! CSV example reader with full input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use grove_id3::{CLASS_KEY, Example, MISSING_VALUE};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads labeled categorical examples from a CSV file.
///
/// Expected CSV format:
/// - Header row required; every column is an attribute name
/// - One column holds the class label (default `Class`, see [`ExampleReader::with_class_column`])
///   and is stored under [`CLASS_KEY`]
/// - One row per example, all rows must have the same number of columns
///
/// Cells are trimmed. An empty cell becomes [`MISSING_VALUE`]. Attributes keep
/// header order, which fixes the tie-break order of induced trees.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::MissingClassColumn`] | Header lacks the class column |
/// | [`IoError::DuplicateColumn`] | Two header columns share a name |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
#[derive(Debug, Clone)]
pub struct ExampleReader {
    path: PathBuf,
    class_column: String,
}

impl ExampleReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            class_column: CLASS_KEY.to_string(),
        }
    }

    /// Read the class label from `column` instead of `Class`.
    #[must_use]
    pub fn with_class_column(mut self, column: impl Into<String>) -> Self {
        self.class_column = column.into();
        self
    }

    /// Return the header column holding the class label.
    #[must_use]
    pub fn class_column(&self) -> &str {
        &self.class_column
    }

    /// Read and validate the CSV file, returning one [`Example`] per row.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<Example>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) allows rows with varying column counts so that our own
        // InconsistentRowLength check fires instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        })?;
        let expected_cols = header.len();
        debug!(expected_cols, "read CSV header");

        let columns = self.attribute_names(header)?;

        let mut examples = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let example: Example = columns
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| {
                    let value = if cell.is_empty() { MISSING_VALUE } else { cell };
                    (name.as_str(), value)
                })
                .collect();
            examples.push(example);
        }

        if examples.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_examples = examples.len(),
            n_attributes = expected_cols - 1,
            "example dataset loaded"
        );

        Ok(examples)
    }

    /// Map header columns to attribute names, renaming the class column to [`CLASS_KEY`].
    fn attribute_names(&self, header: &csv::StringRecord) -> Result<Vec<String>, IoError> {
        if !header.iter().any(|name| name == self.class_column) {
            return Err(IoError::MissingClassColumn {
                path: self.path.clone(),
                column: self.class_column.clone(),
            });
        }

        let mut names = Vec::with_capacity(header.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (index, name) in header.iter().enumerate() {
            let name = if name == self.class_column {
                CLASS_KEY.to_string()
            } else {
                name.to_string()
            };
            if let Some(&first_index) = seen.get(&name) {
                return Err(IoError::DuplicateColumn {
                    path: self.path.clone(),
                    column: name,
                    first_index,
                    second_index: index,
                });
            }
            seen.insert(name.clone(), index);
            names.push(name);
        }
        Ok(names)
    }
}
