//! Table Module
//!
//! CSV-backed article table:
//! - Ordered headers with an index for O(1) column lookup
//! - Immutable source cells; derived data lands in appended columns
//! - Numeric coercion helpers shared by the classifiers and signal engine
//!
//! Rows are keyed by position. Output row order always equals input row order.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Table I/O error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// CSV parse or serialize error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The input had no header row
    #[error("Input table has no header row")]
    MissingHeader,
}

/// Table result type
pub type Result<T> = std::result::Result<T, TableError>;

// ============================================================================
// NUMERIC COERCION
// ============================================================================

/// Coerce a cell to a number; empty, non-numeric, and non-finite cells become `0.0`.
///
/// This is the rule-evaluation view of a cell: every threshold comparison in
/// the cascades runs against coerced values.
#[inline]
pub fn coerce_number(cell: &str) -> f64 {
    parse_number(cell).unwrap_or(0.0)
}

/// Parse a cell as a number, or `None` when the cell is empty or non-numeric.
///
/// This is the aggregation view of a cell: missing cells drop out of window
/// means, stddevs, medians, and IQRs instead of dragging them toward zero.
#[inline]
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// An in-memory CSV table with ordered columns and positional rows.
///
/// All cells are stored as strings exactly as read; interpretation (numeric
/// coercion, date parsing) happens at the call site so the emitter can
/// round-trip untouched input columns byte-for-byte.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given header row.
    ///
    /// Duplicate header names resolve to their first occurrence.
    pub fn new(columns: Vec<String>) -> Self {
        let mut index = HashMap::new();
        for (i, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self {
            columns,
            index,
            rows: Vec::new(),
        }
    }

    /// Read a table from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if columns.is_empty() {
            return Err(TableError::MissingHeader);
        }

        let mut table = Table::new(columns);
        for record in csv_reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            // Ragged rows are padded so positional access stays total
            row.resize(table.columns.len(), String::new());
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Read a table from a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Write the table to any CSV sink, headers first, rows in order.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.columns)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file.
    pub fn write_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write(file)
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether a column exists by exact name.
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Raw cell contents by row and column name; `None` when the column is unknown.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Coerced numeric view of a cell (missing column or cell → `0.0`).
    pub fn number(&self, row: usize, column: &str) -> f64 {
        self.value(row, column).map(coerce_number).unwrap_or(0.0)
    }

    /// Optional numeric view of a cell for windowed aggregation.
    pub fn number_opt(&self, row: usize, column: &str) -> Option<f64> {
        self.value(row, column).and_then(parse_number)
    }

    /// Append a data row. Short rows are padded with empty cells.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Set a whole column, overwriting it in place when it already exists and
    /// appending it otherwise. `values` must have one entry per row.
    ///
    /// This is the only mutation path the classifiers use: source columns are
    /// never edited cell-by-cell, and re-running a pass overwrites its own
    /// derived columns with identical values.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                let col = self.columns.len();
                self.columns.push(name.to_string());
                self.index.insert(name.to_string(), col);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Read a whole column as owned strings (empty strings for a missing column).
    pub fn column_values(&self, name: &str) -> Vec<String> {
        match self.column_index(name) {
            Some(col) => self.rows.iter().map(|r| r[col].clone()).collect(),
            None => vec![String::new(); self.rows.len()],
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
