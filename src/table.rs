use std::fs::File;
use std::path::Path;

use thiserror::Error;

/// An in-memory table: ordered column names plus row-major string cells.
///
/// Every row holds exactly one cell per column. Cell text is kept literally
/// as it appeared in the source file — strings like "N/A" or "None" are not
/// coerced to anything and round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column names, in order.
    pub columns: Vec<String>,
    /// Row-major cells; each inner vec has `columns.len()` entries.
    pub rows: Vec<Vec<String>>,
}

/// Error types for table I/O and column operations
#[derive(Debug, Error)]
pub enum TableError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("column '{column}' holds {values} values but the table has {rows} rows")]
    ColumnLength {
        column: String,
        values: usize,
        rows: usize,
    },
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of data rows (the header is not a row).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of the named column, top to bottom.
    pub fn column_values(&self, name: &str) -> Option<Vec<String>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    /// Copy of the rows in the half-open range `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }

    /// Assign a column positionally.
    ///
    /// If a column with this name already exists its values are overwritten,
    /// otherwise the column is appended on the right. The value count must
    /// equal the table's row count.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                column: name.to_string(),
                values: values.len(),
                rows: self.rows.len(),
            });
        }

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }

        Ok(())
    }
}

/// Read a CSV file into a [`Table`].
///
/// The first record is the header. Cell text is preserved byte-for-byte;
/// no blank/NA interpretation is applied.
///
/// # Returns
/// * `Ok(Table)` - Parsed table
/// * `Err(TableError)` - File not found, I/O error, or malformed CSV
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table, TableError> {
    let path_ref = path.as_ref();

    if !path_ref.exists() {
        return Err(TableError::NotFound(path_ref.display().to_string()));
    }

    let file = File::open(path_ref)?;
    let mut reader = csv::Reader::from_reader(file);

    let columns: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(Table { columns, rows })
}

/// Write a [`Table`] to a CSV file, header first.
pub fn write_table<P: AsRef<Path>>(path: P, table: &Table) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
