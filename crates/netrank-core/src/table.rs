//! In-memory tabular data.
//!
//! A [`Table`] is an ordered list of column names plus rows of JSON values.
//! `null` marks a missing cell. Tables convert to and from CSV and from a
//! JSON array of records (`[{"col": value, ...}, ...]`).

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NetrankError, Result};

/// Ordered columns and rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, or an [`NetrankError::InvalidInput`] naming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the table has no column called `name`.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            NetrankError::invalid_input(
                name,
                format!("no such column (have: {})", self.columns.join(", ")),
            )
        })
    }

    /// Cells of one column, top to bottom.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row width does not match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(NetrankError::invalid_input(
                "row",
                format!(
                    "row has {} cells but the table has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Set a column, replacing it when it already exists and appending it
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` does not have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(NetrankError::invalid_input(
                name,
                format!(
                    "column has {} values but the table has {} rows",
                    values.len(),
                    self.rows.len()
                ),
            ));
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

    /// Remove a column. Returns `false` if it did not exist.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// New table with the rows at `indices`, in the given order.
    ///
    /// Out-of-range indices are skipped.
    #[must_use]
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Reorder rows by a permutation of row positions.
    ///
    /// # Errors
    ///
    /// Returns an error if `order` is not a permutation of `0..num_rows()`.
    pub fn reorder_rows(&mut self, order: &[usize]) -> Result<()> {
        let mut seen = vec![false; self.rows.len()];
        if order.len() != self.rows.len() {
            return Err(NetrankError::invalid_input(
                "order",
                "row order must list every row exactly once",
            ));
        }
        for &i in order {
            match seen.get_mut(i) {
                Some(flag) if !*flag => *flag = true,
                _ => {
                    return Err(NetrankError::invalid_input(
                        "order",
                        "row order must list every row exactly once",
                    ));
                }
            }
        }
        let mut rows: Vec<Option<Vec<Value>>> = self.rows.drain(..).map(Some).collect();
        self.rows = order.iter().filter_map(|&i| rows[i].take()).collect();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // CSV
    // -----------------------------------------------------------------------

    /// Read a headered CSV document. Cell types are inferred: empty cells
    /// become `null`, then integers, floats and `true`/`false` are tried
    /// before falling back to strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV is malformed.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = Self::new(columns);

        for record in reader.records() {
            let record = record?;
            table.rows.push(record.iter().map(infer_cell).collect());
        }

        Ok(table)
    }

    /// Read a CSV file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn read_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| NetrankError::io(path, e))?;
        Self::from_csv_reader(file)
    }

    /// Write the table as headered CSV.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(cell_to_string))?;
        }
        writer
            .flush()
            .map_err(|e| NetrankError::io("<csv output>", e))?;
        Ok(())
    }

    /// Write the table to a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_csv_path(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| NetrankError::io(path, e))?;
        self.to_csv_writer(file)
    }

    // -----------------------------------------------------------------------
    // JSON records
    // -----------------------------------------------------------------------

    /// Rows as JSON objects keyed by column name.
    #[must_use]
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Build a table from a JSON array of objects.
    ///
    /// Columns appear in the order they are first seen across records (keys
    /// within one record are visited in sorted order); keys missing from a
    /// record become `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an array of objects.
    pub fn from_records(value: &Value) -> Result<Self> {
        let Some(records) = value.as_array() else {
            return Err(NetrankError::invalid_input(
                "table",
                "expected a JSON array of records",
            ));
        };

        let mut columns: Vec<String> = Vec::new();
        for record in records {
            let Some(obj) = record.as_object() else {
                return Err(NetrankError::invalid_input(
                    "table",
                    "every record must be a JSON object",
                ));
            };
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| {
                columns
                    .iter()
                    .map(|c| obj.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Read a JSON records file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not records JSON.
    pub fn read_json_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| NetrankError::io(path, e))?;
        let value: Value = serde_json::from_reader(std::io::BufReader::new(file))?;
        Self::from_records(&value)
    }
}

/// Render a cell for CSV and text output. Strings are written raw, `null`
/// as the empty string, everything else in its JSON form.
#[must_use]
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn infer_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    match raw {
        "true" | "True" => Value::Bool(true),
        "false" | "False" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}
