use std::collections::HashSet;
use std::io::{Read, Write};

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::ImportError;

/// An in-memory table of string-typed, nullable cells. A `None` cell is a
/// missing value: empty CSV cells, JSON nulls, and empty spreadsheet cells
/// all read as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Appends a row, padding or truncating it to the current column count.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Appends a derived column. The value count must match the row count.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<String>>,
    ) -> Result<(), ImportError> {
        if values.len() != self.rows.len() {
            return Err(ImportError::Processing(format!(
                "Column value count {} does not match row count {}",
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Replaces the values of an existing column in place.
    pub fn set_column(&mut self, index: usize, values: Vec<Option<String>>) {
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value;
        }
    }

    /// Builds a new table from `(new_name, source_index)` picks, in pick
    /// order. Used by schema reconciliation to rename and reorder columns.
    pub fn select(&self, picks: &[(String, usize)]) -> Table {
        let columns = picks.iter().map(|(name, _)| name.clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| picks.iter().map(|(_, idx)| row[*idx].clone()).collect())
            .collect();
        Table { columns, rows }
    }

    /// Drops rows containing a missing value in any column. Returns the
    /// number of rows removed.
    pub fn drop_incomplete_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| row.iter().all(|cell| cell.is_some()));
        before - self.rows.len()
    }

    /// Drops exact-duplicate rows, keeping the first occurrence. Returns the
    /// number of rows removed.
    pub fn dedup_rows(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: HashSet<Vec<Option<String>>> = HashSet::new();
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    /// Row sanitation: missing-value removal strictly before duplicate
    /// removal, so rows differing only in an already-dropped incomplete
    /// field do not collapse. Returns `(incomplete, duplicates)` counts.
    pub fn sanitize(&mut self) -> (usize, usize) {
        let incomplete = self.drop_incomplete_rows();
        let duplicates = self.dedup_rows();
        (incomplete, duplicates)
    }

    /// Unions another table's rows into this one. The combined column set is
    /// this table's columns followed by the other's new columns (first
    /// occurrence wins); rows are realigned by column name with absent cells
    /// as `None`. Duplicate removal is left to the caller.
    pub fn union(&self, other: &Table) -> Table {
        let mut columns = self.columns.clone();
        for column in &other.columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }

        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        for row in &self.rows {
            rows.push(realign(&columns, &self.columns, row));
        }
        for row in &other.rows {
            rows.push(realign(&columns, &other.columns, row));
        }

        Table { columns, rows }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Table, ImportError> {
        let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut table = Table::new(columns);
        for record in csv_reader.records() {
            let record = record?;
            if record.len() > table.columns.len() {
                tracing::warn!(
                    "Skipping row with {} cells (expected {})",
                    record.len(),
                    table.columns.len()
                );
                continue;
            }
            let row = record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            table.push_row(row);
        }
        Ok(table)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ImportError> {
        let mut csv_writer = WriterBuilder::new().from_writer(writer);
        csv_writer.write_record(&self.columns)?;
        for row in &self.rows {
            csv_writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn realign(
    target: &[String],
    source: &[String],
    row: &[Option<String>],
) -> Vec<Option<String>> {
    target
        .iter()
        .map(|column| {
            source
                .iter()
                .position(|c| c == column)
                .and_then(|idx| row.get(idx).cloned().unwrap_or(None))
        })
        .collect()
}
