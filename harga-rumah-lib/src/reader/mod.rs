use std::io::Cursor;
use std::path::Path;

use serde_json::Value;

use crate::error::ImportError;
use crate::excel::ExcelReader;
use crate::table::Table;

/// The closed set of accepted upload formats. Anything else fails with
/// [`ImportError::UnsupportedFormat`] before any decoding happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Spreadsheet,
    Json,
}

impl UploadFormat {
    pub fn from_tag(tag: &str) -> Result<Self, ImportError> {
        match tag.to_lowercase().as_str() {
            "csv" => Ok(UploadFormat::Csv),
            "xlsx" | "spreadsheet" => Ok(UploadFormat::Spreadsheet),
            "json" => Ok(UploadFormat::Json),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_extension(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ImportError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_tag(extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFormat::Csv => "csv",
            UploadFormat::Spreadsheet => "xlsx",
            UploadFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for UploadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes an uploaded byte stream into a table of raw cells.
pub fn read_table(bytes: &[u8], format: UploadFormat) -> Result<Table, ImportError> {
    match format {
        UploadFormat::Csv => Table::from_csv_reader(bytes),
        UploadFormat::Spreadsheet => {
            ExcelReader::new(Cursor::new(bytes))?.get_first_sheet_as_table()
        }
        UploadFormat::Json => read_json_table(bytes),
    }
}

/// A JSON upload is an array of flat objects; the column set is the union of
/// the object keys, and `null` values are missing cells.
fn read_json_table(bytes: &[u8]) -> Result<Table, ImportError> {
    let records: Vec<serde_json::Map<String, Value>> = serde_json::from_slice(bytes)?;

    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns);
    for record in &records {
        let row = table
            .columns()
            .iter()
            .map(|column| record.get(column).and_then(json_cell))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

fn json_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
