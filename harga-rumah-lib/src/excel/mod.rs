use calamine::{DataType, Reader, Xlsx};
use std::io::{Read, Seek};

use crate::error::ImportError;
use crate::table::Table;

pub struct ExcelReader<R: Read + Seek> {
    workbook: Xlsx<R>,
}

impl<R: Read + Seek> ExcelReader<R> {
    pub fn new(reader: R) -> Result<Self, ImportError> {
        let workbook = Xlsx::new(reader).map_err(|e| {
            ImportError::Processing(format!("Failed to open Excel workbook: {}", e))
        })?;
        Ok(Self { workbook })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// Reads a worksheet into a table: first row becomes the column names,
    /// remaining rows become cells, with empty cells as missing values.
    pub fn get_sheet_as_table(&mut self, sheet_name: &str) -> Result<Table, ImportError> {
        let range = self.workbook.worksheet_range(sheet_name).map_err(|e| {
            ImportError::Processing(format!("Sheet '{sheet_name}' not found in workbook: {e}"))
        })?;

        let mut rows = range.rows();
        let columns: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(|cell| cell.to_string()).collect(),
            None => Vec::new(),
        };

        let mut table = Table::new(columns);
        for row in rows {
            let cells = row
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            table.push_row(cells);
        }
        Ok(table)
    }

    /// Reads the workbook's first sheet, which is where uploads land.
    pub fn get_first_sheet_as_table(&mut self) -> Result<Table, ImportError> {
        let sheet_name = self
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::Processing("Workbook has no sheets".to_string()))?;
        self.get_sheet_as_table(&sheet_name)
    }
}
