//! Header-checked tabular view over a worksheet.
//!
//! The first row holds column names. Columns are looked up by name once,
//! when a typed reader is built; rows are then read by index.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

use crate::error::{WorkbookError, WorkbookResult};

/// Rows of one worksheet below a header row.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: &'static str,
    headers: Vec<String>,
    rows: Vec<Vec<Data>>,
}

impl Table {
    /// Builds a table from a header row and data rows.
    pub fn new(name: &'static str, headers: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        Self {
            name,
            headers,
            rows,
        }
    }

    /// Reads the first worksheet of a workbook (`.xlsx`, `.xls`, `.ods`).
    pub fn open(name: &'static str, path: &Path) -> WorkbookResult<Self> {
        let mut workbook = open_workbook_auto(path).map_err(|source| WorkbookError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| WorkbookError::NoWorksheet {
                path: path.to_path_buf(),
            })?
            .map_err(|source| WorkbookError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let table = Self::from_range(name, &range);
        debug!(
            table = name,
            path = %path.display(),
            rows = table.rows.len(),
            "Loaded table"
        );
        Ok(table)
    }

    pub fn from_range(name: &'static str, range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|header| {
                header
                    .iter()
                    .map(|cell| cell_text(cell).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        let rows = rows.map(<[Data]>::to_vec).collect();
        Self::new(name, headers, rows)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Index of a required column. Header names are compared trimmed.
    pub fn column(&self, column: &'static str) -> WorkbookResult<usize> {
        self.headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or(WorkbookError::SchemaMismatch {
                table: self.name,
                column,
            })
    }

    /// Data rows that contain at least one value, with their 1-based sheet
    /// row number (the header is row 1).
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|cell| cell_text(cell).is_some()))
            .map(|(i, cells)| Record {
                table: self.name,
                row: i + 2,
                cells,
            })
    }
}

/// One data row.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'static str,
    row: usize,
    cells: &'a [Data],
}

impl<'a> Record<'a> {
    pub fn row(&self) -> usize {
        self.row
    }

    /// Cell text, or `None` for a blank or error cell.
    pub fn text(&self, index: usize) -> Option<String> {
        self.cells.get(index).and_then(cell_text)
    }

    /// Cell text, failing on a blank cell.
    pub fn required(&self, index: usize, column: &'static str) -> WorkbookResult<String> {
        self.text(index)
            .ok_or_else(|| self.invalid(column, "value is missing"))
    }

    /// Non-negative whole number.
    pub fn count(&self, index: usize, column: &'static str) -> WorkbookResult<u32> {
        match self.cells.get(index) {
            Some(Data::Int(n)) => {
                u32::try_from(*n).map_err(|_| self.invalid(column, format!("{n} is not a valid count")))
            }
            Some(Data::Float(f)) if f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX) => {
                Ok(*f as u32)
            }
            Some(Data::Float(f)) => Err(self.invalid(column, format!("{f} is not a valid count"))),
            _ => {
                let text = self.required(index, column)?;
                text.parse::<u32>()
                    .map_err(|_| self.invalid(column, format!("'{text}' is not a valid count")))
            }
        }
    }

    pub fn invalid(&self, column: &'static str, reason: impl Into<String>) -> WorkbookError {
        WorkbookError::InvalidCell {
            table: self.table,
            row: self.row,
            column,
            reason: reason.into(),
        }
    }
}

/// Text form of a cell.
///
/// Whole floats print without a fraction so numeric room and roll numbers
/// read back as written. Date cells print as `YYYY-MM-DD HH:MM:SS`.
pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
