use serde::Serialize;

use crate::cell::CellValue;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Size information recorded when a sheet is imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMeta {
    /// Rows present in the source, before truncation
    pub total_rows: usize,
    /// Rows kept in memory
    pub displayed_rows: usize,
    pub total_columns: usize,
    pub truncated: bool,
}

/// Rectangular block of cells. Row 0 is the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
    meta: SheetMeta,
}

impl Sheet {
    /// Build a sheet from ragged rows, keeping at most `max_rows` rows
    /// (header included).
    pub fn from_rows(name: impl Into<String>, mut rows: Vec<Vec<CellValue>>, max_rows: usize) -> Self {
        let total_rows = rows.len();
        rows.truncate(max_rows);
        Self::new(name, rows, total_rows)
    }

    /// Build a sheet from rows already cut down by the reader. `total_rows`
    /// is the row count of the source; every row is padded to the widest
    /// row's width.
    pub fn new(name: impl Into<String>, mut rows: Vec<Vec<CellValue>>, total_rows: usize) -> Self {
        let name = name.into();
        let truncated = total_rows > rows.len();
        if truncated {
            log::debug!("sheet '{}': keeping {} of {} rows", name, rows.len(), total_rows);
        }

        let total_columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(total_columns, CellValue::Empty);
        }

        let meta = SheetMeta {
            total_rows: total_rows.max(rows.len()),
            displayed_rows: rows.len(),
            total_columns,
            truncated,
        };

        Self { name, rows, meta }
    }

    pub fn meta(&self) -> SheetMeta {
        self.meta
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.meta.total_columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> &[CellValue] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows after the header
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}
