// Excel import (xlsx, xls) via calamine

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use quillgrid_engine::{CellValue, Sheet, Workbook};

use crate::error::FileError;

/// Import every sheet, keeping at most `max_rows` rows of each.
///
/// Rows are read from the sheet's used range, so blank rows inside the
/// range are kept and leading blank rows before it are not.
pub fn import(path: &Path, max_rows: usize) -> Result<Workbook, FileError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| FileError::Parse(format!("Failed to open Excel file: {}", e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(FileError::NoSheets);
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| FileError::Parse(format!("Failed to read sheet '{}': {}", sheet_name, e)))?;

        let (height, _) = range.get_size();
        let rows: Vec<Vec<CellValue>> = range
            .rows()
            .take(max_rows)
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        if height > max_rows {
            log::warn!(
                "sheet '{}' truncated from {} to {} rows",
                sheet_name,
                height,
                max_rows
            );
        }

        sheets.push(Sheet::new(sheet_name.as_str(), rows, height));
    }

    Ok(Workbook::new(sheets))
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => {
            // 1900 date system assumed
            let serial = dt.as_f64();
            match excel_serial_to_datetime(serial) {
                Some(value) => CellValue::DateTime(value),
                None => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Convert an Excel serial date (days since 1899-12-30) to a timestamp,
/// rounded to the millisecond.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
