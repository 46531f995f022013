// CSV/TSV import

use std::io::Read;
use std::path::Path;

use quillgrid_engine::{CellValue, Sheet, Workbook};

use crate::error::FileError;

/// Sheet name given to delimited text imports
pub const CSV_SHEET_NAME: &str = "Sheet1";

pub fn import(path: &Path, max_rows: usize) -> Result<Workbook, FileError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    let sheet = import_from_string(&content, delimiter, max_rows)?;
    Ok(Workbook::new(vec![sheet]))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // More columns break ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read a text file, decoding as Windows-1252 when it is not valid UTF-8
/// (common for Excel-exported CSVs). A UTF-8 BOM is dropped.
pub fn read_file_as_utf8(path: &Path) -> Result<String, FileError> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, delimiter: u8, max_rows: usize) -> Result<Sheet, FileError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    let mut total_rows = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| FileError::Parse(format!("CSV parse error: {}", e)))?;
        total_rows += 1;
        if rows.len() < max_rows {
            rows.push(record.iter().map(CellValue::from_input).collect());
        }
    }

    Ok(Sheet::new(CSV_SHEET_NAME, rows, total_rows))
}
