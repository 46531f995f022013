// CSV and JSON export

use std::path::Path;

use serde::Serialize;

use quillgrid_engine::{CellValue, Sheet, SheetMeta, Workbook};

use crate::error::FileError;

/// Render a sheet as comma-separated text.
///
/// Cells hold their raw (unformatted) values; fields containing a comma,
/// quote or line break are quoted. Rows end with `\n`.
pub fn export_csv(sheet: &Sheet) -> Result<String, FileError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in sheet.rows() {
        let record: Vec<String> = row.iter().map(CellValue::raw_string).collect();
        writer
            .write_record(&record)
            .map_err(|e| FileError::Parse(format!("CSV conversion failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| FileError::Parse(format!("CSV conversion failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| FileError::Parse(format!("CSV conversion failed: {}", e)))
}

pub fn write_csv(sheet: &Sheet, path: &Path) -> Result<(), FileError> {
    std::fs::write(path, export_csv(sheet)?)?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetJson<'a> {
    name: &'a str,
    data: &'a [Vec<CellValue>],
    metadata: SheetMeta,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkbookJson<'a> {
    sheet_names: Vec<&'a str>,
    sheets: Vec<SheetJson<'a>>,
}

/// Serialize every sheet with its rows and import metadata
pub fn export_json(workbook: &Workbook, pretty: bool) -> Result<String, FileError> {
    let doc = WorkbookJson {
        sheet_names: workbook.sheet_names(),
        sheets: workbook
            .sheets()
            .iter()
            .map(|sheet| SheetJson {
                name: &sheet.name,
                data: sheet.rows(),
                metadata: sheet.meta(),
            })
            .collect(),
    };

    let result = if pretty {
        serde_json::to_string_pretty(&doc)
    } else {
        serde_json::to_string(&doc)
    };
    result.map_err(|e| FileError::Parse(format!("JSON conversion failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample() -> Sheet {
        Sheet::from_rows(
            "Data",
            vec![
                vec![text("Name"), text("Note")],
                vec![text("Doe, Jane"), text("said \"hi\"")],
                vec![text("Bob"), CellValue::Number(1500.0)],
            ],
            100,
        )
    }

    #[test]
    fn test_export_csv_quotes_special_fields() {
        let csv = export_csv(&sample()).unwrap();
        assert_eq!(csv, "Name,Note\n\"Doe, Jane\",\"said \"\"hi\"\"\"\nBob,1500\n");
    }

    #[test]
    fn test_export_json_shape() {
        let workbook = Workbook::new(vec![sample()]);
        let json = export_json(&workbook, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sheetNames"][0], "Data");
        assert_eq!(value["sheets"][0]["data"][2][1], 1500.0);
        assert_eq!(value["sheets"][0]["metadata"]["totalRows"], 3);
        assert_eq!(value["sheets"][0]["metadata"]["truncated"], false);

        let pretty = export_json(&workbook, true).unwrap();
        assert!(pretty.contains("\n  \"sheetNames\""));
    }
}
