use std::fs;
use std::io::Write;

use tempfile::tempdir;
use zip::write::SimpleFileOptions;

use quillgrid_engine::CellValue;
use quillgrid_io::{
    import_document, import_spreadsheet, process_file, FileContent, FileError, FileKind, ImportOptions,
};

fn write_docx(path: &std::path::Path, body: &str) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[test]
fn test_semicolon_csv_import() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.csv");
    fs::write(&path, "Name;Age;City\nAlice;30;Paris\nBob;25;London\n").unwrap();

    let workbook = import_spreadsheet(&path, 100).unwrap();
    let sheet = workbook.first_sheet().unwrap();
    assert_eq!(sheet.name, "Sheet1");
    assert_eq!(sheet.cell(0, 2).display(), "City");
    assert_eq!(sheet.cell(1, 1), &CellValue::Number(30.0));
    assert_eq!(sheet.cell(2, 0).display(), "Bob");
}

#[test]
fn test_windows_1252_csv_import() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.csv");
    // "Café" with 0xE9 for é
    fs::write(&path, b"Name,Place\nJo,Caf\xe9\n").unwrap();

    let workbook = import_spreadsheet(&path, 100).unwrap();
    let sheet = workbook.first_sheet().unwrap();
    assert_eq!(sheet.cell(1, 1).display(), "Caf\u{e9}");
}

#[test]
fn test_xlsx_import_multiple_sheets() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.xlsx");

    let mut book = rust_xlsxwriter::Workbook::new();
    let people = book.add_worksheet();
    people.set_name("People").unwrap();
    people.write_string(0, 0, "Name").unwrap();
    people.write_string(0, 1, "Score").unwrap();
    people.write_string(1, 0, "Alice").unwrap();
    people.write_number(1, 1, 1234.5).unwrap();
    people.write_string(2, 0, "Bob").unwrap();
    people.write_boolean(2, 1, true).unwrap();
    let totals = book.add_worksheet();
    totals.set_name("Totals").unwrap();
    for row in 0..20u32 {
        totals.write_number(row, 0, row as f64).unwrap();
    }
    book.save(&path).unwrap();

    let workbook = import_spreadsheet(&path, 10).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["People", "Totals"]);

    let people = workbook.sheet_by_name("People").unwrap();
    assert_eq!(people.cell(1, 1).display(), "1,234.5");
    assert_eq!(people.cell(2, 1).display(), "Yes");

    let totals = workbook.sheet_by_name("Totals").unwrap().meta();
    assert_eq!(totals.total_rows, 20);
    assert_eq!(totals.displayed_rows, 10);
    assert!(totals.truncated);
}

#[test]
fn test_docx_import_builds_toc() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.docx");
    write_docx(
        &path,
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Summary</w:t></w:r></w:p><w:p><w:r><w:t>Sales grew.</w:t></w:r></w:p><w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Regions</w:t></w:r></w:p>"#,
    );

    let doc = import_document(&path).unwrap();
    assert_eq!(
        doc.html,
        r#"<h1 id="heading-0">Summary</h1><p>Sales grew.</p><h2 id="heading-1">Regions</h2>"#
    );
    assert_eq!(doc.headings.len(), 2);
    assert_eq!(doc.headings[1].level, 2);
    assert!(doc.plain_text.contains("Sales grew."));
    assert!(doc.supported);
}

#[test]
fn test_txt_and_rtf_import() {
    let dir = tempdir().unwrap();
    let txt = dir.path().join("notes.txt");
    fs::write(&txt, "line one\nline two\n\nsecond para").unwrap();
    let doc = import_document(&txt).unwrap();
    assert_eq!(doc.html, "<p>line one<br>line two</p><p>second para</p>");
    assert!(doc.messages.is_empty());

    let rtf = dir.path().join("memo.rtf");
    fs::write(&rtf, r"{\rtf1\ansi \b Bold\b0  text\par}").unwrap();
    let doc = import_document(&rtf).unwrap();
    assert_eq!(doc.html, "<p><strong>Bold</strong> text</p>");
    assert_eq!(doc.messages.len(), 1);
}

#[test]
fn test_doc_is_placeholder() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.doc");
    fs::write(&path, b"\xd0\xcf\x11\xe0 binary").unwrap();

    let doc = import_document(&path).unwrap();
    assert!(!doc.supported);
    assert_eq!(doc.headings.len(), 1);
    assert_eq!(doc.messages, vec!["DOC format requires conversion to DOCX"]);
}

#[test]
fn test_process_file_dispatch_and_limits() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    fs::write(&csv, "a,b\n1,2\n").unwrap();

    let processed = process_file(&csv, &ImportOptions::default()).unwrap();
    assert_eq!(processed.kind, FileKind::Spreadsheet);
    assert_eq!(processed.metadata.extension, ".csv");
    assert_eq!(processed.metadata.size, 8);
    assert!(matches!(processed.content, FileContent::Spreadsheet(_)));

    let options = ImportOptions { max_file_size: 4, ..ImportOptions::default() };
    assert!(matches!(process_file(&csv, &options), Err(FileError::TooLarge { .. })));

    let pdf = dir.path().join("paper.pdf");
    fs::write(&pdf, "%PDF").unwrap();
    assert!(matches!(
        process_file(&pdf, &ImportOptions::default()),
        Err(FileError::UnsupportedType(_))
    ));
}

#[test]
fn test_malformed_docx_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.docx");
    fs::write(&path, "not a zip").unwrap();
    assert!(matches!(import_document(&path), Err(FileError::Parse(_))));
}
