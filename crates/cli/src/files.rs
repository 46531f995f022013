//! File commands: `inspect`, `view`, `convert`, `toc`.

use std::io::{self, Write};
use std::path::Path;

use serde_json::json;

use quillgrid_config::Settings;
use quillgrid_engine::{Sheet, SheetView, SortDirection, Workbook};
use quillgrid_io::{
    export_csv, export_json, import_document, process_file, FileContent, FileError, ProcessedDocument,
    ProcessedFile,
};

use crate::util::{col_to_letter, pad_right, resolve_column};
use crate::{import_options, CliError, Format};

/// Pick `name` (case-insensitive) or the first sheet.
pub(crate) fn select_sheet<'a>(workbook: &'a Workbook, name: Option<&str>) -> Result<&'a Sheet, FileError> {
    match name {
        Some(name) => workbook
            .sheet_by_name(name)
            .ok_or_else(|| FileError::SheetNotFound(name.to_string())),
        None => workbook.first_sheet().ok_or(FileError::NoSheets),
    }
}

fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

// ============================================================================
// inspect
// ============================================================================

pub fn cmd_inspect(path: &Path, json: bool, settings: &Settings) -> Result<(), CliError> {
    let file = process_file(path, &import_options(settings))?;

    if json {
        let output = inspect_json(&file);
        let text = serde_json::to_string_pretty(&output).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    let mut out = io::stdout().lock();
    write_inspect(&mut out, &file)?;
    Ok(())
}

fn inspect_json(file: &ProcessedFile) -> serde_json::Value {
    let mut output = json!({
        "file": file.metadata,
        "kind": file.kind,
    });
    match &file.content {
        FileContent::Spreadsheet(workbook) => {
            output["sheets"] = workbook
                .sheets()
                .iter()
                .map(|sheet| json!({ "name": sheet.name, "metadata": sheet.meta() }))
                .collect();
        }
        FileContent::Document(doc) => {
            output["document"] = json!({
                "stats": doc.stats,
                "readingTimeMinutes": doc.reading_time_minutes,
                "headings": doc.headings.len(),
                "messages": doc.messages,
                "supported": doc.supported,
            });
        }
    }
    output
}

fn write_inspect(out: &mut impl Write, file: &ProcessedFile) -> io::Result<()> {
    let meta = &file.metadata;
    writeln!(out, "File:      {}", meta.name)?;
    writeln!(out, "Size:      {}", format_size(meta.size))?;
    if let Some(modified) = meta.last_modified {
        writeln!(out, "Modified:  {}", modified.format("%Y-%m-%d %H:%M"))?;
    }

    match &file.content {
        FileContent::Spreadsheet(workbook) => {
            writeln!(out, "Type:      spreadsheet")?;
            writeln!(out, "Sheets:    {}", workbook.sheet_count())?;
            for sheet in workbook.sheets() {
                let m = sheet.meta();
                if m.truncated {
                    writeln!(
                        out,
                        "  {}  {} of {} rows x {} cols (truncated)",
                        sheet.name, m.displayed_rows, m.total_rows, m.total_columns
                    )?;
                } else {
                    writeln!(out, "  {}  {} rows x {} cols", sheet.name, m.total_rows, m.total_columns)?;
                }
            }
        }
        FileContent::Document(doc) => {
            writeln!(out, "Type:      document")?;
            writeln!(out, "Words:     {}", doc.stats.words)?;
            writeln!(out, "Chars:     {}", doc.stats.characters)?;
            writeln!(out, "Reading:   {} min", doc.reading_time_minutes)?;
            writeln!(out, "Headings:  {}", doc.headings.len())?;
            if !doc.supported {
                writeln!(out, "Support:   placeholder only")?;
            }
            for message in &doc.messages {
                writeln!(out, "Note:      {}", message)?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// view
// ============================================================================

pub struct ViewArgs {
    pub sheet: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub desc: bool,
    pub max_rows: usize,
    pub width: usize,
}

pub fn cmd_view(path: &Path, args: ViewArgs, settings: &Settings) -> Result<(), CliError> {
    let file = process_file(path, &import_options(settings))?;
    let workbook = match &file.content {
        FileContent::Spreadsheet(workbook) => workbook,
        FileContent::Document(_) => {
            return Err(CliError::args("view works on spreadsheets").with_hint("use `quillgrid convert -t text` for documents"))
        }
    };
    let sheet = select_sheet(workbook, args.sheet.as_deref())?;

    let mut view = SheetView::new(sheet, args.max_rows);
    if let Some(term) = &args.search {
        view.set_search(term);
    }
    if let Some(spec) = &args.sort {
        let column = resolve_column(spec, view.headers()).ok_or_else(|| {
            let columns: Vec<String> = view
                .headers()
                .iter()
                .enumerate()
                .map(|(i, h)| format!("{} ({})", col_to_letter(i), h.display()))
                .collect();
            CliError::args(format!("unknown column '{}'", spec)).with_hint(format!("columns: {}", columns.join(", ")))
        })?;
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        view.sort_by(column, direction);
    }

    let mut out = io::stdout().lock();
    render_view(&mut out, &view, args.width.max(3))?;
    Ok(())
}

fn render_view(out: &mut impl Write, view: &SheetView<'_>, width: usize) -> io::Result<()> {
    let sheet = view.sheet();
    let mut title = format!("Sheet: {}", sheet.name);
    if let Some(state) = view.sort_state() {
        let header = view.headers().get(state.column).map(|h| h.display()).unwrap_or_default();
        let dir = match state.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        title.push_str(&format!(" | sorted by {} {}", header, dir));
    }
    if !view.search().is_empty() {
        title.push_str(&format!(" | search \"{}\"", view.search()));
    }
    writeln!(out, "{}", title)?;

    if sheet.is_empty() {
        writeln!(out, "(empty sheet)")?;
        return Ok(());
    }

    let header: Vec<String> = view.headers().iter().map(|h| pad_right(&h.display(), width)).collect();
    writeln!(out, "{}", header.join(" | ").trim_end())?;
    let rule: Vec<String> = header.iter().map(|_| "-".repeat(width)).collect();
    writeln!(out, "{}", rule.join("-+-"))?;

    for row in view.visible_rows() {
        let cells: Vec<String> = row.iter().map(|c| pad_right(&c.display(), width)).collect();
        writeln!(out, "{}", cells.join(" | ").trim_end())?;
    }

    let total_data_rows = sheet.meta().total_rows.saturating_sub(1);
    writeln!(out)?;
    if view.search().is_empty() {
        writeln!(out, "{} of {} rows", view.visible_count(), total_data_rows)?;
    } else {
        writeln!(
            out,
            "{} of {} rows match (searched {})",
            view.visible_count(),
            total_data_rows,
            view.row_count()
        )?;
    }
    Ok(())
}

// ============================================================================
// convert
// ============================================================================

pub fn cmd_convert(
    path: &Path,
    to: Format,
    output: Option<&Path>,
    sheet: Option<&str>,
    pretty: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    let file = process_file(path, &import_options(settings))?;

    let text = match (&file.content, to) {
        (FileContent::Spreadsheet(workbook), Format::Csv) => export_csv(select_sheet(workbook, sheet)?)?,
        (FileContent::Spreadsheet(workbook), Format::Json) => export_json(workbook, pretty)?,
        (FileContent::Document(doc), Format::Html) => doc.html.clone(),
        (FileContent::Document(doc), Format::Text) => doc.plain_text.clone(),
        (FileContent::Document(doc), Format::Json) => document_json(doc, pretty)?,
        (FileContent::Spreadsheet(_), _) => {
            return Err(CliError::args("spreadsheets convert to csv or json"))
        }
        (FileContent::Document(_), _) => {
            return Err(CliError::args("documents convert to html, text or json"))
        }
    };

    match output {
        Some(path) if path != Path::new("-") => {
            std::fs::write(path, &text)
                .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))?;
            log::info!("wrote {} bytes to {}", text.len(), path.display());
        }
        _ => {
            let mut out = io::stdout().lock();
            out.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn document_json(doc: &ProcessedDocument, pretty: bool) -> Result<String, CliError> {
    let result = if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    };
    result.map_err(|e| CliError::general(format!("JSON conversion failed: {}", e)))
}

// ============================================================================
// toc
// ============================================================================

pub fn cmd_toc(path: &Path, json: bool) -> Result<(), CliError> {
    let doc = import_document(path)?;

    if json {
        let text = serde_json::to_string_pretty(&doc.headings).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    let mut out = io::stdout().lock();
    if doc.headings.is_empty() {
        writeln!(out, "(no headings)")?;
    }
    for heading in &doc.headings {
        let indent = "  ".repeat(usize::from(heading.level.saturating_sub(1)));
        writeln!(out, "{}{}  #{}", indent, heading.text, heading.id)?;
    }
    Ok(())
}
