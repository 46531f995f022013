// Quillgrid CLI - headless document and spreadsheet operations

mod ai;
mod edit;
mod exit_codes;
mod files;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use quillgrid_ai::AiError;
use quillgrid_config::Settings;
use quillgrid_io::{FileError, ImportOptions};

use exit_codes::{ai_exit_code, file_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "quillgrid")]
#[command(about = "Document and spreadsheet viewer/editor with AI-assisted rewriting (headless)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Settings file (default: <config dir>/quillgrid/settings.json)
    #[arg(long, global = true, env = "QUILLGRID_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a file and print its metadata and statistics
    #[command(after_help = "\
Examples:
  quillgrid inspect sales.xlsx
  quillgrid inspect report.docx --json")]
    Inspect {
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a spreadsheet as a table, optionally searched and sorted
    #[command(after_help = "\
Examples:
  quillgrid view sales.xlsx
  quillgrid view sales.xlsx --sheet Q2 --search paris
  quillgrid view people.csv --sort Age --desc --max-rows 50")]
    View {
        file: PathBuf,

        /// Sheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Case-insensitive text to match in any cell
        #[arg(long)]
        search: Option<String>,

        /// Column to sort by: header name, 1-based number or letter
        #[arg(long, value_name = "COL")]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Data rows shown (default: viewer.maxTableRows)
        #[arg(long)]
        max_rows: Option<usize>,

        /// Column width in characters
        #[arg(long, default_value = "16")]
        width: usize,
    },

    /// Convert a spreadsheet to CSV/JSON or a document to HTML/text
    #[command(after_help = "\
Examples:
  quillgrid convert sales.xlsx -t csv --sheet Q2
  quillgrid convert sales.xlsx -t json -o sales.json
  quillgrid convert notes.docx -t html")]
    Convert {
        file: PathBuf,

        /// Output format
        #[arg(long, short = 't')]
        to: Format,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Sheet name for CSV output (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// List the headings of a document
    Toc {
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Line-oriented editing session with undo/redo and AI rewrites
    #[command(after_help = "\
Lines not starting with ':' are appended to the document as paragraphs.
Edits are committed to history after editor.debounceMs of quiet, or on :flush.

Commands:
  :set <html>                 replace the whole document (typed edit)
  :undo / :redo               navigate history
  :flush                      commit the pending edit now
  :ai <action>[:arg] <text>   ask for a rewrite of <text>
  :apply / :discard           apply or drop the last suggestion
  :show  :stats  :history     inspect the document
  :save <path>                write the HTML
  :quit                       end the session")]
    Edit {
        /// Document to open (docx, txt, rtf); omit to start empty
        file: Option<PathBuf>,

        /// Override editor.debounceMs
        #[arg(long)]
        debounce_ms: Option<u64>,
    },

    /// AI assistant configuration and one-shot rewrites
    Ai {
        #[command(subcommand)]
        command: ai::AiCommands,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
    Html,
    Text,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref());

    let result = match cli.command {
        None => {
            eprintln!("Usage: quillgrid <command> [options]");
            eprintln!("       quillgrid --help for more information");
            Ok(())
        }
        Some(Commands::Inspect { file, json }) => files::cmd_inspect(&file, json, &settings),
        Some(Commands::View {
            file,
            sheet,
            search,
            sort,
            desc,
            max_rows,
            width,
        }) => files::cmd_view(
            &file,
            files::ViewArgs {
                sheet,
                search,
                sort,
                desc,
                max_rows: max_rows.unwrap_or(settings.max_table_rows),
                width,
            },
            &settings,
        ),
        Some(Commands::Convert {
            file,
            to,
            output,
            sheet,
            compact,
        }) => files::cmd_convert(&file, to, output.as_deref(), sheet.as_deref(), !compact, &settings),
        Some(Commands::Toc { file, json }) => files::cmd_toc(&file, json),
        Some(Commands::Edit { file, debounce_ms }) => edit::cmd_edit(file.as_deref(), debounce_ms, &settings),
        Some(Commands::Ai { command }) => ai::cmd_ai(command, &settings, cli.config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn load_settings(path: Option<&Path>) -> Settings {
    match path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
}

pub(crate) fn import_options(settings: &Settings) -> ImportOptions {
    ImportOptions {
        max_file_size: settings.max_file_size_bytes,
        max_rows: settings.max_import_rows,
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_FILE_IO, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<FileError> for CliError {
    fn from(err: FileError) -> Self {
        let hint = match &err {
            FileError::UnsupportedType(_) => {
                Some("supported: .xlsx .xls .csv .docx .doc .txt .rtf".to_string())
            }
            FileError::TooLarge { .. } => Some("raise file.maxFileSizeBytes in settings.json".to_string()),
            _ => None,
        };
        Self { code: file_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<AiError> for CliError {
    fn from(err: AiError) -> Self {
        let hint = match &err {
            AiError::NotConfigured => Some("quillgrid ai set-provider mistral".to_string()),
            AiError::MissingKey(_) | AiError::InvalidKey(_) => {
                Some("quillgrid ai set-key <provider> < key.txt".to_string())
            }
            _ => None,
        };
        Self { code: ai_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::io(err.to_string())
    }
}
