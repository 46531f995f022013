// Integration tests for the `quillgrid` binary.
// Run with: cargo test -p quillgrid-cli --test cli_tests -- --nocapture

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use httpmock::prelude::*;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self { dir: tempfile::tempdir().unwrap() };
        fixture.write("settings.json", "{}");
        fixture
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_quillgrid"));
        cmd.arg("--config")
            .arg(self.path("settings.json"))
            .env("RUST_LOG", "off")
            .env_remove("QUILLGRID_MISTRAL_KEY")
            .env_remove("QUILLGRID_OPENAI_KEY");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("run quillgrid")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

const PEOPLE_CSV: &str = "Name,Age,City\nAlice,30,Paris\nBob,25,London\nCarol,41,Paris\n";

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_csv_json() {
    let fx = Fixture::new();
    let csv = fx.write("people.csv", PEOPLE_CSV);

    let output = fx.run(&["inspect", arg(&csv), "--json"]);
    assert!(output.status.success(), "exit code was {:?}", output.status);

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(value["kind"], "spreadsheet");
    assert_eq!(value["file"]["extension"], ".csv");
    assert_eq!(value["sheets"][0]["name"], "Sheet1");
    assert_eq!(value["sheets"][0]["metadata"]["totalRows"], 4);
    assert_eq!(value["sheets"][0]["metadata"]["totalColumns"], 3);
}

#[test]
fn inspect_text_document() {
    let fx = Fixture::new();
    let txt = fx.write("notes.txt", "hello world\n\nsecond paragraph here");

    let output = fx.run(&["inspect", arg(&txt)]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Type:      document"));
    assert!(text.contains("Reading:   1 min"));
}

#[test]
fn inspect_unsupported_type_exit_code() {
    let fx = Fixture::new();
    let pdf = fx.write("paper.pdf", "%PDF-1.4");

    let output = fx.run(&["inspect", arg(&pdf)]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported file type '.pdf'"));
}

#[test]
fn inspect_respects_size_limit_from_settings() {
    let fx = Fixture::new();
    fx.write("settings.json", r#"{ "file.maxFileSizeBytes": 10 }"#);
    let csv = fx.write("people.csv", PEOPLE_CSV);

    let output = fx.run(&["inspect", arg(&csv)]);
    assert_eq!(output.status.code(), Some(4));
}

// ---------------------------------------------------------------------------
// view
// ---------------------------------------------------------------------------

#[test]
fn view_sorts_and_searches() {
    let fx = Fixture::new();
    let csv = fx.write("people.csv", PEOPLE_CSV);

    let output = fx.run(&["view", arg(&csv), "--sort", "Age", "--desc", "--width", "6"]);
    assert!(output.status.success());
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Sheet: Sheet1 | sorted by Age desc");
    assert!(lines[3].starts_with("Carol"));
    assert!(lines[5].starts_with("Bob"));

    let output = fx.run(&["view", arg(&csv), "--search", "paris"]);
    let text = stdout(&output);
    assert!(text.contains("Alice"));
    assert!(!text.contains("Bob"));
    assert!(text.contains("2 of 3 rows match"));
}

#[test]
fn view_unknown_column_is_usage_error() {
    let fx = Fixture::new();
    let csv = fx.write("people.csv", PEOPLE_CSV);

    let output = fx.run(&["view", arg(&csv), "--sort", "Salary"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("columns: A (Name), B (Age), C (City)"));
}

#[test]
fn view_missing_sheet_exit_code() {
    let fx = Fixture::new();
    let csv = fx.write("people.csv", PEOPLE_CSV);

    let output = fx.run(&["view", arg(&csv), "--sheet", "Totals"]);
    assert_eq!(output.status.code(), Some(7));
}

// ---------------------------------------------------------------------------
// convert / toc
// ---------------------------------------------------------------------------

#[test]
fn convert_csv_to_json_file() {
    let fx = Fixture::new();
    let csv = fx.write("people.csv", PEOPLE_CSV);
    let out = fx.path("people.json");

    let output = fx.run(&["convert", arg(&csv), "-t", "json", "-o", arg(&out)]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["sheetNames"][0], "Sheet1");
    assert_eq!(value["sheets"][0]["data"][1][1], 30.0);
}

#[test]
fn convert_semicolon_csv_to_csv() {
    let fx = Fixture::new();
    let csv = fx.write("eu.csv", "Item;Note\nPen;\"red, blue\"\n");

    let output = fx.run(&["convert", arg(&csv), "-t", "csv"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Item,Note\nPen,\"red, blue\"\n");
}

#[test]
fn convert_text_to_html() {
    let fx = Fixture::new();
    let txt = fx.write("notes.txt", "a & b\nnext");

    let output = fx.run(&["convert", arg(&txt), "-t", "html"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "<p>a &amp; b<br>next</p>\n");

    let output = fx.run(&["convert", arg(&txt), "-t", "csv"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn toc_lists_placeholder_heading() {
    let fx = Fixture::new();
    let doc = fx.write("old.doc", "binary");

    let output = fx.run(&["toc", arg(&doc), "--json"]);
    assert!(output.status.success());
    let headings: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(headings.len(), 1);
    assert_eq!(headings[0]["id"], "heading-0");
    assert_eq!(headings[0]["text"], "Document: old.doc");
}

// ---------------------------------------------------------------------------
// edit
// ---------------------------------------------------------------------------

#[test]
fn edit_session_over_stdin() {
    let fx = Fixture::new();
    let txt = fx.write("draft.txt", "first line");
    let saved = fx.path("draft.html");

    let mut child = fx
        .cmd()
        .args(["edit", arg(&txt), "--debounce-ms", "60000"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let script = format!("added\n:flush\n:undo\n:redo\n:history\n:save {}\n:quit\n", arg(&saved));
    child.stdin.take().unwrap().write_all(script.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("committed 2/2"));
    assert!(text.contains("undo -> 1/2"));
    assert!(text.contains("redo -> 2/2"));
    assert!(text.contains("History: 2/2 (undo: yes, redo: no, pending: no)"));
    assert_eq!(fs::read_to_string(&saved).unwrap(), "<p>first line</p><p>added</p>");
}

// ---------------------------------------------------------------------------
// ai
// ---------------------------------------------------------------------------

#[test]
fn ai_doctor_disabled_by_default() {
    let fx = Fixture::new();
    let output = fx.run(&["ai", "doctor", "--json"]);
    assert_eq!(output.status.code(), Some(10));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["status"], "disabled");
    assert_eq!(value["provider"], "none");
}

#[test]
fn ai_set_provider_updates_settings() {
    let fx = Fixture::new();
    let output = fx.run(&["ai", "set-provider", "openai", "--model", "gpt-4o"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "AI provider: openai (model: gpt-4o)\n");

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fx.path("settings.json")).unwrap()).unwrap();
    assert_eq!(saved["ai"]["provider"], "openai");
    assert_eq!(saved["ai"]["model"], "gpt-4o");

    let output = fx.run(&["ai", "set-provider", "claude"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn ai_rewrite_against_mock_provider() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("Authorization", "Bearer env-key");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "Bonjour" } }]
            }));
    });

    let fx = Fixture::new();
    fx.write(
        "settings.json",
        &format!(
            r#"{{ "ai": {{ "provider": "mistral", "endpoint": "{}" }} }}"#,
            server.url("/v1/chat/completions")
        ),
    );

    let output = fx
        .cmd()
        .env("QUILLGRID_MISTRAL_KEY", "env-key")
        .args(["ai", "rewrite", "translate", "Good morning", "--arg", "French"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "Bonjour\n");
    mock.assert();
}

#[test]
fn ai_rewrite_rejects_blank_selection() {
    let fx = Fixture::new();
    fx.write("settings.json", r#"{ "ai": { "provider": "mistral" } }"#);

    let output = fx
        .cmd()
        .env("QUILLGRID_MISTRAL_KEY", "env-key")
        .args(["ai", "rewrite", "improve", "   "])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(13));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Selected text is empty"));
}
