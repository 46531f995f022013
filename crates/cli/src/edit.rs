//! `quillgrid edit` - a line-oriented editing session over stdin.
//!
//! Stdin plays the editable surface: each plain line is typed into the
//! document and reported to the edit history as a raw edit. The history is
//! polled before every line, so commits land once the debounce window has
//! passed between inputs.

use std::io::{self, BufRead, Write};
use std::path::Path;

use quillgrid_ai::{Assistant, RewriteAction};
use quillgrid_config::{AISettings, ResolvedAIConfig, Settings};
use quillgrid_document::{escape_html, plain_text, reading_time_minutes, DocumentStats};
use quillgrid_history::{
    Clock, CommitOutcome, ContentSource, EditHistory, EditableSurface, HistoryConfig, RealClock, RenderStatus,
    SelectionTracker,
};
use quillgrid_io::import_document;

use crate::CliError;

/// Surface state for a terminal session
#[derive(Debug, Default)]
pub struct CliHost {
    /// What the user currently sees, including uncommitted typing
    surface: String,
    /// Counts for the last committed or restored content
    stats: DocumentStats,
    selection_saved: bool,
}

impl CliHost {
    fn new(initial: &str) -> Self {
        Self {
            surface: initial.to_string(),
            stats: DocumentStats::from_html(initial),
            selection_saved: false,
        }
    }
}

impl EditableSurface for CliHost {
    fn set_content(&mut self, content: &str) -> RenderStatus {
        self.surface = content.to_string();
        RenderStatus::Rendered
    }
}

impl SelectionTracker for CliHost {
    fn save_selection(&mut self) {
        self.selection_saved = true;
    }

    fn restore_selection(&mut self) {
        // A terminal has no caret to put back
        if self.selection_saved {
            log::trace!("selection restored");
        }
    }
}

impl ContentSource for CliHost {
    fn on_committed(&mut self, content: &str, stats: DocumentStats) {
        log::debug!("document now {} bytes", content.len());
        self.stats = stats;
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct Session<C: Clock = RealClock> {
    history: EditHistory<C>,
    host: CliHost,
    ai_settings: AISettings,
    assistant: Option<Assistant>,
    /// Text the current suggestion replaces
    ai_selection: Option<String>,
}

impl Session<RealClock> {
    pub fn new(initial: &str, config: HistoryConfig, ai_settings: AISettings) -> Self {
        Self::with_history(EditHistory::new(initial, config), initial, ai_settings)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_history(history: EditHistory<C>, initial: &str, ai_settings: AISettings) -> Self {
        Self {
            history,
            host: CliHost::new(initial),
            ai_settings,
            assistant: None,
            ai_selection: None,
        }
    }

    /// Read commands until `:quit` or end of input, then commit what is pending.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if let Some(outcome) = self.history.poll(&mut self.host) {
                self.report_commit(out, outcome)?;
            }
            if let Flow::Quit = self.handle_line(&line, out)? {
                break;
            }
        }
        self.flush_and_report(out)
    }

    fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let Some(command) = line.strip_prefix(':') else {
            let typed = format!("{}<p>{}</p>", self.host.surface, escape_html(line));
            self.type_content(typed);
            return Ok(Flow::Continue);
        };

        let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
        match name {
            "set" => self.type_content(rest.to_string()),
            "undo" => {
                self.flush_and_report(out)?;
                if self.history.undo(&mut self.host) {
                    self.report_position(out, "undo")?;
                } else {
                    writeln!(out, "nothing to undo")?;
                }
            }
            "redo" => {
                self.flush_and_report(out)?;
                if self.history.redo(&mut self.host) {
                    self.report_position(out, "redo")?;
                } else {
                    writeln!(out, "nothing to redo")?;
                }
            }
            "flush" => match self.history.flush(&mut self.host) {
                Some(outcome) => self.report_commit(out, outcome)?,
                None => writeln!(out, "nothing pending")?,
            },
            "ai" => self.run_ai(rest, out)?,
            "apply" => self.apply_suggestion(out)?,
            "discard" => {
                if let Some(assistant) = self.assistant.as_mut() {
                    assistant.clear_suggestion();
                }
                self.ai_selection = None;
                writeln!(out, "suggestion discarded")?;
            }
            "show" => writeln!(out, "{}", self.host.surface)?,
            "stats" => {
                let stats = DocumentStats::from_html(&self.host.surface);
                writeln!(
                    out,
                    "words: {}, characters: {}, reading time: {} min",
                    stats.words,
                    stats.characters,
                    reading_time_minutes(&self.host.surface)
                )?;
            }
            "history" => {
                let (position, len) = self.history.position();
                writeln!(
                    out,
                    "History: {}/{} (undo: {}, redo: {}, pending: {})",
                    position,
                    len,
                    yes_no(self.history.can_undo()),
                    yes_no(self.history.can_redo()),
                    yes_no(self.history.pending().is_some())
                )?;
            }
            "save" => self.save(rest.trim(), out)?,
            "quit" | "q" => return Ok(Flow::Quit),
            other => writeln!(out, "unknown command ':{}'", other)?,
        }
        Ok(Flow::Continue)
    }

    fn type_content(&mut self, content: String) {
        self.host.surface = content.clone();
        self.history.on_raw_edit(content, &mut self.host);
    }

    fn run_ai(&mut self, args: &str, out: &mut impl Write) -> io::Result<()> {
        let (spec, selection) = args.trim_start().split_once(' ').unwrap_or((args.trim(), ""));
        let (name, arg) = match spec.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (spec, None),
        };
        let action = match RewriteAction::parse(name, arg) {
            Ok(action) => action,
            Err(e) => return writeln!(out, "error: {}", e),
        };

        if self.assistant.is_none() {
            match Assistant::new(&ResolvedAIConfig::from_settings(&self.ai_settings)) {
                Ok(assistant) => self.assistant = Some(assistant),
                Err(e) => return writeln!(out, "error: {}", e),
            }
        }
        let Some(assistant) = self.assistant.as_mut() else {
            return Ok(());
        };

        let context = plain_text(&self.host.surface);
        match assistant.run(&action, selection, &context) {
            Ok(suggestion) => {
                writeln!(out, "suggestion ({}): {}", action.name(), suggestion)?;
                self.ai_selection = Some(selection.to_string());
            }
            Err(e) => writeln!(out, "error: {}", e)?,
        }
        Ok(())
    }

    fn apply_suggestion(&mut self, out: &mut impl Write) -> io::Result<()> {
        let (Some(assistant), Some(selection)) = (self.assistant.as_mut(), self.ai_selection.as_deref()) else {
            return writeln!(out, "no suggestion to apply");
        };
        if assistant.suggestion().is_none() {
            return writeln!(out, "no suggestion to apply");
        }

        match assistant.apply(&self.host.surface, selection) {
            Some(updated) => {
                let outcome = self.history.apply_external_replacement(updated, &mut self.host);
                self.ai_selection = None;
                self.report_commit(out, outcome)
            }
            None => writeln!(out, "selection no longer in document"),
        }
    }

    fn save(&mut self, path: &str, out: &mut impl Write) -> io::Result<()> {
        if path.is_empty() {
            return writeln!(out, "usage: :save <path>");
        }
        self.flush_and_report(out)?;
        match std::fs::write(path, self.history.current()) {
            Ok(()) => writeln!(out, "saved {}", path),
            Err(e) => writeln!(out, "error: cannot write {}: {}", path, e),
        }
    }

    fn flush_and_report(&mut self, out: &mut impl Write) -> io::Result<()> {
        match self.history.flush(&mut self.host) {
            Some(outcome) => self.report_commit(out, outcome),
            None => Ok(()),
        }
    }

    fn report_commit(&self, out: &mut impl Write, outcome: CommitOutcome) -> io::Result<()> {
        match outcome {
            CommitOutcome::Unchanged => writeln!(out, "unchanged"),
            CommitOutcome::Appended { .. } => {
                let (position, len) = self.history.position();
                writeln!(
                    out,
                    "committed {}/{} (words: {})",
                    position, len, self.host.stats.words
                )
            }
        }
    }

    fn report_position(&self, out: &mut impl Write, what: &str) -> io::Result<()> {
        let (position, len) = self.history.position();
        writeln!(out, "{} -> {}/{}", what, position, len)
    }

    pub fn current(&self) -> &str {
        self.history.current()
    }
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

pub fn cmd_edit(path: Option<&Path>, debounce_ms: Option<u64>, settings: &Settings) -> Result<(), CliError> {
    let initial = match path {
        Some(path) => {
            let doc = import_document(path)?;
            if !doc.supported {
                eprintln!("warning: {} opened as a placeholder", path.display());
            }
            doc.html
        }
        None => String::new(),
    };

    let mut config = settings.history_config();
    if let Some(ms) = debounce_ms {
        config = HistoryConfig::new(ms, config.max_entries);
    }

    let mut session = Session::new(&initial, config, settings.ai.clone());
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    session.run(stdin.lock(), &mut out)?;
    log::info!("edit session ended ({} bytes)", session.current().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::{Duration, Instant};

    struct ManualClock(Cell<Instant>);

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    fn run_script(session: &mut Session<impl Clock>, script: &str) -> String {
        let mut out = Vec::new();
        session.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_typing_coalesces_until_flush() {
        let mut session = Session::new("", HistoryConfig::new(60_000, 10), AISettings::default());
        let output = run_script(&mut session, "one\ntwo\n:history\n:flush\n:history\n");

        assert!(output.contains("History: 1/1 (undo: no, redo: no, pending: yes)"));
        assert!(output.contains("committed 2/2 (words: 1)"));
        assert!(output.contains("History: 2/2 (undo: yes, redo: no, pending: no)"));
        assert_eq!(session.current(), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_poll_commits_after_window() {
        let clock = ManualClock(Cell::new(Instant::now()));
        let history = EditHistory::with_clock("", HistoryConfig::new(500, 10), &clock);
        let mut session = Session::with_history(history, "", AISettings::default());

        let mut out = Vec::new();
        session.handle_line("first", &mut out).unwrap();
        clock.0.set(clock.0.get() + Duration::from_millis(600));
        if let Some(outcome) = session.history.poll(&mut session.host) {
            session.report_commit(&mut out, outcome).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "committed 2/2 (words: 1)\n");
    }

    #[test]
    fn test_undo_redo_restore_surface() {
        let mut session = Session::new("<p>start</p>", HistoryConfig::new(60_000, 10), AISettings::default());
        let output = run_script(&mut session, "more\n:undo\n:show\n:redo\n:show\n:redo\n");

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "committed 2/2 (words: 1)");
        assert_eq!(lines[1], "undo -> 1/2");
        assert_eq!(lines[2], "<p>start</p>");
        assert_eq!(lines[3], "redo -> 2/2");
        assert_eq!(lines[4], "<p>start</p><p>more</p>");
        assert_eq!(lines[5], "nothing to redo");
    }

    #[test]
    fn test_typed_text_is_escaped() {
        let mut session = Session::new("", HistoryConfig::new(60_000, 10), AISettings::default());
        run_script(&mut session, "a < b & c\n");
        assert_eq!(session.current(), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_ai_without_provider_reports_error() {
        let mut session = Session::new("<p>x</p>", HistoryConfig::new(60_000, 10), AISettings::default());
        let output = run_script(&mut session, ":ai improve x\n:apply\n");
        assert!(output.contains("error: AI not configured"));
        assert!(output.contains("no suggestion to apply"));
    }

    #[test]
    fn test_save_writes_committed_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        let mut session = Session::new("", HistoryConfig::new(60_000, 10), AISettings::default());
        run_script(&mut session, &format!("hello\n:save {}\n:quit\nignored\n", path.display()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>hello</p>");
    }

    #[test]
    fn test_ai_suggestion_applies_as_one_step() {
        use httpmock::prelude::*;
        use quillgrid_config::{AIProvider, KeyLookup, KeySource};

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat");
            then.status(200).json_body(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "glad" } }]
            }));
        });

        let ai = AISettings {
            provider: AIProvider::Mistral,
            endpoint: Some(server.url("/chat")),
            ..AISettings::default()
        };
        let lookup = KeyLookup {
            key: Some("k".to_string()),
            source: KeySource::Environment,
        };
        let assistant = Assistant::new(&ResolvedAIConfig::with_key(&ai, lookup)).unwrap();

        let mut session = Session::new("<p>I am happy</p>", HistoryConfig::new(60_000, 10), ai);
        session.assistant = Some(assistant);
        let output = run_script(&mut session, ":ai improve happy\n:apply\n:undo\n:show\n");

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "suggestion (improve): glad");
        assert_eq!(lines[1], "committed 2/2 (words: 3)");
        assert_eq!(lines[2], "undo -> 1/2");
        assert_eq!(lines[3], "<p>I am happy</p>");
    }
}
