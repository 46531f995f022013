//! Edit history manager: debounced commits, undo/redo, external replacements.
//!
//! All calls happen on one event loop. Typing is reported through
//! `on_raw_edit`, which only schedules a commit; the loop calls `poll` once
//! `next_deadline` has passed. Undo/redo rewrite the surface themselves, so
//! raw edits echoed back while a restore is in flight are ignored.
//!
//! Ordering rules:
//! - A newer raw edit replaces the pending one and restarts the window
//! - `undo`/`redo` commit the pending edit before navigating
//! - `apply_external_replacement` discards the pending edit

use std::time::{Duration, Instant};

use quillgrid_document::DocumentStats;

use crate::clock::{Clock, RealClock};
use crate::history::{CommitOutcome, SnapshotHistory};
use crate::host::{EditorHost, RenderStatus};

/// Quiet period before typed edits are committed
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Snapshots kept before the oldest is evicted
pub const DEFAULT_MAX_HISTORY_ENTRIES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    pub debounce_delay: Duration,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            debounce_delay: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            max_entries: DEFAULT_MAX_HISTORY_ENTRIES,
        }
    }
}

impl HistoryConfig {
    pub fn new(debounce_ms: u64, max_entries: usize) -> Self {
        Self {
            debounce_delay: Duration::from_millis(debounce_ms),
            max_entries,
        }
        .normalized()
    }

    /// Clamp values the history cannot honor (capacity below one)
    pub fn normalized(self) -> Self {
        Self {
            max_entries: self.max_entries.max(1),
            ..self
        }
    }
}

/// Whether the manager is currently writing restored content to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Restoring,
}

/// Latest typed content waiting for its debounce window to close
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub content: String,
    pub deadline: Instant,
}

pub struct EditHistory<C: Clock = RealClock> {
    history: SnapshotHistory,
    pending: Option<PendingEdit>,
    state: EditState,
    config: HistoryConfig,
    clock: C,
}

impl EditHistory<RealClock> {
    /// Start a session with `initial` as snapshot 0
    pub fn new(initial: impl Into<String>, config: HistoryConfig) -> Self {
        Self::with_clock(initial, config, RealClock)
    }
}

impl<C: Clock> EditHistory<C> {
    pub fn with_clock(initial: impl Into<String>, config: HistoryConfig, clock: C) -> Self {
        let config = config.normalized();
        Self {
            history: SnapshotHistory::new(initial.into(), config.max_entries),
            pending: None,
            state: EditState::Idle,
            config,
            clock,
        }
    }

    // -------------------------------------------------------------------------
    // Typing
    // -------------------------------------------------------------------------

    /// Record the surface's full content after a user edit.
    ///
    /// Returns false when the edit was ignored because it echoes a restore.
    pub fn on_raw_edit(&mut self, content: impl Into<String>, host: &mut impl EditorHost) -> bool {
        if self.state == EditState::Restoring {
            log::trace!("ignoring raw edit during history restore");
            return false;
        }

        host.save_selection();

        let deadline = self.clock.now() + self.config.debounce_delay;
        if self.pending.is_some() {
            log::trace!("rescheduling pending edit");
        }
        self.pending = Some(PendingEdit {
            content: content.into(),
            deadline,
        });
        true
    }

    /// When the event loop should next call `poll`
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Commit the pending edit if its debounce window has elapsed
    pub fn poll(&mut self, host: &mut impl EditorHost) -> Option<CommitOutcome> {
        let now = self.clock.now();
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if !due {
            return None;
        }
        self.commit_pending(host)
    }

    /// Commit the pending edit now, without waiting for the window.
    ///
    /// Hosts call this before running a formatting command and when the
    /// editing session ends.
    pub fn flush(&mut self, host: &mut impl EditorHost) -> Option<CommitOutcome> {
        self.commit_pending(host)
    }

    fn commit_pending(&mut self, host: &mut impl EditorHost) -> Option<CommitOutcome> {
        let pending = self.pending.take()?;
        Some(self.commit(pending.content, host))
    }

    fn commit(&mut self, content: String, host: &mut impl EditorHost) -> CommitOutcome {
        let outcome = self.history.commit(content);
        match outcome {
            CommitOutcome::Unchanged => {
                log::trace!("dropping commit identical to current snapshot");
            }
            CommitOutcome::Appended { truncated, evicted } => {
                log::debug!(
                    "committed snapshot {}/{} (redo dropped: {}, evicted: {})",
                    self.history.cursor() + 1,
                    self.history.len(),
                    truncated,
                    evicted
                );
                let current = self.history.current();
                host.on_committed(current, DocumentStats::from_html(current));
            }
        }
        outcome
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Step back one snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self, host: &mut impl EditorHost) -> bool {
        self.commit_pending(host);
        if self.history.step_back().is_none() {
            return false;
        }
        self.show_restored(host);
        true
    }

    /// Step forward one snapshot. Returns false when there is nothing to redo.
    pub fn redo(&mut self, host: &mut impl EditorHost) -> bool {
        self.commit_pending(host);
        if self.history.step_forward().is_none() {
            return false;
        }
        self.show_restored(host);
        true
    }

    fn show_restored(&mut self, host: &mut impl EditorHost) {
        self.state = EditState::Restoring;
        log::debug!(
            "restoring snapshot {}/{}",
            self.history.cursor() + 1,
            self.history.len()
        );

        let current = self.history.current();
        let status = host.set_content(current);
        host.on_committed(current, DocumentStats::from_html(current));

        if status == RenderStatus::Rendered {
            self.render_complete(host);
        }
    }

    /// Surface confirmation that restored content is on screen.
    ///
    /// Restores the saved selection and resumes accepting raw edits. Calls
    /// outside a restore are ignored.
    pub fn render_complete(&mut self, host: &mut impl EditorHost) {
        if self.state != EditState::Restoring {
            return;
        }
        host.restore_selection();
        self.state = EditState::Idle;
    }

    // -------------------------------------------------------------------------
    // External edits
    // -------------------------------------------------------------------------

    /// Replace the document with content produced outside the editor.
    ///
    /// Commits immediately, superseding any pending typed edit, and tells the
    /// surface to show the new content.
    pub fn apply_external_replacement(
        &mut self,
        content: impl Into<String>,
        host: &mut impl EditorHost,
    ) -> CommitOutcome {
        if let Some(stale) = self.pending.take() {
            log::debug!(
                "discarding pending edit ({} bytes) superseded by external replacement",
                stale.content.len()
            );
        }

        // A restore still waiting on the surface is superseded; its late
        // render_complete becomes a no-op.
        if self.state == EditState::Restoring {
            log::debug!("external replacement cancels deferred restore");
            self.state = EditState::Idle;
        }

        let outcome = self.commit(content.into(), host);
        if host.set_content(self.history.current()) == RenderStatus::Deferred {
            log::trace!("external replacement render deferred by surface");
        }
        outcome
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Content of the current snapshot
    pub fn current(&self) -> &str {
        self.history.current()
    }

    pub fn cursor(&self) -> usize {
        self.history.cursor()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// 1-based position and total, as shown in "History: 3/7"
    pub fn position(&self) -> (usize, usize) {
        (self.history.cursor() + 1, self.history.len())
    }

    pub fn snapshots(&self) -> &[String] {
        self.history.snapshots()
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        self.pending.as_ref()
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}
