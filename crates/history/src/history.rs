/// Bounded snapshot history for document undo/redo
///
/// Every entry is a full copy of the document. The cursor points at the
/// snapshot currently displayed; entries after it form the redo branch.

/// Outcome of committing a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Content matched the current snapshot; nothing changed
    Unchanged,
    /// Snapshot appended at the tail
    Appended {
        /// Redo entries dropped by this commit
        truncated: usize,
        /// Whether the oldest snapshot was evicted to stay within capacity
        evicted: bool,
    },
}

impl CommitOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, CommitOutcome::Appended { .. })
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    snapshots: Vec<String>,
    cursor: usize,
    max_entries: usize,
}

impl SnapshotHistory {
    pub fn new(initial: String, max_entries: usize) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Append `content` as the new tail, dropping the redo branch.
    ///
    /// Content equal to the current snapshot is dropped so adjacent entries
    /// never repeat; the redo branch survives in that case.
    pub fn commit(&mut self, content: String) -> CommitOutcome {
        if self.snapshots[self.cursor] == content {
            return CommitOutcome::Unchanged;
        }

        let truncated = self.snapshots.len() - (self.cursor + 1);
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(content);
        self.cursor = self.snapshots.len() - 1;

        let mut evicted = false;
        if self.snapshots.len() > self.max_entries {
            self.snapshots.remove(0);
            self.cursor = self.cursor.saturating_sub(1);
            evicted = true;
        }

        CommitOutcome::Appended { truncated, evicted }
    }

    /// Move the cursor back one entry, returning the snapshot now current
    pub fn step_back(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Move the cursor forward one entry, returning the snapshot now current
    pub fn step_forward(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn current(&self) -> &str {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: the initial snapshot is never evicted without a replacement
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn snapshots(&self) -> &[String] {
        &self.snapshots
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }
}
