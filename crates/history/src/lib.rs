//! Document edit history: bounded snapshot undo/redo with debounced commits.

pub mod clock;
pub mod history;
pub mod host;
pub mod manager;

pub use clock::{Clock, RealClock};
pub use history::{CommitOutcome, SnapshotHistory};
pub use host::{ContentSource, EditableSurface, EditorHost, RenderStatus, SelectionTracker};
pub use manager::{
    EditHistory, EditState, HistoryConfig, PendingEdit, DEFAULT_DEBOUNCE_MS,
    DEFAULT_MAX_HISTORY_ENTRIES,
};
