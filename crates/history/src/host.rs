//! Collaborator interfaces for the edit history.
//!
//! The manager never reaches for global UI state. Whatever owns the editor
//! passes itself in as an `EditorHost` on each call.

use quillgrid_document::DocumentStats;

/// Result of asking the surface to display new content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Content is on screen; selection can be restored right away
    Rendered,
    /// Rendering finishes later; the host calls `EditHistory::render_complete`
    Deferred,
}

/// The editable view that shows document content
pub trait EditableSurface {
    fn set_content(&mut self, content: &str) -> RenderStatus;
}

/// Records and restores the caret/selection inside the surface.
///
/// Restoring may fail when the saved position no longer exists in the new
/// content. Implementations swallow that failure.
pub trait SelectionTracker {
    fn save_selection(&mut self);
    fn restore_selection(&mut self);
}

/// Owner of the document content, told about every committed or restored state
pub trait ContentSource {
    fn on_committed(&mut self, content: &str, stats: DocumentStats);
}

/// Everything the edit history talks to
pub trait EditorHost: EditableSurface + SelectionTracker + ContentSource {}

impl<T: EditableSurface + SelectionTracker + ContentSource> EditorHost for T {}
