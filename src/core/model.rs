// thumbview - core/model.rs
//
// Core data model types and the collaborator traits the pipeline consumes.
// Pure definitions: no threads, no I/O.
//
// These types are the shared vocabulary across all layers.

use crate::util::error::RenderError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

// =============================================================================
// Row identity
// =============================================================================

/// Stable, opaque reference to a row of a list model.
///
/// Unlike an index, a key survives reordering of the list.  A key whose row
/// was removed simply fails to resolve; it never aliases another row because
/// models hand out keys from a counter that is never rewound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowKey(pub u64);

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Current position of a row in its model.
///
/// Only valid until the next mutation of the model; always obtain a fresh
/// handle through `RowModel::resolve`.
pub type RowHandle = usize;

// =============================================================================
// Thumbnail bitmap
// =============================================================================

/// A rendered thumbnail: tightly packed RGBA8 pixels, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Thumbnail {
    /// Build a thumbnail, returning `None` if the buffer length does not
    /// match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }
}

// Pixel buffers are large; keep Debug output readable in logs and assertions.
impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

// =============================================================================
// Work units
// =============================================================================

/// A pending request to render the thumbnail of one row.
///
/// Immutable after creation. By the time a worker picks it up the row may
/// have moved or vanished; that is resolved on the dispatcher side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    key: RowKey,
    file_path: PathBuf,
}

impl WorkItem {
    pub fn new(key: RowKey, file_path: PathBuf) -> Self {
        Self { key, file_path }
    }

    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Result of one render, sent from a worker to the dispatcher.
#[derive(Debug)]
pub struct RenderOutcome {
    /// Row the render was requested for.
    pub key: RowKey,
    /// File that was rendered.
    pub path: PathBuf,
    /// `None` when the renderer failed; the error has already been logged.
    pub thumbnail: Option<Thumbnail>,
}

/// What the dispatcher did with a single `RenderOutcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The thumbnail was stored on the row.
    Applied,
    /// The render failed; the row keeps no bitmap.
    Failed,
    /// The row was removed from the model while the render was in flight.
    Gone,
    /// The row already had a bitmap; the duplicate result was dropped.
    AlreadySet,
}

/// Counts of what one dispatcher pass applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub applied: usize,
    pub failed: usize,
    pub gone: usize,
    pub already_set: usize,
}

impl DispatchSummary {
    /// Total number of outcomes processed.
    pub fn total(&self) -> usize {
        self.applied + self.failed + self.gone + self.already_set
    }

    pub(crate) fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Applied => self.applied += 1,
            DispatchOutcome::Failed => self.failed += 1,
            DispatchOutcome::Gone => self.gone += 1,
            DispatchOutcome::AlreadySet => self.already_set += 1,
        }
    }

    pub(crate) fn merge(&mut self, other: DispatchSummary) {
        self.applied += other.applied;
        self.failed += other.failed;
        self.gone += other.gone;
        self.already_set += other.already_set;
    }
}

// =============================================================================
// Collaborator traits
// =============================================================================

/// The list model that owns the rows and their thumbnail state.
///
/// Every method runs on the single display thread. The pipeline never moves
/// a `RowModel` into a worker; mutation requires `&mut self`, so the type
/// system keeps row state on one thread without any lock.
pub trait RowModel {
    /// Key of the row currently at `index`, or `None` past the end.
    fn key_at(&self, index: usize) -> Option<RowKey>;

    /// Current position of the row with `key`, or `None` if it was removed.
    fn resolve(&self, key: RowKey) -> Option<RowHandle>;

    /// File the row's thumbnail is rendered from.
    fn file_path(&self, row: RowHandle) -> PathBuf;

    fn is_requested(&self, row: RowHandle) -> bool;

    fn set_requested(&mut self, row: RowHandle, requested: bool);

    fn has_bitmap(&self, row: RowHandle) -> bool;

    fn set_bitmap(&mut self, row: RowHandle, thumbnail: Thumbnail);
}

/// The view that knows which rows are on screen.
pub trait VisibleRange {
    /// Inclusive `(first_row, last_row)` currently visible, or `None` when
    /// nothing is shown (for example an empty model).
    fn visible_range(&self) -> Option<(usize, usize)>;
}

/// Produces a thumbnail for a file.  Called concurrently from worker threads.
pub trait Renderer: Send + Sync {
    fn render(&self, path: &Path) -> Result<Thumbnail, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&Path) -> Result<Thumbnail, RenderError> + Send + Sync,
{
    fn render(&self, path: &Path) -> Result<Thumbnail, RenderError> {
        self(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_rejects_mismatched_buffer() {
        assert!(Thumbnail::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(Thumbnail::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Thumbnail::from_rgba(0, 0, Vec::new()).is_some());
    }

    #[test]
    fn test_dispatch_summary_counts_each_outcome() {
        let mut summary = DispatchSummary::default();
        summary.record(DispatchOutcome::Applied);
        summary.record(DispatchOutcome::Applied);
        summary.record(DispatchOutcome::Gone);
        summary.record(DispatchOutcome::Failed);

        let mut other = DispatchSummary::default();
        other.record(DispatchOutcome::AlreadySet);
        summary.merge(other);

        assert_eq!(summary.applied, 2);
        assert_eq!(summary.gone, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.already_set, 1);
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn test_closure_is_a_renderer() {
        let renderer = |_: &Path| -> Result<Thumbnail, RenderError> {
            Ok(Thumbnail::from_rgba(1, 1, vec![1, 2, 3, 4]).unwrap())
        };
        let thumb = Renderer::render(&renderer, Path::new("a.png")).unwrap();
        assert_eq!(thumb.rgba, vec![1, 2, 3, 4]);
    }
}
