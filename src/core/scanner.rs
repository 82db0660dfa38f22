// thumbview - core/scanner.rs
//
// Translates "what is on screen" into prioritised thumbnail requests.
//
// Called on every redraw/scroll. Given the visible rows [start, end] it
// requests, in this order:
//   1. the visible rows and a read-ahead margin below them: [start, end + m]
//   2. a read-behind margin above them:                    [start - m, start)
// with m = (end - start) / 2. Because the work queue is FIFO, rows in (1)
// are rendered before rows in (2).
//
// Each row is requested at most once: the `requested` flag is checked and
// set here, on the display thread, before the item is pushed.

use crate::core::model::{RowModel, VisibleRange, WorkItem};
use crate::core::queue::WorkQueue;
use std::ops::Range;

/// Row indices to examine for the visible range `[start, end]`, in
/// priority order. Indices past the end of the model are included; the
/// caller skips rows that do not resolve.
pub fn scan_order(start: usize, end: usize) -> impl Iterator<Item = usize> {
    let (forward, backward) = scan_ranges(start, end);
    forward.chain(backward)
}

fn scan_ranges(start: usize, end: usize) -> (Range<usize>, Range<usize>) {
    let margin = end.saturating_sub(start) / 2;
    let forward = start..end.saturating_add(margin).saturating_add(1);
    let backward = start.saturating_sub(margin)..start;
    (forward, backward)
}

/// What one scan did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Items pushed onto the work queue.
    pub pushed: usize,
    /// Rows skipped because a render was already requested or done.
    pub already_requested: usize,
    /// Indices in the scan range with no row behind them.
    pub unresolved: usize,
}

/// Enqueues render requests for the rows in and around the visible range.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportScanner;

impl ViewportScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan the view and push a `WorkItem` for every row that needs one.
    ///
    /// Does nothing when the view has no valid range. Starting workers for
    /// the pushed items is the caller's job (see `ThumbnailPipeline`).
    pub fn scan<V, M>(&self, view: &V, model: &mut M, queue: &WorkQueue) -> ScanReport
    where
        V: VisibleRange + ?Sized,
        M: RowModel + ?Sized,
    {
        let mut report = ScanReport::default();

        let Some((start, end)) = view.visible_range() else {
            tracing::trace!("No visible range; nothing to scan");
            return report;
        };
        if end < start {
            tracing::debug!(start, end, "Inverted visible range ignored");
            return report;
        }

        for index in scan_order(start, end) {
            let resolved = model
                .key_at(index)
                .and_then(|key| model.resolve(key).map(|handle| (key, handle)));
            let Some((key, handle)) = resolved else {
                report.unresolved += 1;
                continue;
            };

            if model.is_requested(handle) || model.has_bitmap(handle) {
                report.already_requested += 1;
                continue;
            }

            model.set_requested(handle, true);
            let path = model.file_path(handle);
            tracing::trace!(row = %key, index, path = %path.display(), "Thumbnail requested");
            queue.push(WorkItem::new(key, path));
            report.pushed += 1;
        }

        if report.pushed > 0 {
            tracing::debug!(
                start,
                end,
                pushed = report.pushed,
                skipped = report.already_requested,
                "Viewport scan queued thumbnails"
            );
        }
        report
    }
}
