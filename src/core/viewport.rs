// thumbview - core/viewport.rs
//
// A scrollable window over a list of `total` rows, `visible_rows` tall.
// Stands in for the visible-range query of a list/grid widget.

use crate::core::model::VisibleRange;

/// Scroll position and height of a list view, measured in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    first: usize,
    visible_rows: usize,
    total: usize,
}

impl Viewport {
    /// A viewport at the top of a list of `total` rows.
    pub fn new(visible_rows: usize, total: usize) -> Self {
        Self {
            first: 0,
            visible_rows,
            total,
        }
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Update the row count after the model changed, keeping the scroll
    /// position inside the list.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.first = self.first.min(self.max_first());
    }

    /// Scroll so that `row` is the first visible row (clamped).
    pub fn scroll_to(&mut self, row: usize) {
        self.first = row.min(self.max_first());
    }

    /// Scroll by `delta` rows; negative scrolls up.
    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.first.saturating_sub(delta.unsigned_abs())
        } else {
            self.first.saturating_add(delta.unsigned_abs())
        };
        self.scroll_to(target);
    }

    /// Advance by one screenful. Returns false when already at the bottom.
    pub fn page_down(&mut self) -> bool {
        let before = self.first;
        self.scroll_to(self.first.saturating_add(self.visible_rows.max(1)));
        self.first != before
    }

    fn max_first(&self) -> usize {
        self.total.saturating_sub(self.visible_rows.max(1))
    }
}

impl VisibleRange for Viewport {
    fn visible_range(&self) -> Option<(usize, usize)> {
        if self.total == 0 || self.visible_rows == 0 {
            return None;
        }
        let last = (self.first + self.visible_rows - 1).min(self.total - 1);
        Some((self.first, last))
    }
}
