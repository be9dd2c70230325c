//! Cursor and scroll state for a grid of fixed-size cards.
//!
//! Positions index the filtered view in reading order; the grid lays them out
//! `columns` per row. The cursor never owns the items.

use std::ops::Range;

#[derive(Debug, Default, Clone)]
pub struct GridCursor {
    pub selected: usize,
    /// First visible row.
    pub scroll_row: usize,
}

impl GridCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the cursor inside `0..len`.
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn left(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn right(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn up(&mut self, columns: usize, rows: usize) {
        self.selected = self.selected.saturating_sub(columns.max(1) * rows);
    }

    /// Move down `rows` rows, stopping on the last item.
    pub fn down(&mut self, columns: usize, rows: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = (self.selected + columns.max(1) * rows).min(len - 1);
    }

    pub fn first(&mut self) {
        self.selected = 0;
        self.scroll_row = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Scroll so the selected card's row is within `visible_rows`.
    pub fn ensure_visible(&mut self, columns: usize, visible_rows: usize) {
        if visible_rows == 0 {
            return;
        }
        let row = self.selected / columns.max(1);
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + visible_rows {
            self.scroll_row = row + 1 - visible_rows;
        }
    }

    /// Item positions drawn in the current viewport.
    pub fn visible_range(&self, columns: usize, visible_rows: usize, len: usize) -> Range<usize> {
        let columns = columns.max(1);
        let start = (self.scroll_row * columns).min(len);
        let end = (start + columns * visible_rows).min(len);
        start..end
    }

    /// Select the card at (`row`, `col`) of the viewport.
    /// Returns true if a card was hit.
    pub fn handle_click(&mut self, row: usize, col: usize, columns: usize, len: usize) -> bool {
        let columns = columns.max(1);
        if col >= columns {
            return false;
        }
        let target = (self.scroll_row + row) * columns + col;
        if target < len {
            self.selected = target;
            return true;
        }
        false
    }
}
