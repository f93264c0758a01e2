/// Selection and scroll offset of a scrollable view.
///
/// Every method is pure arithmetic over the position plus the page size and
/// row count supplied by the caller, and returns whether the position
/// changed so the caller can decide whether a redraw is needed.
///
/// Invariant after [`determine_view_start`](Self::determine_view_start), when
/// `rows > 0`:
/// `view_start_row_index <= active_row_index < view_start_row_index + page_rows`
/// and `active_row_index < rows`. With no rows both row fields are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewPosition {
    /// Selected row
    pub active_row_index: usize,
    /// First row shown on screen
    pub view_start_row_index: usize,
    /// Horizontal scroll offset (0 is the first column)
    pub view_start_column: usize,
}

impl ViewPosition {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_active(&mut self, index: usize) -> bool {
        let changed = self.active_row_index != index;
        self.active_row_index = index;
        changed
    }

    fn set_view_start(&mut self, index: usize) -> bool {
        let changed = self.view_start_row_index != index;
        self.view_start_row_index = index;
        changed
    }

    pub fn move_line_down(&mut self, rows: usize) -> bool {
        if self.active_row_index + 1 < rows {
            self.active_row_index += 1;
            true
        } else {
            false
        }
    }

    pub fn move_line_up(&mut self) -> bool {
        if self.active_row_index > 0 {
            self.active_row_index -= 1;
            true
        } else {
            false
        }
    }

    fn move_down_by(&mut self, amount: usize, rows: usize) -> bool {
        let remaining = rows.saturating_sub(self.active_row_index + 1);
        let delta = amount.min(remaining);
        if delta == 0 {
            return false;
        }
        self.active_row_index += delta;
        self.view_start_row_index += delta;
        true
    }

    fn move_up_by(&mut self, amount: usize) -> bool {
        let delta = amount.min(self.active_row_index);
        if delta == 0 {
            return false;
        }
        self.active_row_index -= delta;
        self.view_start_row_index = self.view_start_row_index.saturating_sub(delta);
        true
    }

    pub fn move_page_down(&mut self, page_rows: usize, rows: usize) -> bool {
        self.move_down_by(page_rows.max(1), rows)
    }

    pub fn move_page_up(&mut self, page_rows: usize) -> bool {
        self.move_up_by(page_rows.max(1))
    }

    pub fn move_half_page_down(&mut self, page_rows: usize, rows: usize) -> bool {
        self.move_down_by((page_rows / 2).max(1), rows)
    }

    pub fn move_half_page_up(&mut self, page_rows: usize) -> bool {
        self.move_up_by((page_rows / 2).max(1))
    }

    pub fn move_to_first_line(&mut self) -> bool {
        self.set_active(0)
    }

    pub fn move_to_last_line(&mut self, rows: usize) -> bool {
        self.set_active(rows.saturating_sub(1))
    }

    /// Select `index` directly (mouse click). Out of range indices are ignored.
    pub fn select_row(&mut self, index: usize, rows: usize) -> bool {
        index < rows && self.set_active(index)
    }

    /// Re-derive the view start so the active row is on screen.
    ///
    /// Also clamps the active row when the content has shrunk and pulls the
    /// view start back so the last page stays full. Empty content resets
    /// every field, the column included. Idempotent.
    pub fn determine_view_start(&mut self, page_rows: usize, rows: usize) -> bool {
        let before = *self;

        if rows == 0 {
            *self = Self::new();
            return before != *self;
        }

        let page_rows = page_rows.max(1);
        self.active_row_index = self.active_row_index.min(rows - 1);

        if self.view_start_row_index > self.active_row_index {
            self.view_start_row_index = self.active_row_index;
        } else if self.active_row_index - self.view_start_row_index >= page_rows {
            self.view_start_row_index = self.active_row_index + 1 - page_rows;
        }

        self.view_start_row_index = self
            .view_start_row_index
            .min(rows.saturating_sub(page_rows));

        before != *self
    }

    pub fn center_active_row(&mut self, page_rows: usize) -> bool {
        self.set_view_start(self.active_row_index.saturating_sub(page_rows / 2))
    }

    pub fn scroll_active_row_top(&mut self) -> bool {
        self.set_view_start(self.active_row_index)
    }

    pub fn scroll_active_row_bottom(&mut self, page_rows: usize) -> bool {
        self.set_view_start(
            self.active_row_index
                .saturating_sub(page_rows.max(1) - 1),
        )
    }

    fn visible_rows(&self, page_rows: usize, rows: usize) -> usize {
        page_rows.min(rows.saturating_sub(self.view_start_row_index))
    }

    pub fn move_cursor_top(&mut self, page_rows: usize, rows: usize) -> bool {
        if self.visible_rows(page_rows, rows) == 0 {
            return false;
        }
        self.set_active(self.view_start_row_index)
    }

    pub fn move_cursor_middle(&mut self, page_rows: usize, rows: usize) -> bool {
        let visible = self.visible_rows(page_rows, rows);
        if visible == 0 {
            return false;
        }
        self.set_active(self.view_start_row_index + (visible - 1) / 2)
    }

    pub fn move_cursor_bottom(&mut self, page_rows: usize, rows: usize) -> bool {
        let visible = self.visible_rows(page_rows, rows);
        if visible == 0 {
            return false;
        }
        self.set_active(self.view_start_row_index + visible - 1)
    }

    /// Scroll the view down by `lines` (mouse wheel), dragging the active
    /// row along when it would leave the screen.
    pub fn scroll_down(&mut self, lines: usize, page_rows: usize, rows: usize) -> bool {
        let max_start = rows.saturating_sub(page_rows.max(1));
        let start = (self.view_start_row_index + lines).min(max_start);
        if !self.set_view_start(start) {
            return false;
        }
        if self.active_row_index < start {
            self.active_row_index = start;
        }
        true
    }

    pub fn scroll_up(&mut self, lines: usize, page_rows: usize) -> bool {
        let start = self.view_start_row_index.saturating_sub(lines);
        if !self.set_view_start(start) {
            return false;
        }
        let last_visible = start + page_rows.max(1) - 1;
        if self.active_row_index > last_visible {
            self.active_row_index = last_visible;
        }
        true
    }

    /// Scroll right by half of the `cols` visible columns.
    pub fn move_page_right(&mut self, cols: usize) -> bool {
        let step = (cols / 2).max(1);
        self.view_start_column += step;
        true
    }

    /// Scroll left by half of the `cols` visible columns, stopping at the first column.
    pub fn move_page_left(&mut self, cols: usize) -> bool {
        let step = (cols / 2).max(1);
        let column = self.view_start_column.saturating_sub(step);
        let changed = column != self.view_start_column;
        self.view_start_column = column;
        changed
    }
}
