//! Input plumbing: normalized events, click targets, and pixel → cell conversion.
//!
//! Rendering registers a target for every clickable region each frame; the
//! mouse handler converts the DOM pixel position to a terminal cell and asks
//! [`ClickState::hit_test`] which action lives there.

use ratzilla::ratatui::layout::Rect;

/// Input events, normalized from keyboard, mouse, and touch sources.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press from keyboard.
    Key(char),
    /// A click/tap on a registered target, identified by its action ID
    /// (see `hustler::actions`).
    Click(u16),
}

/// A region on screen that triggers an action when tapped.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// Hit region in terminal cell coordinates.
    pub rect: Rect,
    pub action_id: u16,
}

/// Click targets of the last rendered frame plus the terminal size they were
/// laid out for. Shared between the render loop and the mouse handler.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    /// Start a new frame: remember the terminal size and drop stale targets.
    pub fn begin_frame(&mut self, cols: u16, rows: u16) {
        self.terminal_cols = cols;
        self.terminal_rows = rows;
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register a full-width, one-row target at `row`, if `row` lies inside `area`.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Register targets for a horizontal tab bar.
    ///
    /// `tab_widths` holds `(display_width, action_id)` of each padded label.
    /// Each target covers its label plus half of the neighbouring separators;
    /// the first and last tabs stretch to the edges so the bar has no dead
    /// cells.
    pub fn register_tab_targets(
        &mut self,
        tab_widths: &[(u16, u16)],
        separator_width: u16,
        x: u16,
        y: u16,
        total_width: u16,
        height: u16,
    ) {
        let n = tab_widths.len();
        if n == 0 || total_width == 0 {
            return;
        }

        let mut starts: Vec<u16> = Vec::with_capacity(n);
        let mut cursor: u16 = 0;
        for (i, &(w, _)) in tab_widths.iter().enumerate() {
            if i > 0 {
                cursor += separator_width;
            }
            starts.push(cursor);
            cursor += w;
        }

        for (i, &(width, action_id)) in tab_widths.iter().enumerate() {
            let left = if i == 0 {
                0
            } else {
                let prev_end = starts[i - 1] + tab_widths[i - 1].0;
                prev_end + (starts[i] - prev_end) / 2
            };
            let right = if i == n - 1 {
                total_width
            } else {
                let end = starts[i] + width;
                end + (starts[i + 1] - end) / 2
            };

            let w = right.min(total_width).saturating_sub(left);
            if w > 0 {
                self.add_click_target(Rect::new(x + left, y, w, height), action_id);
            }
        }
    }

    /// Action at a terminal cell. Later targets win where targets overlap,
    /// matching draw order (overlays are registered last).
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            let inside = col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height;
            inside.then_some(t.action_id)
        })
    }

    /// Resolve a click given in pixels relative to the grid container.
    pub fn hit_test_pixels(
        &self,
        click_x: f64,
        click_y: f64,
        grid_width: f64,
        grid_height: f64,
    ) -> Option<u16> {
        let col = pixel_to_cell(click_x, grid_width, self.terminal_cols)?;
        let row = pixel_to_cell(click_y, grid_height, self.terminal_rows)?;
        self.hit_test(col, row)
    }
}

/// Whether a terminal this wide should use the stacked (phone) layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Convert a pixel offset along one axis into a cell index.
///
/// `offset` is relative to the grid container's edge, `extent` is the
/// container's pixel size on that axis and `cells` its size in cells.
/// Returns `None` for clicks outside the grid or degenerate sizes.
pub fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    (cell < cells).then_some(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_basic() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 10, 80, 1), 1);
        cs.add_click_target(Rect::new(0, 11, 80, 1), 2);

        assert_eq!(cs.hit_test(5, 10), Some(1));
        assert_eq!(cs.hit_test(5, 11), Some(2));
        assert_eq!(cs.hit_test(5, 12), None);
    }

    #[test]
    fn hit_test_overlap_last_wins() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 80, 10), 1);
        cs.add_click_target(Rect::new(10, 2, 20, 3), 2);

        assert_eq!(cs.hit_test(15, 3), Some(2));
        assert_eq!(cs.hit_test(5, 3), Some(1));
    }

    #[test]
    fn add_row_target_outside_area_ignored() {
        let mut cs = ClickState::new();
        let area = Rect::new(0, 5, 40, 3);
        cs.add_row_target(area, 4, 1);
        cs.add_row_target(area, 8, 2);
        assert!(cs.targets.is_empty());
        cs.add_row_target(area, 6, 3);
        assert_eq!(cs.hit_test(39, 6), Some(3));
        assert_eq!(cs.hit_test(40, 6), None);
    }

    #[test]
    fn begin_frame_clears_targets() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 10, 1), 1);
        cs.begin_frame(80, 24);
        assert!(cs.targets.is_empty());
        assert_eq!(cs.terminal_cols, 80);
        assert_eq!(cs.terminal_rows, 24);
    }

    #[test]
    fn tab_targets_cover_whole_bar() {
        let mut cs = ClickState::new();
        // three 6-wide labels separated by 3-wide separators in a 40-wide bar
        cs.register_tab_targets(&[(6, 10), (6, 11), (6, 12)], 3, 0, 0, 40, 1);
        assert_eq!(cs.targets.len(), 3);
        for col in 0..40 {
            assert!(cs.hit_test(col, 0).is_some(), "dead cell at {}", col);
        }
        assert_eq!(cs.hit_test(0, 0), Some(10));
        assert_eq!(cs.hit_test(11, 0), Some(11));
        assert_eq!(cs.hit_test(39, 0), Some(12));
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(59));
        assert!(!is_narrow_layout(60));
    }

    #[test]
    fn pixel_to_cell_basic() {
        // 20 rows in 400px → 20px per row
        assert_eq!(pixel_to_cell(0.0, 400.0, 20), Some(0));
        assert_eq!(pixel_to_cell(19.9, 400.0, 20), Some(0));
        assert_eq!(pixel_to_cell(20.0, 400.0, 20), Some(1));
        assert_eq!(pixel_to_cell(399.0, 400.0, 20), Some(19));
    }

    #[test]
    fn pixel_to_cell_rejects_outside_and_degenerate() {
        assert_eq!(pixel_to_cell(400.0, 400.0, 20), None);
        assert_eq!(pixel_to_cell(-1.0, 400.0, 20), None);
        assert_eq!(pixel_to_cell(10.0, 0.0, 20), None);
        assert_eq!(pixel_to_cell(10.0, 400.0, 0), None);
    }

    #[test]
    fn hit_test_pixels_maps_to_cell() {
        let mut cs = ClickState::new();
        cs.begin_frame(80, 24);
        cs.add_click_target(Rect::new(0, 3, 80, 1), 7);
        // 10px per column, 20px per row
        assert_eq!(cs.hit_test_pixels(15.0, 65.0, 800.0, 480.0), Some(7));
        assert_eq!(cs.hit_test_pixels(15.0, 85.0, 800.0, 480.0), None);
    }
}
