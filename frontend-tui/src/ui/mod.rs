//! Screen painting.
//!
//! The layout is a fixed character grid: titles on row 0, a status line on
//! row 1, the process window from row 3, and two help lines at the bottom.

pub mod header;
pub mod layout;
pub mod process_table;
pub mod status_bar;

use ratatui::{buffer::Buffer, layout::Rect, style::Style, Frame};

use crate::state::AppState;
use layout::ColumnWidths;

/// First screen row of the process window.
pub const TABLE_TOP: u16 = 3;

pub fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let widths = ColumnWidths::negotiate(area.width);
    let buf = frame.buffer_mut();

    header::draw(buf, area, &widths, state);
    process_table::draw(buf, area, &widths, state);
    status_bar::draw(buf, area);
}

/// Writes `text` at (`x`, `y`), clipped to `area`. Off-screen rows are skipped.
fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, text: &str, style: Style) {
    if y >= area.bottom() || x >= area.right() {
        return;
    }
    let room = (area.right() - x) as usize;
    buf.set_stringn(x, y, text, room, style);
}
