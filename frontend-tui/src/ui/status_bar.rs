//! Key binding help on the last two rows.

use ratatui::{buffer::Buffer, layout::Rect, style::Style};

use super::put;

pub const SORT_HELP: &str = "Sort by -> F5:PID F6:Name F7:CPU F8:Memory";
pub const MOVE_HELP: &str = "Move:Up/Down F9:Kill F10:Quit";

pub fn draw(buf: &mut Buffer, area: Rect) {
    if area.height < 2 {
        return;
    }
    put(buf, area, area.left(), area.bottom() - 2, SORT_HELP, Style::default());
    put(buf, area, area.left(), area.bottom() - 1, MOVE_HELP, Style::default());
}
