//! Column titles and the status line.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
};

use super::layout::{fit_cell, ColumnWidths};
use super::put;
use crate::state::AppState;

const TITLES: [&str; 4] = ["PID", "Name", "CPU", "Memory"];

pub fn draw(buf: &mut Buffer, area: Rect, widths: &ColumnWidths, state: &AppState) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    for ((x, width), title) in widths.columns().into_iter().zip(TITLES) {
        put(buf, area, area.left() + x, area.top(), &fit_cell(title, width), bold);
    }
    put(buf, area, area.left() + 1, area.top() + 1, &status_line(state), Style::default());
}

fn status_line(state: &AppState) -> String {
    let mut line = format!(
        "Processes: {} | Sort: {}",
        state.snapshot().len(),
        state.sort_key().label()
    );
    if let Some(message) = state.message() {
        line.push_str(" | ");
        line.push_str(message);
    }
    line
}
