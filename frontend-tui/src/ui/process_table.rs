//! The scrolling process window.

use backend::ProcessDescriptor;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
};

use super::layout::{fit_cell, ColumnWidths};
use super::{put, TABLE_TOP};
use crate::state::AppState;

pub const POINTER: &str = ">";

pub fn draw(buf: &mut Buffer, area: Rect, widths: &ColumnWidths, state: &AppState) {
    let snapshot = state.snapshot();
    let viewport = state.viewport();
    let top = area.top() + TABLE_TOP;

    if snapshot.is_empty() {
        draw_cells(buf, area, top, widths, ["-", "-", "-", "-"]);
        for i in 1..viewport.window() {
            draw_cells(buf, area, top + i as u16, widths, [""; 4]);
        }
        return;
    }

    for (i, index) in viewport.rows().enumerate() {
        let y = top.saturating_add(i as u16);
        if y >= area.bottom() {
            break;
        }
        match snapshot.get(index) {
            Some(process) => {
                let [pid, name, cpu, memory] = row_cells(process);
                draw_cells(buf, area, y, widths, [&pid, &name, &cpu, &memory].map(String::as_str));
            }
            None => draw_cells(buf, area, y, widths, [""; 4]),
        }

        if index == viewport.cursor() {
            put(buf, area, area.left(), y, POINTER, Style::default());
            let highlight = Rect::new(area.left() + 1, y, area.width.saturating_sub(1), 1);
            buf.set_style(highlight, Style::default().add_modifier(Modifier::REVERSED));
        } else {
            put(buf, area, area.left(), y, " ", Style::default());
        }
    }
}

fn row_cells(process: &ProcessDescriptor) -> [String; 4] {
    [
        process.pid.to_string(),
        process.name.clone(),
        format!("{:.1}%", process.cpu_percent),
        process.memory_usage.clone(),
    ]
}

fn draw_cells(buf: &mut Buffer, area: Rect, y: u16, widths: &ColumnWidths, cells: [&str; 4]) {
    for ((x, width), text) in widths.columns().into_iter().zip(cells) {
        put(buf, area, area.left() + x, y, &fit_cell(text, width), Style::default());
    }
}
