//! Column width negotiation and cell formatting.

pub const PID_WIDTH: usize = 8;
pub const NAME_WIDTH: usize = 48;
pub const CPU_WIDTH: usize = 12;
pub const MEMORY_WIDTH: usize = 12;
pub const MIN_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub pid: usize,
    pub name: usize,
    pub cpu: usize,
    pub memory: usize,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            pid: PID_WIDTH,
            name: NAME_WIDTH,
            cpu: CPU_WIDTH,
            memory: MEMORY_WIDTH,
        }
    }
}

impl ColumnWidths {
    /// Fits the preferred widths into `cols - 1` (column 0 is the cursor margin).
    ///
    /// Too narrow for four minimum columns: every column collapses to the minimum
    /// and the right edge clips. Otherwise the widest column loses one cell per
    /// step, ties going to pid, name, memory, cpu in that order.
    pub fn negotiate(cols: u16) -> Self {
        let available = (cols as usize).saturating_sub(1);
        let mut widths = Self::default();
        if widths.total() <= available {
            return widths;
        }
        if available < MIN_WIDTH * 4 {
            return Self {
                pid: MIN_WIDTH,
                name: MIN_WIDTH,
                cpu: MIN_WIDTH,
                memory: MIN_WIDTH,
            };
        }
        while widths.total() > available {
            *widths.widest_mut() -= 1;
        }
        widths
    }

    fn widest_mut(&mut self) -> &mut usize {
        let widest = self.pid.max(self.name).max(self.memory).max(self.cpu);
        if self.pid == widest {
            &mut self.pid
        } else if self.name == widest {
            &mut self.name
        } else if self.memory == widest {
            &mut self.memory
        } else {
            &mut self.cpu
        }
    }

    pub fn total(&self) -> usize {
        self.pid + self.name + self.cpu + self.memory
    }

    /// Left edge and width of each column in screen order: PID, Name, CPU, Memory.
    pub fn columns(&self) -> [(u16, usize); 4] {
        let pid_x = 1;
        let name_x = pid_x + self.pid;
        let cpu_x = name_x + self.name;
        let memory_x = cpu_x + self.cpu;
        [
            (pid_x as u16, self.pid),
            (clamp_u16(name_x), self.name),
            (clamp_u16(cpu_x), self.cpu),
            (clamp_u16(memory_x), self.memory),
        ]
    }
}

fn clamp_u16(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

/// Pads `content` to exactly `width` characters, or cuts it to `width - 3`
/// characters followed by `...`.
pub fn fit_cell(content: &str, width: usize) -> String {
    let len = content.chars().count();
    if len > width {
        let mut cell: String = content.chars().take(width.saturating_sub(3)).collect();
        cell.push_str(&"..."[..width.min(3)]);
        cell
    } else {
        let mut cell = String::with_capacity(width);
        cell.push_str(content);
        cell.extend(std::iter::repeat(' ').take(width - len));
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_terminal_keeps_preferred_widths() {
        assert_eq!(ColumnWidths::negotiate(200), ColumnWidths::default());
        assert_eq!(ColumnWidths::negotiate(81), ColumnWidths::default());
    }

    #[test]
    fn shrinking_takes_from_name_first() {
        let w = ColumnWidths::negotiate(60);
        assert_eq!(w.total(), 59);
        assert_eq!((w.pid, w.cpu, w.memory), (8, 12, 12));
        assert_eq!(w.name, 27);
    }

    #[test]
    fn shrinking_levels_wide_columns_in_scan_order() {
        // 33 columns leave 32 cells: everything ends at the minimum.
        let w = ColumnWidths::negotiate(33);
        assert_eq!(w, ColumnWidths { pid: 8, name: 8, cpu: 8, memory: 8 });

        // 41 leave 40: name shrinks to 12, then the three-way tie is broken
        // name, memory, cpu before name drops once more.
        let w = ColumnWidths::negotiate(41);
        assert_eq!(w, ColumnWidths { pid: 8, name: 10, cpu: 11, memory: 11 });
    }

    #[test]
    fn narrow_terminal_collapses_to_minimum() {
        for cols in [0, 1, 10, 32] {
            let w = ColumnWidths::negotiate(cols);
            assert_eq!(w, ColumnWidths { pid: 8, name: 8, cpu: 8, memory: 8 });
        }
    }

    #[test]
    fn negotiated_widths_fit_and_respect_minimum() {
        for cols in 33..=200u16 {
            let w = ColumnWidths::negotiate(cols);
            assert!(w.total() <= cols as usize - 1, "cols {cols}");
            for width in [w.pid, w.name, w.cpu, w.memory] {
                assert!(width >= MIN_WIDTH, "cols {cols}");
            }
        }
    }

    #[test]
    fn columns_are_laid_out_left_to_right() {
        let cols = ColumnWidths::default().columns();
        assert_eq!(cols, [(1, 8), (9, 48), (57, 12), (69, 12)]);
    }

    #[test]
    fn long_content_is_truncated_with_ellipsis() {
        let cell = fit_cell("systemd-journald", 8);
        assert_eq!(cell, "syste...");
        assert_eq!(cell.chars().count(), 8);
    }

    #[test]
    fn short_content_is_padded() {
        assert_eq!(fit_cell("PID", 8), "PID     ");
        assert_eq!(fit_cell("exactly8", 8), "exactly8");
        assert_eq!(fit_cell("", 3), "   ");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let cell = fit_cell("ééééééééééé", 8);
        assert_eq!(cell, "ééééé...");
    }
}
