//! Cursor and scroll offset over the current snapshot.

use std::ops::Range;

/// Keeps `offset <= cursor < offset + window` at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    cursor: usize,
    offset: usize,
    window: usize,
}

impl Viewport {
    pub fn new(window: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            window: window.max(1),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Snapshot indices covered by the window; may run past the snapshot end.
    pub fn rows(&self) -> Range<usize> {
        self.offset..self.offset + self.window
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            if self.cursor < self.offset {
                self.offset -= 1;
            }
        }
    }

    pub fn move_down(&mut self, count: usize) {
        if self.cursor + 1 < count {
            self.cursor += 1;
            if self.cursor - self.offset >= self.window {
                self.offset += 1;
            }
        }
    }

    /// Pulls the cursor back inside a snapshot of `count` rows. Run before every render.
    pub fn clamp(&mut self, count: usize) {
        if self.cursor >= count {
            self.cursor = count.saturating_sub(1);
        }
        if self.offset > self.cursor {
            self.offset = self.cursor;
        }
    }
}
