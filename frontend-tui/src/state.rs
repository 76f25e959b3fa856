//! Monitor state and its key-driven transitions.
//!
//! Everything the screen shows lives in one `AppState` value owned by the loop
//! thread. Transitions never touch the terminal or the OS: they return an
//! `Effect` and the loop performs it.

use backend::{sort, Snapshot, SortKey};
use crossterm::event::KeyCode;

use crate::viewport::Viewport;

/// What the loop has to do after a recognized key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Redraw,
    Acquire,
    Kill(i32),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    snapshot: Snapshot,
    sort_key: SortKey,
    viewport: Viewport,
    message: Option<String>,
}

impl AppState {
    pub fn new(window: usize) -> Self {
        Self {
            snapshot: Snapshot::empty(),
            sort_key: SortKey::default(),
            viewport: Viewport::new(window),
            message: None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Replaces the snapshot wholesale, ordered by the current key.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = sort(snapshot, self.sort_key);
    }

    /// Must run before every render.
    pub fn clamp(&mut self) {
        self.viewport.clamp(self.snapshot.len());
    }

    /// `None` means the key is not bound and the loop keeps polling.
    pub fn handle_key(&mut self, code: KeyCode) -> Option<Effect> {
        match code {
            KeyCode::Up => {
                self.viewport.move_up();
                Some(Effect::Redraw)
            }
            KeyCode::Down => {
                self.viewport.move_down(self.snapshot.len());
                Some(Effect::Redraw)
            }
            KeyCode::F(5) => Some(self.select_sort(SortKey::Pid)),
            KeyCode::F(6) => Some(self.select_sort(SortKey::Name)),
            KeyCode::F(7) => Some(self.select_sort(SortKey::Cpu)),
            KeyCode::F(8) => Some(self.select_sort(SortKey::Memory)),
            KeyCode::F(9) => Some(self.kill_selected()),
            KeyCode::F(10) => Some(Effect::Quit),
            _ => None,
        }
    }

    fn select_sort(&mut self, key: SortKey) -> Effect {
        self.sort_key = key;
        let current = std::mem::take(&mut self.snapshot);
        self.snapshot = sort(current, key);
        Effect::Acquire
    }

    fn kill_selected(&mut self) -> Effect {
        match self.snapshot.get(self.viewport.cursor()) {
            Some(process) => Effect::Kill(process.pid),
            None => Effect::Redraw,
        }
    }
}
