//! Application state and main loop
//!
//! One thread owns the screen and the state. Each pass paints, then polls until
//! something worth a repaint happens: a bound key, a resize, or a fresh snapshot
//! coming back from the acquisition task. Acquisitions run on the tokio runtime
//! and hand their snapshot over a channel; starting a new one aborts the old one.

use backend::{kill_pid, MonitorConfig, ProcessSource, Snapshot};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{backend::Backend, layout::Size, Terminal};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::{AppState, Effect};
use crate::tui::{self, Tui};
use crate::ui;

/// What to do when no input is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idle {
    /// Terminal dimensions changed: clear and repaint, state untouched.
    Repaint,
    /// The refresh interval elapsed and nothing is being acquired.
    Refresh,
    Wait,
}

/// Tracks terminal size and refresh cadence between polls.
#[derive(Debug)]
pub struct Pacer {
    last_size: Size,
    last_refresh: Option<Instant>,
    interval: Duration,
}

impl Pacer {
    pub fn new(size: Size, interval: Duration) -> Self {
        Self {
            last_size: size,
            last_refresh: None,
            interval,
        }
    }

    pub fn on_idle(&mut self, size: Size, now: Instant, acquiring: bool) -> Idle {
        if size != self.last_size {
            self.last_size = size;
            return Idle::Repaint;
        }
        if acquiring {
            return Idle::Wait;
        }
        match self.last_refresh {
            Some(at) if now.duration_since(at) < self.interval => Idle::Wait,
            _ => Idle::Refresh,
        }
    }

    pub fn note_size(&mut self, size: Size) {
        self.last_size = size;
    }

    pub fn mark_refresh(&mut self, now: Instant) {
        self.last_refresh = Some(now);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Redraw,
    Quit,
}

/// Main application state
pub struct App {
    config: MonitorConfig,
    state: AppState,
    source: Arc<ProcessSource>,
    runtime: Handle,
    pacer: Pacer,
    /// Bumped per acquisition so an aborted task's late result is dropped.
    generation: u64,
    acquisition: Option<JoinHandle<()>>,
    snapshot_tx: mpsc::UnboundedSender<(u64, Snapshot)>,
    snapshot_rx: mpsc::UnboundedReceiver<(u64, Snapshot)>,
}

impl App {
    pub fn new(config: MonitorConfig, runtime: Handle) -> Self {
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(config.window_size),
            source: Arc::new(ProcessSource::new(&config)),
            pacer: Pacer::new(Size::default(), config.refresh_interval),
            config,
            runtime,
            generation: 0,
            acquisition: None,
            snapshot_tx,
            snapshot_rx,
        }
    }

    /// Run the application
    pub fn run(&mut self) -> Result<()> {
        tui::leave_on_panic();
        let mut terminal = tui::enter()?;

        let result = self.main_loop(&mut terminal);

        self.cancel_acquisition();
        tui::leave()?;
        result
    }

    fn main_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        self.pacer.note_size(terminal.size()?);

        loop {
            self.state.clamp();
            terminal.draw(|frame| ui::draw(frame, &self.state))?;

            loop {
                match self.poll(terminal)? {
                    Step::Continue => {}
                    Step::Redraw => break,
                    Step::Quit => return Ok(()),
                }
            }
        }
    }

    fn poll(&mut self, terminal: &mut Tui) -> Result<Step> {
        if event::poll(self.config.poll_interval)? {
            return match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => Ok(self.dispatch(key.code)),
                Event::Resize(cols, rows) => self.resized(terminal, Size::new(cols, rows)),
                _ => Ok(Step::Continue),
            };
        }
        self.idle(terminal)
    }

    /// Clears the screen for a repaint at `size`. The state is left as it is.
    fn resized<B: Backend>(&mut self, terminal: &mut Terminal<B>, size: Size) -> Result<Step> {
        self.pacer.note_size(size);
        terminal.clear()?;
        Ok(Step::Redraw)
    }

    /// No input pending: resize check, then snapshot handover, then refresh.
    fn idle<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<Step> {
        let size = terminal.size()?;
        let acquiring = self.is_acquiring();
        let idle = self.pacer.on_idle(size, Instant::now(), acquiring);
        if idle == Idle::Repaint {
            return self.resized(terminal, size);
        }
        if self.receive_snapshot() {
            return Ok(Step::Redraw);
        }
        if idle == Idle::Refresh {
            self.request_acquisition();
        }
        Ok(Step::Continue)
    }

    fn dispatch(&mut self, code: KeyCode) -> Step {
        match self.state.handle_key(code) {
            None => Step::Continue,
            Some(Effect::Redraw) => Step::Redraw,
            Some(Effect::Acquire) => {
                info!("sorting by {}", self.state.sort_key().label());
                self.request_acquisition();
                Step::Redraw
            }
            Some(Effect::Kill(pid)) => {
                self.kill(pid);
                self.request_acquisition();
                Step::Redraw
            }
            Some(Effect::Quit) => Step::Quit,
        }
    }

    fn kill(&mut self, pid: i32) {
        match kill_pid(pid) {
            Ok(()) => self.state.set_message(format!("Sent SIGTERM to {pid}")),
            Err(e) => {
                warn!("kill {} failed: {}", pid, e);
                self.state.set_message(format!("Kill {pid} failed: {e}"));
            }
        }
    }

    fn is_acquiring(&self) -> bool {
        self.acquisition
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn request_acquisition(&mut self) {
        self.cancel_acquisition();
        self.generation += 1;
        self.pacer.mark_refresh(Instant::now());

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let tx = self.snapshot_tx.clone();
        self.acquisition = Some(self.runtime.spawn(async move {
            let snapshot = source.acquire().await;
            // The receiver only goes away at shutdown.
            let _ = tx.send((generation, snapshot));
        }));
    }

    fn cancel_acquisition(&mut self) {
        if let Some(handle) = self.acquisition.take() {
            if !handle.is_finished() {
                debug!("aborting acquisition {}", self.generation);
                handle.abort();
            }
        }
    }

    /// Takes the newest current-generation snapshot, if one arrived.
    fn receive_snapshot(&mut self) -> bool {
        let mut latest = None;
        while let Ok((generation, snapshot)) = self.snapshot_rx.try_recv() {
            if generation == self.generation {
                latest = Some(snapshot);
            }
        }
        match latest {
            Some(snapshot) => {
                self.state.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::ProcessDescriptor;
    use ratatui::backend::TestBackend;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn first_idle_poll_refreshes() {
        let mut pacer = Pacer::new(Size::new(80, 24), SECOND);
        assert_eq!(pacer.on_idle(Size::new(80, 24), Instant::now(), false), Idle::Refresh);
    }

    #[test]
    fn refresh_waits_for_interval() {
        let start = Instant::now();
        let mut pacer = Pacer::new(Size::new(80, 24), SECOND);
        pacer.mark_refresh(start);
        let size = Size::new(80, 24);
        assert_eq!(pacer.on_idle(size, start + Duration::from_millis(500), false), Idle::Wait);
        assert_eq!(pacer.on_idle(size, start + SECOND, false), Idle::Refresh);
    }

    #[test]
    fn no_second_acquisition_while_one_runs() {
        let start = Instant::now();
        let mut pacer = Pacer::new(Size::new(80, 24), SECOND);
        pacer.mark_refresh(start);
        assert_eq!(pacer.on_idle(Size::new(80, 24), start + 5 * SECOND, true), Idle::Wait);
    }

    #[test]
    fn resize_wins_over_due_refresh() {
        let start = Instant::now();
        let mut pacer = Pacer::new(Size::new(80, 24), SECOND);
        pacer.mark_refresh(start);
        assert_eq!(pacer.on_idle(Size::new(100, 30), start + 5 * SECOND, false), Idle::Repaint);
        assert_eq!(pacer.on_idle(Size::new(100, 30), start + 5 * SECOND, false), Idle::Refresh);
    }

    fn scrolled_app() -> App {
        let mut app = App::new(MonitorConfig::default(), Handle::current());
        let entries = (1..=6)
            .map(|pid| ProcessDescriptor::new(pid, "p", "1 kB", 0.0))
            .collect();
        app.state.apply_snapshot(Snapshot::new(entries, 100));
        for _ in 0..5 {
            app.state.handle_key(KeyCode::Down);
        }
        app.state.clamp();
        app
    }

    #[tokio::test]
    async fn terminal_resize_repaints_without_touching_state() {
        let mut app = scrolled_app();
        let before = app.state.clone();
        assert_eq!(app.state.viewport().cursor(), 5);
        assert_eq!(app.state.viewport().rows().start, 2);

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        app.pacer.note_size(terminal.size().unwrap());
        terminal.draw(|frame| ui::draw(frame, &app.state)).unwrap();
        terminal.backend_mut().resize(100, 30);

        assert_eq!(app.idle(&mut terminal).unwrap(), Step::Redraw);
        assert_eq!(app.state, before);
        assert!(app.acquisition.is_none());
        let screen = terminal.backend().buffer();
        assert!(screen.content.iter().all(|cell| cell.symbol() == " "));

        terminal.draw(|frame| ui::draw(frame, &app.state)).unwrap();
        assert_eq!(terminal.backend().buffer().area.width, 100);
        assert_eq!(app.state, before);
    }

    #[tokio::test]
    async fn resize_event_repaints_without_touching_state() {
        let mut app = scrolled_app();
        let before = app.state.clone();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        let step = app.resized(&mut terminal, Size::new(120, 40)).unwrap();
        assert_eq!(step, Step::Redraw);
        assert_eq!(app.state, before);
        assert_eq!(
            app.pacer.on_idle(Size::new(120, 40), Instant::now(), true),
            Idle::Wait
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stale_generations_are_dropped() {
        let mut app = App::new(MonitorConfig::default(), Handle::current());
        app.generation = 2;
        let old = Snapshot::new(vec![ProcessDescriptor::new(1, "old", "", 0.0)], 100);
        let new = Snapshot::new(vec![ProcessDescriptor::new(2, "new", "", 0.0)], 100);
        app.snapshot_tx.send((1, old)).unwrap();
        app.snapshot_tx.send((2, new)).unwrap();

        assert!(app.receive_snapshot());
        assert_eq!(app.state.snapshot().get(0).map(|p| p.pid), Some(2));
        assert!(!app.receive_snapshot());
    }
}
