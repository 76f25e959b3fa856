//! trash-top: a live, sortable process monitor for the terminal

use backend::MonitorConfig;
use color_eyre::Result;
use std::fs::File;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{prelude::*, EnvFilter};

mod app;
mod state;
mod tui;
mod ui;
mod viewport;

use app::App;

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    init_logging();
    tracing::info!("Starting trash-top");

    let runtime = tokio::runtime::Runtime::new()?;
    let mut app = App::new(MonitorConfig::default(), runtime.handle().clone());
    let result = app.run();

    // Aborted sampling helpers are killed when their tasks are dropped.
    runtime.shutdown_timeout(Duration::from_millis(500));

    tracing::info!("Goodbye!");
    result
}

/// Logs go to a file; stdout belongs to the screen.
fn init_logging() {
    let path = std::env::temp_dir().join("trash-top.log");
    let Ok(log_file) = File::create(&path) else {
        return;
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(EnvFilter::new("info"))
        .init();
}
