//! Data types and error definitions for process snapshots.

use std::time::Duration;
use thiserror::Error;

/// Longest process name kept in a descriptor, in bytes.
pub const MAX_NAME_LEN: usize = 127;
/// Longest memory string kept in a descriptor, in bytes.
pub const MAX_MEM_LEN: usize = 63;

/// Represents a process entry in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessDescriptor {
    pub pid: i32,
    pub name: String,
    /// `VmSize` exactly as the kernel formats it, e.g. `"12345 kB"`.
    pub memory_usage: String,
    pub cpu_percent: f64,
}

impl ProcessDescriptor {
    pub fn new(pid: i32, name: &str, memory_usage: &str, cpu_percent: f64) -> Self {
        Self {
            pid,
            name: bounded(name, MAX_NAME_LEN),
            memory_usage: bounded(memory_usage, MAX_MEM_LEN),
            cpu_percent,
        }
    }
}

fn bounded(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// One acquisition worth of processes. Replaced wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<ProcessDescriptor>,
}

impl Snapshot {
    /// Builds a snapshot, dropping anything past `capacity`.
    pub fn new(mut entries: Vec<ProcessDescriptor>, capacity: usize) -> Self {
        entries.truncate(capacity);
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProcessDescriptor> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessDescriptor> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[ProcessDescriptor] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ProcessDescriptor> {
        self.entries
    }
}

/// Fixed tunables of the monitor. There is no config file; tests build their own.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub proc_root: std::path::PathBuf,
    pub capacity: usize,
    pub max_in_flight: usize,
    pub sample_timeout: Duration,
    pub refresh_interval: Duration,
    pub window_size: usize,
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            proc_root: "/proc".into(),
            capacity: 100,
            max_in_flight: 8,
            sample_timeout: Duration::from_secs(2),
            refresh_interval: Duration::from_secs(1),
            window_size: 4,
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Errors that can occur during process management.
#[derive(Error, Debug)]
pub enum ProcError {
    #[error("Permission denied for PID {0}")]
    PermissionDenied(i32),
    #[error("Process {0} not found")]
    NotFound(i32),
    #[error("Failed to send signal to PID {0}: {1}")]
    SignalError(i32, String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Procfs error: {0}")]
    ProcfsError(String),
}

impl From<procfs::ProcError> for ProcError {
    fn from(err: procfs::ProcError) -> Self {
        ProcError::ProcfsError(err.to_string())
    }
}

impl From<std::io::Error> for ProcError {
    fn from(err: std::io::Error) -> Self {
        ProcError::Io(err.to_string())
    }
}
