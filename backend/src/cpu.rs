//! CPU usage sampling.
//!
//! `ps` is spawned once per pid. When the helper is not installed at all, sampling
//! switches to tick counters read straight out of procfs. Either way there is one
//! percentage per pid per acquisition, and `0.0` whenever it cannot be obtained.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

pub type SampleFuture<'a> = Pin<Box<dyn Future<Output = f64> + Send + 'a>>;

/// Source of an instantaneous CPU percentage for one pid.
pub trait CpuSampler: Send + Sync {
    /// Never fails: anything unreadable comes back as `0.0`.
    fn sample(&self, pid: i32) -> SampleFuture<'_>;

    /// Called once per acquisition with the pids that made it into the snapshot.
    fn retain(&self, _live: &[i32]) {}
}

/// Runs `ps -o %cpu= -p <pid>` and parses its single line of output.
///
/// With a fallback attached, the first spawn that fails because the program does
/// not exist switches this sampler over to the fallback for good.
pub struct PsSampler {
    program: String,
    timeout: Duration,
    fallback: Option<ProcStatSampler>,
    helper_missing: AtomicBool,
}

impl PsSampler {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("ps", timeout)
    }

    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            fallback: None,
            helper_missing: AtomicBool::new(false),
        }
    }

    pub fn with_fallback(mut self, fallback: ProcStatSampler) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// True once samples come from the fallback instead of the helper.
    pub fn using_fallback(&self) -> bool {
        self.fallback.is_some() && self.helper_missing.load(Ordering::Relaxed)
    }

    async fn run(&self, pid: i32) -> f64 {
        if let Some(fallback) = self.fallback.as_ref().filter(|_| self.using_fallback()) {
            return fallback.sample_now(pid);
        }
        match self.spawn_helper(pid).await {
            Ok(value) => value,
            Err(e) if e.kind() == io::ErrorKind::NotFound && self.fallback.is_some() => {
                if !self.helper_missing.swap(true, Ordering::Relaxed) {
                    warn!("{} not found, reading cpu ticks from procfs instead", self.program);
                }
                self.fallback.as_ref().map_or(0.0, |f| f.sample_now(pid))
            }
            Err(e) => {
                debug!("cpu sample for {} failed to spawn {}: {}", pid, self.program, e);
                0.0
            }
        }
    }

    /// Spawn errors are returned; a timeout is a `0.0` sample.
    async fn spawn_helper(&self, pid: i32) -> io::Result<f64> {
        let pid_arg = pid.to_string();
        let child = Command::new(&self.program)
            .args(["-o", "%cpu=", "-p", pid_arg.as_str()])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        // `output()` waits for exit, so the helper is reaped on every path;
        // on timeout the future is dropped and kill_on_drop takes over.
        match tokio::time::timeout(self.timeout, child).await {
            Ok(output) => Ok(parse_cpu_output(&String::from_utf8_lossy(&output?.stdout))),
            Err(_) => {
                debug!("cpu sample for {} timed out", pid);
                Ok(0.0)
            }
        }
    }
}

impl CpuSampler for PsSampler {
    fn sample(&self, pid: i32) -> SampleFuture<'_> {
        Box::pin(self.run(pid))
    }

    fn retain(&self, live: &[i32]) {
        if let Some(fallback) = &self.fallback {
            fallback.retain(live);
        }
    }
}

/// Parses the first line of a sampling helper's output as a percentage.
pub fn parse_cpu_output(output: &str) -> f64 {
    output
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

#[derive(Clone, Copy)]
struct TickSample {
    process_ticks: u64,
    system_ticks: u64,
}

/// Percentage of all CPU time spent by one process between two tick readings.
fn tick_delta_percent(prev: TickSample, now: TickSample) -> f64 {
    let process = now.process_ticks.saturating_sub(prev.process_ticks) as f64;
    let system = now.system_ticks.saturating_sub(prev.system_ticks) as f64;
    if system <= 0.0 {
        return 0.0;
    }
    (process / system * 100.0).clamp(0.0, 100.0)
}

/// Reads utime+stime through procfs and diffs it against the previous reading
/// for the same pid. A pid's first sample is `0.0`. Used as the `ps` fallback.
pub struct ProcStatSampler {
    root: PathBuf,
    previous: Mutex<HashMap<i32, TickSample>>,
}

impl ProcStatSampler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            previous: Mutex::new(HashMap::new()),
        }
    }

    fn read_system_ticks(root: &Path) -> u64 {
        // First line of <root>/stat: "cpu  user nice system idle iowait irq softirq steal ..."
        std::fs::read_to_string(root.join("stat"))
            .ok()
            .and_then(|content| {
                let line = content.lines().next()?.to_string();
                line.starts_with("cpu ").then(|| {
                    line.split_whitespace()
                        .skip(1)
                        .take(8)
                        .filter_map(|s| s.parse::<u64>().ok())
                        .sum::<u64>()
                })
            })
            .unwrap_or(0)
    }

    fn read_process_ticks(&self, pid: i32) -> Option<u64> {
        let process = procfs::process::Process::new_with_root(self.root.join(pid.to_string()));
        match process.and_then(|p| p.stat()) {
            Ok(stat) => Some(stat.utime + stat.stime),
            Err(e) => {
                debug!("stat for {} unreadable: {}", pid, e);
                None
            }
        }
    }

    fn sample_now(&self, pid: i32) -> f64 {
        let Some(process_ticks) = self.read_process_ticks(pid) else {
            return 0.0;
        };
        let now = TickSample {
            process_ticks,
            system_ticks: Self::read_system_ticks(&self.root),
        };
        let Ok(mut previous) = self.previous.lock() else {
            return 0.0;
        };
        match previous.insert(pid, now) {
            Some(prev) => tick_delta_percent(prev, now),
            None => 0.0,
        }
    }
}

impl CpuSampler for ProcStatSampler {
    fn sample(&self, pid: i32) -> SampleFuture<'_> {
        Box::pin(async move { self.sample_now(pid) })
    }

    fn retain(&self, live: &[i32]) {
        let live: HashSet<i32> = live.iter().copied().collect();
        if let Ok(mut previous) = self.previous.lock() {
            previous.retain(|pid, _| live.contains(pid));
        }
    }
}
