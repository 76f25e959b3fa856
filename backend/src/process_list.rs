//! Process snapshot acquisition.
//!
//! Enumerates numeric entries of the proc root, reads `Name:` and `VmSize:` out of
//! each `status` file, then samples CPU usage for the survivors through a bounded
//! pool of concurrent sampling tasks. No error escapes `acquire`: an unreadable
//! root gives an empty snapshot, a vanished pid is skipped, an unreadable CPU
//! value is `0.0` and a missing status field is an empty string.

use crate::cpu::{CpuSampler, ProcStatSampler, PsSampler};
use crate::types::{MonitorConfig, ProcError, ProcessDescriptor, Snapshot};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Fields of interest from a `/proc/<pid>/status` block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusFields {
    pub name: String,
    pub memory: String,
}

/// Extracts the first `Name:` and `VmSize:` lines, trimmed. Missing labels stay empty.
pub fn parse_status(text: &str) -> StatusFields {
    StatusFields {
        name: labelled_value(text, "Name:").unwrap_or_default(),
        memory: labelled_value(text, "VmSize:").unwrap_or_default(),
    }
}

fn labelled_value(text: &str, label: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix(label))
        .map(|value| value.trim().to_string())
}

fn is_pid_entry(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Lists candidate pids, in directory order. Only failing to open the root is
/// an error; a read failure midway keeps the pids found so far.
pub async fn list_candidates(root: &Path) -> Result<Vec<i32>, ProcError> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<Vec<i32>, ProcError> {
        let entries = std::fs::read_dir(&root)?;
        Ok(collect_pids(entries.map(|entry| entry.map(|e| e.file_name()))))
    })
    .await
    .map_err(|e| ProcError::Io(e.to_string()))?
}

fn collect_pids(entries: impl IntoIterator<Item = io::Result<OsString>>) -> Vec<i32> {
    let mut pids = Vec::new();
    for entry in entries {
        let name = match entry {
            Ok(name) => name,
            Err(e) => {
                warn!("directory read stopped after {} pids: {}", pids.len(), e);
                break;
            }
        };
        let Some(name) = name.to_str() else { continue };
        if !is_pid_entry(name) {
            continue;
        }
        if let Ok(pid) = name.parse::<i32>() {
            pids.push(pid);
        }
    }
    pids
}

async fn read_status(root: &Path, pid: i32) -> Result<StatusFields, ProcError> {
    let path = root.join(pid.to_string()).join("status");
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Ok(parse_status(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ProcError::NotFound(pid)),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(ProcError::PermissionDenied(pid))
        }
        Err(e) => Err(e.into()),
    }
}

/// Produces bounded snapshots of the processes under a proc root.
pub struct ProcessSource {
    root: PathBuf,
    capacity: usize,
    max_in_flight: usize,
    sampler: Arc<dyn CpuSampler>,
}

impl ProcessSource {
    /// Samples through `ps`, falling back to procfs tick counters if it is missing.
    pub fn new(config: &MonitorConfig) -> Self {
        let sampler = PsSampler::new(config.sample_timeout)
            .with_fallback(ProcStatSampler::new(&config.proc_root));
        Self::with_sampler(config, Arc::new(sampler))
    }

    pub fn with_sampler(config: &MonitorConfig, sampler: Arc<dyn CpuSampler>) -> Self {
        Self {
            root: config.proc_root.clone(),
            capacity: config.capacity,
            max_in_flight: config.max_in_flight.max(1),
            sampler,
        }
    }

    /// Takes one snapshot. Dropping the returned future cancels the acquisition,
    /// including any sampling helpers still running.
    pub async fn acquire(&self) -> Snapshot {
        let candidates = match list_candidates(&self.root).await {
            Ok(pids) => pids,
            Err(e) => {
                warn!("cannot list {}: {}", self.root.display(), e);
                return Snapshot::empty();
            }
        };

        let mut found = Vec::with_capacity(self.capacity.min(candidates.len()));
        for pid in candidates {
            if found.len() >= self.capacity {
                break;
            }
            match read_status(&self.root, pid).await {
                Ok(fields) => found.push((pid, fields)),
                Err(e) => debug!("skipping pid {}: {}", pid, e),
            }
        }

        let cpu = self.sample_all(found.iter().map(|(pid, _)| *pid)).await;
        let pids: Vec<i32> = found.iter().map(|(pid, _)| *pid).collect();
        self.sampler.retain(&pids);

        let entries = found
            .into_iter()
            .zip(cpu)
            .map(|((pid, fields), cpu)| {
                ProcessDescriptor::new(pid, &fields.name, &fields.memory, cpu)
            })
            .collect();
        let snapshot = Snapshot::new(entries, self.capacity);
        debug!("acquired {} processes", snapshot.len());
        snapshot
    }

    /// One sample per pid, at most `max_in_flight` at a time, returned in input order.
    async fn sample_all(&self, pids: impl Iterator<Item = i32>) -> Vec<f64> {
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();
        let mut count = 0;

        for (index, pid) in pids.enumerate() {
            count += 1;
            let sampler = Arc::clone(&self.sampler);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, 0.0);
                };
                (index, sampler.sample(pid).await)
            });
        }

        let mut cpu = vec![0.0; count];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, value)) => cpu[index] = value,
                Err(e) => debug!("cpu sampling task failed: {}", e),
            }
        }
        cpu
    }
}
