//! Acquisition against the host's real `/proc`.

use backend::{
    kill_pid, sort, CpuSampler, MonitorConfig, ProcessSource, SampleFuture, SortKey,
};
use std::process::Command;
use std::sync::Arc;

struct ZeroSampler;

impl CpuSampler for ZeroSampler {
    fn sample(&self, _pid: i32) -> SampleFuture<'_> {
        Box::pin(async { 0.0 })
    }
}

fn unbounded_source() -> ProcessSource {
    let config = MonitorConfig {
        capacity: 1_000_000,
        ..MonitorConfig::default()
    };
    ProcessSource::with_sampler(&config, Arc::new(ZeroSampler))
}

#[tokio::test]
async fn default_capacity_bounds_the_snapshot() {
    let source = ProcessSource::with_sampler(&MonitorConfig::default(), Arc::new(ZeroSampler));
    let snapshot = source.acquire().await;
    assert!(snapshot.len() <= 100);
    assert!(!snapshot.is_empty());
}

#[tokio::test]
async fn own_process_is_listed_with_name() {
    let snapshot = unbounded_source().acquire().await;
    let me = std::process::id() as i32;
    let entry = snapshot.iter().find(|p| p.pid == me).expect("self in snapshot");
    assert!(!entry.name.is_empty());
    assert!(entry.memory_usage.ends_with("kB"));
}

#[tokio::test]
async fn pids_are_unique_and_sortable() {
    let snapshot = sort(unbounded_source().acquire().await, SortKey::Pid);
    assert!(snapshot.as_slice().windows(2).all(|w| w[0].pid < w[1].pid));
}

#[tokio::test]
async fn killed_process_disappears_from_next_snapshot() {
    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id() as i32;
    let source = unbounded_source();

    assert!(source.acquire().await.iter().any(|p| p.pid == pid));

    kill_pid(pid).unwrap();
    child.wait().unwrap();

    assert!(source.acquire().await.iter().all(|p| p.pid != pid));
}

#[tokio::test]
async fn ps_sampler_reports_finite_percentages() {
    let snapshot = ProcessSource::new(&MonitorConfig::default()).acquire().await;
    assert!(snapshot
        .iter()
        .all(|p| p.cpu_percent.is_finite() && p.cpu_percent >= 0.0));
}
