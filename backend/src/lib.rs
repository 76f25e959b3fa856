//! UI-agnostic process snapshot library for Linux.
//!
//! Provides bounded process snapshots (name, `VmSize`, CPU percentage), their
//! orderings, and SIGTERM delivery. Uses `procfs`, `nix` and `tokio`.

mod cpu;
mod process_kill;
mod process_list;
mod sort;
mod types;

pub use cpu::{parse_cpu_output, CpuSampler, ProcStatSampler, PsSampler, SampleFuture};
pub use process_kill::kill_pid;
pub use process_list::{list_candidates, parse_status, ProcessSource, StatusFields};
pub use sort::{sort, SortKey};
pub use types::{
    MonitorConfig, ProcError, ProcessDescriptor, Snapshot, MAX_MEM_LEN, MAX_NAME_LEN,
};
