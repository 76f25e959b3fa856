//! Snapshot ordering.

use crate::types::{ProcessDescriptor, Snapshot};
use std::cmp::Ordering;

/// Selectable ordering for a snapshot.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum SortKey {
    /// Ascending pid.
    #[default]
    Pid,
    /// Descending name, raw byte order.
    Name,
    /// Descending memory *string*. `"9000 kB"` sorts above `"10000 kB"`:
    /// the kernel-formatted text is compared as-is, not as a number.
    Memory,
    /// Descending CPU percentage.
    Cpu,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Pid => "PID",
            SortKey::Name => "Name",
            SortKey::Memory => "Memory (text)",
            SortKey::Cpu => "CPU",
        }
    }

    fn compare(self, a: &ProcessDescriptor, b: &ProcessDescriptor) -> Ordering {
        match self {
            SortKey::Pid => a.pid.cmp(&b.pid),
            SortKey::Name => b.name.cmp(&a.name),
            SortKey::Memory => b.memory_usage.cmp(&a.memory_usage),
            SortKey::Cpu => ord_f64(b.cpu_percent, a.cpu_percent),
        }
    }
}

/// Returns `snapshot` reordered by `key`.
pub fn sort(snapshot: Snapshot, key: SortKey) -> Snapshot {
    let capacity = snapshot.len();
    let mut entries = snapshot.into_entries();
    entries.sort_by(|a, b| key.compare(a, b));
    Snapshot::new(entries, capacity)
}

// Safe f64 ordering (handles NaN)
fn ord_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
