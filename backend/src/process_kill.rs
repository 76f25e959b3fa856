//! Process termination.

use crate::types::ProcError;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::info;

/// Sends SIGTERM to `pid` and returns immediately.
///
/// There is no wait and no escalation: the process is gone once it no longer
/// shows up in a later snapshot.
pub fn kill_pid(pid: i32) -> Result<(), ProcError> {
    if pid <= 0 {
        // 0 and negatives address process groups, never a single row.
        return Err(ProcError::NotFound(pid));
    }

    signal::kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(|e| match e {
        Errno::ESRCH => ProcError::NotFound(pid),
        Errno::EPERM => ProcError::PermissionDenied(pid),
        other => ProcError::SignalError(pid, other.to_string()),
    })?;

    info!("sent SIGTERM to {}", pid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn terminates_a_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        kill_pid(child.id() as i32).unwrap();
        let status = child.wait().unwrap();
        assert!(!status.success());
    }

    #[test]
    fn group_pids_are_rejected() {
        assert!(matches!(kill_pid(0), Err(ProcError::NotFound(0))));
        assert!(matches!(kill_pid(-1), Err(ProcError::NotFound(-1))));
    }
}
