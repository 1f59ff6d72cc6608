//! Reaper — drains child state changes and updates the job table.
//!
//! SIGCHLD coalesces: one notification may stand for any number of child
//! state changes, so every pass loops `waitpid(-1, WNOHANG | WUNTRACED)`
//! until the kernel has nothing more to report. Each wait result is one
//! complete, independent status; no ordering is assumed between different
//! children within a batch.

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::jobs::{JobId, JobState, JobTable};
use crate::kernel::Shared;

/// A user-visible consequence of reaping one child status.
///
/// Normal exits are silent, so they produce no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReapEvent {
    /// A tracked job was suspended by a stop signal.
    Stopped { jid: JobId, pid: Pid, signal: i32 },
    /// A tracked job was killed by a signal and removed. The jid is captured
    /// before removal; afterwards the table no longer knows it.
    Terminated { jid: JobId, pid: Pid, signal: i32 },
}

impl std::fmt::Display for ReapEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReapEvent::Stopped { jid, pid, signal } => {
                write!(f, "Job [{jid}] ({pid}) stopped by signal {signal}")
            }
            ReapEvent::Terminated { jid, pid, signal } => {
                write!(f, "Job [{jid}] ({pid}) terminated by signal {signal}")
            }
        }
    }
}

/// Apply one wait status to the table.
///
/// Statuses for pids the table does not track are dropped without output:
/// removal only announces itself when an entry actually existed.
pub fn apply_status(table: &mut JobTable, status: WaitStatus) -> Option<ReapEvent> {
    match status {
        WaitStatus::Exited(pid, _) => {
            // Normal exit: remove silently.
            table.remove(pid);
            None
        }
        WaitStatus::Signaled(pid, signal, _) => table.remove(pid).map(|job| {
            ReapEvent::Terminated {
                jid: job.jid,
                pid,
                signal: signal as i32,
            }
        }),
        WaitStatus::Stopped(pid, signal) => {
            if !table.set_state(pid, JobState::Stopped) {
                return None;
            }
            table.get(pid).map(|job| ReapEvent::Stopped {
                jid: job.jid,
                pid,
                signal: signal as i32,
            })
        }
        _ => None,
    }
}

/// Drain all pending child state changes. Never blocks: `WNOHANG` turns an
/// empty queue into `StillAlive`, and `WUNTRACED` makes stopped children
/// visible alongside exited ones.
pub(crate) fn drain(shared: &Shared) -> Vec<ReapEvent> {
    let mut events = Vec::new();
    loop {
        match waitpid(None, Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(status) => {
                // One lock scope per status: each is a complete update.
                if let Some(event) = apply_status(&mut shared.lock(), status) {
                    events.push(event);
                }
            }
            Err(Errno::ECHILD) => break,
            Err(Errno::EINTR) => continue,
            Err(e) => {
                tracing::warn!("waitpid failed: {e}");
                break;
            }
        }
    }
    events
}
