//! Kernel — the facade that owns the shared job-control state.
//!
//! The kernel wires the three concurrent parties together:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ read loop ──▶ Kernel::eval ──▶ dispatch (launch/builtins)  │
//! │                     │                                      │
//! │                     ▼                                      │
//! │              Shared { Mutex<JobTable>, Notify }            │
//! │                     ▲                ▲                     │
//! │        SIGCHLD task │                │ SIGINT/SIGTSTP task │
//! │        (reaper)─────┘                └────(relay)          │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mutex is the whole locking discipline: the notification handlers are
//! tokio tasks rather than async-signal handlers, so a handler that needs
//! the table blocks on the lock instead of interrupting a half-finished
//! mutation. The dispatcher holds the lock across fork + registration, so a
//! child can never be reaped before the table knows it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::error::KernelError;
use crate::jobs::{Job, JobTable, MAX_JOBS};
use crate::signals;

/// Kernel construction options.
#[derive(Debug, Clone, Copy)]
pub struct KernelConfig {
    /// Maximum number of concurrently tracked jobs.
    pub max_jobs: usize,
}

impl KernelConfig {
    pub fn new() -> Self {
        Self { max_jobs: MAX_JOBS }
    }

    /// Override the job table capacity (mainly for tests).
    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = max_jobs;
        self
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared between the dispatcher and the notification tasks.
pub(crate) struct Shared {
    table: Mutex<JobTable>,
    /// Woken by the reaper after every table mutation; the foreground gate
    /// parks on it instead of polling.
    pub(crate) fg_gate: Notify,
}

impl Shared {
    pub(crate) fn new(max_jobs: usize) -> Self {
        Self {
            table: Mutex::new(JobTable::with_capacity(max_jobs)),
            fg_gate: Notify::new(),
        }
    }

    /// Lock the job table. A poisoned lock is still structurally sound (all
    /// table mutations are single calls), so recover rather than unwind.
    pub(crate) fn lock(&self) -> MutexGuard<'_, JobTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The job-control core: job table, reaper, interrupt relay, dispatcher.
///
/// Must be created from within a tokio runtime; construction spawns the
/// signal notification tasks.
pub struct Kernel {
    pub(crate) shared: Arc<Shared>,
}

impl Kernel {
    /// Build the shared state and install the notification tasks.
    pub fn new(config: KernelConfig) -> Result<Self, KernelError> {
        let shared = Arc::new(Shared::new(config.max_jobs));
        signals::install(shared.clone())?;
        Ok(Self { shared })
    }

    /// Snapshot of all live jobs, ordered by job id.
    pub fn jobs(&self) -> Vec<Job> {
        self.shared.lock().list()
    }

    /// Pid of the current foreground job, if any.
    pub fn foreground_pid(&self) -> Option<nix::unistd::Pid> {
        self.shared.lock().foreground_pid()
    }
}
