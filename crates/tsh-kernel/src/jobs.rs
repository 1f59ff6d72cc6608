//! Job table — the registry of launched child processes.
//!
//! Every command the shell launches becomes a [`Job`] here, keyed by its
//! process id and carrying a small user-facing job id (`%N`). The table is
//! pure data; the locking discipline around it lives in [`crate::kernel`].

use nix::unistd::Pid;

use crate::error::KernelError;

/// Default maximum number of concurrently tracked jobs.
pub const MAX_JOBS: usize = 16;

/// Unique user-facing identifier for a job (`%N` in `bg`/`fg` arguments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u32);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run-state of a tracked job.
///
/// A job that no longer appears in the table has exited (or was never
/// launched); there is no explicit "undefined" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Running and owning the terminal; the read loop is blocked on it.
    Foreground,
    /// Running detached from the read loop.
    Background,
    /// Suspended by a stop signal; resumable with `bg`/`fg`.
    Stopped,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Listing names match the classic tsh output.
        match self {
            JobState::Foreground => write!(f, "Foreground"),
            JobState::Background => write!(f, "Running"),
            JobState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// One tracked child process.
#[derive(Debug, Clone)]
pub struct Job {
    /// Process id; also the job's process group id (children call
    /// `setpgid(0, 0)` before exec).
    pub pid: Pid,
    /// User-facing job id.
    pub jid: JobId,
    /// Current run-state.
    pub state: JobState,
    /// Original command line, stored with its trailing newline.
    pub command_line: String,
}

impl Job {
    /// The `[jid] (pid) cmdline` announcement line, as printed for
    /// background launches and `bg` resumes. The stored command line
    /// carries the terminating newline.
    pub fn announce(&self) -> String {
        format!("[{}] ({}) {}", self.jid, self.pid, self.command_line)
    }

    /// One line of `jobs` output: jid, pid, state name, command line.
    pub fn listing(&self) -> String {
        format!(
            "[{}] ({}) {} {}",
            self.jid, self.pid, self.state, self.command_line
        )
    }
}

/// Fixed-capacity registry of live jobs.
///
/// Job ids are assigned as `max(existing) + 1`, so they stay unique for the
/// life of an entry and restart at 1 whenever the table drains.
#[derive(Debug)]
pub struct JobTable {
    entries: Vec<Job>,
    capacity: usize,
}

impl JobTable {
    /// Create an empty table with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(MAX_JOBS)
    }

    /// Create an empty table holding at most `capacity` jobs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Register a newly launched process. Fails when the table is full;
    /// the caller decides what to do with the already-running child.
    pub fn insert(
        &mut self,
        pid: Pid,
        state: JobState,
        command_line: &str,
    ) -> Result<JobId, KernelError> {
        if self.entries.len() >= self.capacity {
            return Err(KernelError::JobTableFull(self.capacity));
        }
        let jid = JobId(self.max_jid() + 1);
        let mut command_line = command_line.to_string();
        if !command_line.ends_with('\n') {
            command_line.push('\n');
        }
        tracing::debug!(%pid, %jid, ?state, "job added");
        self.entries.push(Job {
            pid,
            jid,
            state,
            command_line,
        });
        Ok(jid)
    }

    /// Remove the entry for `pid`, returning it if one existed. The caller
    /// reads the jid off the returned job; the table no longer knows it.
    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        let idx = self.entries.iter().position(|j| j.pid == pid)?;
        let job = self.entries.swap_remove(idx);
        tracing::debug!(%pid, jid = %job.jid, "job removed");
        Some(job)
    }

    /// Look up a live job by process id.
    pub fn get(&self, pid: Pid) -> Option<&Job> {
        self.entries.iter().find(|j| j.pid == pid)
    }

    /// Look up a live job by job id.
    pub fn get_by_jid(&self, jid: JobId) -> Option<&Job> {
        self.entries.iter().find(|j| j.jid == jid)
    }

    /// Set the run-state of the job for `pid`. Returns false if the pid is
    /// not tracked (already reaped).
    pub fn set_state(&mut self, pid: Pid, state: JobState) -> bool {
        match self.entries.iter_mut().find(|j| j.pid == pid) {
            Some(job) => {
                tracing::debug!(%pid, jid = %job.jid, ?state, "job state change");
                job.state = state;
                true
            }
            None => false,
        }
    }

    /// Process id of the current foreground job, if any. At most one job is
    /// ever in the foreground.
    pub fn foreground_pid(&self) -> Option<Pid> {
        self.entries
            .iter()
            .find(|j| j.state == JobState::Foreground)
            .map(|j| j.pid)
    }

    /// All live jobs, ordered by job id.
    pub fn list(&self) -> Vec<Job> {
        let mut jobs = self.entries.clone();
        jobs.sort_by_key(|j| j.jid);
        jobs
    }

    /// Drop every entry. Job ids restart at 1 afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live jobs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no jobs are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn max_jid(&self) -> u32 {
        self.entries.iter().map(|j| j.jid.0).max().unwrap_or(0)
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}
