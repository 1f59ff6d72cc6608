//! Kernel error types.
//!
//! User input mistakes (bad `bg`/`fg` arguments, unknown jobs) are not
//! errors here — they are printed and the read loop continues. `KernelError`
//! covers the conditions the dispatcher itself must react to: a full job
//! table, and OS primitives failing underneath the shell.

use thiserror::Error;

/// Errors surfaced by the job-control core.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The job table already holds its maximum number of jobs.
    #[error("tried to create too many jobs (limit {0})")]
    JobTableFull(usize),

    /// An OS primitive the shell cannot run without (fork, waitpid, kill)
    /// failed. Fatal: the read loop reports it and exits.
    #[error("os error: {0}")]
    Os(#[from] nix::Error),

    /// Installing the signal notification streams failed at startup.
    #[error("signal setup failed: {0}")]
    Signal(#[from] std::io::Error),
}
