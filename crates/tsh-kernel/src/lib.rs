//! tsh-kernel: the job-control core of tsh.
//!
//! This crate provides:
//!
//! - **Jobs**: the fixed-capacity job table keyed by pid, with user-facing
//!   job ids
//! - **Parser**: command line → argument vector + background flag
//! - **Dispatch**: built-ins (`quit`, `jobs`, `bg`, `fg`), external launch
//!   in fresh process groups, and the foreground gate
//! - **Reaper**: SIGCHLD-driven draining of child state changes
//! - **Signals**: the notification tasks (reaper, interrupt relay, SIGQUIT)
//! - **Kernel**: the facade owning the shared state
//!
//! The binary half of the shell lives in `tsh-repl`.

pub mod dispatch;
pub mod error;
pub mod jobs;
pub mod kernel;
pub mod parser;
pub mod reaper;
mod signals;

pub use dispatch::EvalOutcome;
pub use error::KernelError;
pub use jobs::{Job, JobId, JobState, JobTable, MAX_JOBS};
pub use kernel::{Kernel, KernelConfig};
pub use parser::parse_line;
pub use reaper::ReapEvent;
