//! Dispatch — turn one parsed command line into a built-in effect or a job.
//!
//! The single synchronous control flow of the shell: parse, decide built-in
//! vs. external, launch external commands in fresh process groups, register
//! them, and for foreground jobs park on the foreground gate until the
//! reaper moves the job out of the foreground state.

use std::ffi::CString;
use std::pin::pin;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::{execvp, fork, setpgid, write, ForkResult, Pid};

use crate::error::KernelError;
use crate::jobs::{JobId, JobState};
use crate::kernel::Kernel;
use crate::parser::parse_line;

/// What the read loop should do after evaluating a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalOutcome {
    /// Read the next command.
    Continue,
    /// The `quit` built-in: exit the shell with status 0.
    Quit,
}

impl Kernel {
    /// Evaluate one command line.
    ///
    /// Blank lines are ignored. Foreground launches (and `fg`) do not return
    /// until the job leaves the foreground state. The only error this
    /// returns is a failed OS primitive, which is fatal to the shell; user
    /// mistakes are printed and swallowed.
    pub async fn eval(&self, line: &str) -> Result<EvalOutcome, KernelError> {
        let (argv, background) = parse_line(line);
        let Some(command) = argv.first() else {
            return Ok(EvalOutcome::Continue);
        };

        match command.as_str() {
            "quit" => Ok(EvalOutcome::Quit),
            "jobs" => {
                self.list_jobs();
                Ok(EvalOutcome::Continue)
            }
            "bg" | "fg" => {
                self.resume(&argv).await;
                Ok(EvalOutcome::Continue)
            }
            _ => {
                self.launch(&argv, background, line).await?;
                Ok(EvalOutcome::Continue)
            }
        }
    }

    /// The `jobs` built-in: one line per tracked job, in jid order.
    fn list_jobs(&self) {
        let jobs = self.shared.lock().list();
        for job in jobs {
            print!("{}", job.listing());
        }
    }

    /// The `bg`/`fg` built-ins: resolve a `<pid>` or `%<jid>` argument,
    /// deliver SIGCONT to the job's process group, and record the new state.
    /// `fg` additionally parks on the foreground gate.
    async fn resume(&self, argv: &[String]) {
        let cmd = argv[0].as_str();
        let Some(target) = argv.get(1) else {
            println!("{cmd} command requires PID or %jobid argument");
            return;
        };

        let pid = if let Some(jid_str) = target.strip_prefix('%') {
            let Ok(jid) = jid_str.parse::<u32>() else {
                println!("{cmd}: argument must be a PID or %jobid");
                return;
            };
            match self.shared.lock().get_by_jid(JobId(jid)) {
                Some(job) => job.pid,
                None => {
                    println!("{target}: No such job");
                    return;
                }
            }
        } else if target.starts_with(|c: char| c.is_ascii_digit()) {
            let Ok(raw) = target.parse::<i32>() else {
                println!("{cmd}: argument must be a PID or %jobid");
                return;
            };
            let pid = Pid::from_raw(raw);
            if self.shared.lock().get(pid).is_none() {
                println!("({raw}): No such process");
                return;
            }
            pid
        } else {
            println!("{cmd}: argument must be a PID or %jobid");
            return;
        };

        // Continue the whole process group first, then record the new state.
        if let Err(e) = killpg(pid, Signal::SIGCONT) {
            tracing::warn!(%pid, "failed to deliver SIGCONT: {e}");
        }

        if cmd == "fg" {
            self.shared.lock().set_state(pid, JobState::Foreground);
            self.wait_foreground(pid).await;
        } else {
            let announce = {
                let mut table = self.shared.lock();
                table.set_state(pid, JobState::Background);
                table.get(pid).map(|job| job.announce())
            };
            if let Some(line) = announce {
                print!("{line}");
            }
        }
    }

    /// Launch an external command as a new job in its own process group.
    async fn launch(
        &self,
        argv: &[String],
        background: bool,
        line: &str,
    ) -> Result<(), KernelError> {
        let program = argv[0].as_str();

        // Everything the child needs is built before forking; between fork
        // and exec only async-signal-safe calls are allowed.
        let c_argv: Vec<CString> = match argv
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<_, _>>()
        {
            Ok(v) => v,
            Err(_) => {
                println!("{program}: Command not found");
                return Ok(());
            }
        };
        let not_found = format!("{program}: Command not found\n");

        let child;
        let announce;
        {
            // Registration window: holding the table lock across fork +
            // insert means the reaper cannot reap a child the table does
            // not yet know about.
            let mut table = self.shared.lock();

            child = match unsafe { fork() }? {
                ForkResult::Child => {
                    // Own process group, so keyboard signals hit the job
                    // and never the shell.
                    let _ = setpgid(Pid::from_raw(0), Pid::from_raw(0));
                    let _ = execvp(&c_argv[0], &c_argv);
                    // exec failed: report and leave; never return into the
                    // shell's code path.
                    let _ = write(std::io::stdout(), not_found.as_bytes());
                    unsafe { nix::libc::_exit(1) }
                }
                ForkResult::Parent { child } => {
                    // Mirror the child's setpgid so the group exists before
                    // anyone signals it, whichever side runs first.
                    let _ = setpgid(child, child);
                    child
                }
            };

            let state = if background {
                JobState::Background
            } else {
                JobState::Foreground
            };
            match table.insert(child, state, line) {
                Ok(_) => {}
                Err(full @ KernelError::JobTableFull(_)) => {
                    drop(table);
                    // Don't leak a child no table entry tracks.
                    let _ = killpg(child, Signal::SIGKILL);
                    println!("{full}");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
            announce = if background {
                table.get(child).map(|job| job.announce())
            } else {
                None
            };
        }

        if background {
            // Announced before the read loop ever sees the next prompt,
            // however quickly the reaper gets to the job afterwards.
            if let Some(line) = announce {
                print!("{line}");
            }
        } else {
            self.wait_foreground(child).await;
        }
        Ok(())
    }

    /// The foreground gate: park until `pid` is no longer the foreground
    /// job (reaped, stopped, or moved to the background).
    ///
    /// The waiter is armed before the table is checked, so a reaper wake
    /// between the check and the await is never lost. No lock is held while
    /// parked; the reaper stays free to run.
    pub(crate) async fn wait_foreground(&self, pid: Pid) {
        loop {
            let mut notified = pin!(self.shared.fg_gate.notified());
            notified.as_mut().enable();
            {
                let table = self.shared.lock();
                let in_foreground =
                    matches!(table.get(pid), Some(job) if job.state == JobState::Foreground);
                if !in_foreground {
                    return;
                }
            }
            notified.await;
        }
    }
}
