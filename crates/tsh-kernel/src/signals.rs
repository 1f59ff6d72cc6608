//! Signal notification tasks — the closed set of asynchronous handlers.
//!
//! Four process-wide signals drive job control, each consumed by one task
//! spawned at kernel construction:
//!
//! - **SIGCHLD** → the reaper: drain all pending child state changes, print
//!   their status lines, wake the foreground gate.
//! - **SIGINT / SIGTSTP** → the interrupt relay: forward the keystroke to
//!   the current foreground job's process group, never to the shell itself.
//!   The relay does not touch job state; run-state changes are recorded by
//!   the reaper once the kernel reports them.
//! - **SIGQUIT** → clean shutdown escape hatch.
//!
//! `tokio::signal` streams coalesce repeated deliveries, which matches the
//! no-queueing semantics the reaper's drain loop is written for.

use std::sync::Arc;

use nix::sys::signal::{killpg, Signal};
use tokio::signal::unix::{signal, SignalKind};

use crate::error::KernelError;
use crate::kernel::Shared;
use crate::reaper;

/// Install the notification tasks against the shared table.
///
/// Must be called from within a tokio runtime.
pub(crate) fn install(shared: Arc<Shared>) -> Result<(), KernelError> {
    let mut sigchld = signal(SignalKind::child())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigtstp = signal(SignalKind::from_raw(nix::libc::SIGTSTP))?;
    let mut sigquit = signal(SignalKind::quit())?;

    let reap_shared = shared.clone();
    tokio::spawn(async move {
        while sigchld.recv().await.is_some() {
            for event in reaper::drain(&reap_shared) {
                println!("{event}");
            }
            // Wake the dispatcher even when nothing printed: a silent normal
            // exit still releases the foreground gate.
            reap_shared.fg_gate.notify_waiters();
        }
    });

    let int_shared = shared.clone();
    tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            relay(&int_shared, Signal::SIGINT);
        }
    });

    let tstp_shared = shared;
    tokio::spawn(async move {
        while sigtstp.recv().await.is_some() {
            relay(&tstp_shared, Signal::SIGTSTP);
        }
    });

    tokio::spawn(async move {
        if sigquit.recv().await.is_some() {
            println!("Terminating after receipt of SIGQUIT signal");
            std::process::exit(1);
        }
    });

    Ok(())
}

/// Forward `sig` to the foreground job's entire process group, if there is
/// a foreground job. Negative-pid addressing: each job's pgid is its pid.
fn relay(shared: &Shared, sig: Signal) {
    let fg = shared.lock().foreground_pid();
    if let Some(pid) = fg {
        tracing::debug!(%pid, ?sig, "relaying to foreground process group");
        if let Err(e) = killpg(pid, sig) {
            tracing::warn!(%pid, ?sig, "failed to signal foreground group: {e}");
        }
    }
}
