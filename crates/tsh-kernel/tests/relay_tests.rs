//! Interrupt relay: stop/terminate keystrokes delivered to the shell
//! process reach only the foreground job's process group, and the shell
//! itself survives and keeps evaluating.

use std::sync::Arc;
use std::time::Duration;

use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use tsh_kernel::{EvalOutcome, JobState, Kernel, KernelConfig};

async fn wait_until<F: Fn() -> bool>(pred: F, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !pred() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn relay_forwards_keyboard_signals_to_foreground_group_only() {
    let kernel = Arc::new(Kernel::new(KernelConfig::new()).unwrap());

    // SIGINT sent to the shell process itself: the relay forwards it to the
    // foreground group, the job dies, the gate releases, and this process
    // is still here to notice.
    let k = kernel.clone();
    let mut eval_task = tokio::spawn(async move { k.eval("/bin/sleep 5\n").await });
    wait_until(
        || kernel.foreground_pid().is_some(),
        "foreground registration",
    )
    .await;

    kill(Pid::this(), Signal::SIGINT).unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(5), &mut eval_task)
        .await
        .expect("forwarded SIGINT never released the gate")
        .unwrap()
        .unwrap();
    assert_eq!(outcome, EvalOutcome::Continue);
    assert!(kernel.jobs().is_empty(), "interrupted job must be removed");

    // SIGTSTP to the shell process: the job stops, stays tracked as
    // Stopped, and the read loop gets control back.
    let k = kernel.clone();
    let mut eval_task = tokio::spawn(async move { k.eval("/bin/sleep 30\n").await });
    wait_until(
        || kernel.foreground_pid().is_some(),
        "second foreground registration",
    )
    .await;
    let pid = kernel.foreground_pid().unwrap();

    kill(Pid::this(), Signal::SIGTSTP).unwrap();
    tokio::time::timeout(Duration::from_secs(5), &mut eval_task)
        .await
        .expect("forwarded SIGTSTP never released the gate")
        .unwrap()
        .unwrap();
    let jobs = kernel.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].pid, pid);
    assert_eq!(jobs[0].state, JobState::Stopped);

    // With no foreground job the relay is a no-op: another SIGINT neither
    // kills the shell nor touches the stopped job.
    kill(Pid::this(), Signal::SIGINT).unwrap();
    assert_eq!(kernel.eval("jobs\n").await.unwrap(), EvalOutcome::Continue);
    assert_eq!(kernel.jobs().len(), 1);
    assert_eq!(kernel.jobs()[0].state, JobState::Stopped);

    // SIGKILL, not SIGTERM: a stopped process sits on SIGTERM until continued.
    killpg(pid, Signal::SIGKILL).unwrap();
    wait_until(|| kernel.jobs().is_empty(), "final reap").await;
}
