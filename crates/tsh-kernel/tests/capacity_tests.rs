//! Capacity exhaustion: registration beyond the table limit is surfaced,
//! the extra child is not leaked untracked, and the shell keeps working.

use std::time::Duration;

use nix::sys::signal::{killpg, Signal};
use tsh_kernel::{Kernel, KernelConfig};

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
async fn full_table_rejects_without_breaking_the_shell() {
    let kernel = Kernel::new(KernelConfig::new().with_max_jobs(1)).unwrap();

    kernel.eval("/bin/sleep 30 &\n").await.unwrap();
    assert_eq!(kernel.jobs().len(), 1);

    // Over capacity: the command is refused, nothing silently dropped into
    // the table, and eval still returns cleanly.
    kernel.eval("/bin/sleep 30 &\n").await.unwrap();
    assert_eq!(kernel.jobs().len(), 1);

    // The shell continues operating afterwards.
    let pid = kernel.jobs()[0].pid;
    killpg(pid, Signal::SIGTERM).unwrap();
    wait_until(|| kernel.jobs().is_empty(), "reap after rejection").await;

    kernel.eval("/bin/sleep 30 &\n").await.unwrap();
    assert_eq!(kernel.jobs()[0].jid.0, 1);

    killpg(kernel.jobs()[0].pid, Signal::SIGTERM).unwrap();
    wait_until(|| kernel.jobs().is_empty(), "final reap").await;
}
