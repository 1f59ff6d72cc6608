//! Built-in dispatch that spawns no children: `quit`, blank lines, and the
//! `bg`/`fg` argument error paths.

use tsh_kernel::{EvalOutcome, Kernel, KernelConfig};

#[tokio::test(flavor = "multi_thread")]
async fn quit_and_blank_lines() {
    let kernel = Kernel::new(KernelConfig::new()).unwrap();

    assert_eq!(kernel.eval("\n").await.unwrap(), EvalOutcome::Continue);
    assert_eq!(kernel.eval("   \n").await.unwrap(), EvalOutcome::Continue);
    assert_eq!(kernel.eval("jobs\n").await.unwrap(), EvalOutcome::Continue);
    assert_eq!(kernel.eval("quit\n").await.unwrap(), EvalOutcome::Quit);
}

#[tokio::test(flavor = "multi_thread")]
async fn bgfg_argument_errors_leave_table_unchanged() {
    let kernel = Kernel::new(KernelConfig::new()).unwrap();

    // Missing argument, no such pid, no such jid, malformed arguments:
    // each prints one line and returns to the read loop.
    for line in [
        "bg\n",
        "fg\n",
        "bg 999999\n",
        "fg %999\n",
        "bg nonsense\n",
        "bg 12x\n",
        "fg %x\n",
    ] {
        assert_eq!(
            kernel.eval(line).await.unwrap(),
            EvalOutcome::Continue,
            "line {line:?} must not be fatal"
        );
    }
    assert!(kernel.jobs().is_empty());
}
