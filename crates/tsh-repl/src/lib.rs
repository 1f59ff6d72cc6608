//! tsh REPL — the read-eval loop around the job-control kernel.
//!
//! Two input paths share one evaluation path:
//! - stdin is a terminal: rustyline with history and the `tsh> ` prompt;
//! - stdin is a pipe (or `-p` was given): plain line reads, prompt printed
//!   by hand when enabled. This is the mode automated drivers run in.
//!
//! Evaluation happens on a multi-thread tokio runtime so the reaper and
//! relay tasks keep running while the main thread blocks on input or on a
//! foreground job.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::runtime::Runtime;

use tsh_kernel::{EvalOutcome, Kernel, KernelConfig};

const PROMPT: &str = "tsh> ";

/// The interactive shell: kernel plus runtime plus input configuration.
pub struct Repl {
    kernel: Kernel,
    runtime: Runtime,
    emit_prompt: bool,
}

impl Repl {
    /// Build the runtime and the kernel. The kernel's notification tasks
    /// need a live runtime, so it is constructed inside the runtime context.
    pub fn new(config: KernelConfig, emit_prompt: bool) -> Result<Self> {
        let runtime = Runtime::new().context("failed to create tokio runtime")?;
        let kernel = {
            let _guard = runtime.enter();
            Kernel::new(config).context("failed to start job-control kernel")?
        };
        Ok(Self {
            kernel,
            runtime,
            emit_prompt,
        })
    }

    /// Run the read-eval loop until EOF or `quit`. Returns the process exit
    /// code (0 for both).
    pub fn run(&mut self) -> Result<u8> {
        if self.emit_prompt && io::stdin().is_terminal() {
            self.run_interactive()
        } else {
            self.run_plain()
        }
    }

    fn run_interactive(&mut self) -> Result<u8> {
        let mut editor: Editor<(), DefaultHistory> =
            Editor::new().context("failed to initialize line editor")?;
        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if self.eval(&line)? == EvalOutcome::Quit {
                        return Ok(0);
                    }
                }
                // Ctrl-C at the prompt: there is no foreground job to
                // forward to, just show a fresh prompt.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(0),
                Err(e) => return Err(e).context("failed to read input"),
            }
        }
    }

    fn run_plain(&mut self) -> Result<u8> {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            if self.emit_prompt {
                print!("{PROMPT}");
                io::stdout().flush().context("failed to flush stdout")?;
            }
            line.clear();
            let n = stdin
                .lock()
                .read_line(&mut line)
                .context("failed to read stdin")?;
            if n == 0 {
                return Ok(0);
            }
            if self.eval(&line)? == EvalOutcome::Quit {
                return Ok(0);
            }
        }
    }

    fn eval(&self, line: &str) -> Result<EvalOutcome> {
        let outcome = self
            .runtime
            .block_on(self.kernel.eval(line))
            .context("shell cannot continue")?;
        // Push announcements out before the next prompt.
        let _ = io::stdout().flush();
        Ok(outcome)
    }
}
