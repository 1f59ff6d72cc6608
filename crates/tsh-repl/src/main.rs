//! tsh CLI entry point.
//!
//! Usage:
//!   tsh          # interactive shell
//!   tsh -v       # with diagnostic logging
//!   tsh -p       # no prompt (driver mode)

use std::io::{stderr, stdout};
use std::os::unix::io::AsRawFd;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tsh_kernel::KernelConfig;
use tsh_repl::Repl;

struct Options {
    verbose: bool,
    emit_prompt: bool,
}

fn main() -> ExitCode {
    let mut opts = Options {
        verbose: false,
        emit_prompt: true,
    };

    for arg in std::env::args().skip(1) {
        let Some(flags) = arg.strip_prefix('-') else {
            usage();
            return ExitCode::FAILURE;
        };
        for flag in flags.chars() {
            match flag {
                'h' => {
                    usage();
                    return ExitCode::FAILURE;
                }
                'v' => opts.verbose = true,
                'p' => opts.emit_prompt = false,
                _ => {
                    usage();
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    // Respects RUST_LOG; -v forces debug-level diagnostics.
    let filter = if opts.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    match run(opts) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("tsh: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: Options) -> Result<u8> {
    // Merge stderr into stdout so a driver reading one pipe sees all output.
    nix::unistd::dup2(stdout().as_raw_fd(), stderr().as_raw_fd())
        .context("failed to redirect stderr to stdout")?;

    let mut repl = Repl::new(KernelConfig::new(), opts.emit_prompt)?;
    repl.run()
}

fn usage() {
    println!("Usage: tsh [-hvp]");
    println!("   -h   print this message");
    println!("   -v   print additional diagnostic information");
    println!("   -p   do not emit a command prompt");
}
