//! Command-line control of per-application audio session volumes.

use std::{io, process::ExitCode};

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod control;
mod error;
mod session;
#[cfg(windows)]
mod wasapi;

use cli::Cli;

fn main() -> ExitCode {
    // clap exits with 2 on usage errors by default; every failure of
    // this tool exits 1, so parse errors are rendered by hand.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                // --help / --version
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> error::Result<()> {
    let mut backend = backend::system_backend()?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    cli::run(&cli.command, backend.as_mut(), &mut input, &mut out)
}
