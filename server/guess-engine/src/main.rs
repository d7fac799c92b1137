//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is a request `{id?, path | filename}`. Output lines are either:
//! - `{id, result}` with the normalized guess
//! - `{id, error}` (plus `raw`/`detail` for lines that are not JSON objects)
//!
//! Blank lines produce no output. If the guesser is unavailable at startup a
//! single `{"error":"dependency_not_installed"}` line is written and the
//! process exits with status 1 before reading stdin.

use clap::Parser;
use guess_engine::config::Args;
use guess_engine::{guesser, Adapter, Config};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
  init_logging();
  let config = Config::from(Args::parse());
  let adapter = Adapter::new(guesser::from_config(&config));
  info!(backend = adapter.guesser().name(), "guess-engine starting");

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  match adapter.check_dependency(&mut out) {
    Ok(true) => {}
    Ok(false) => return ExitCode::FAILURE,
    Err(e) => {
      error!(error = %e, "failed to report missing dependency");
      return ExitCode::FAILURE;
    }
  }

  let stdin = io::stdin();
  match adapter.run(stdin.lock(), &mut out) {
    Ok(stats) => {
      info!(
        lines = stats.lines,
        skipped = stats.skipped,
        results = stats.results,
        errors = stats.errors,
        "input closed"
      );
      match out.flush() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
          error!(error = %e, "failed to flush stdout");
          ExitCode::FAILURE
        }
      }
    }
    Err(e) => {
      error!(error = %e, "guess-engine stopped");
      if let Err(e) = out.flush() {
        error!(error = %e, "failed to flush stdout");
      }
      ExitCode::FAILURE
    }
  }
}

/// Logs go to stderr; stdout carries only protocol lines.
fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_ansi(false)
    .with_target(false)
    .init();
}
