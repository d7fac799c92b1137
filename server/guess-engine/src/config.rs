//! Engine configuration with sane defaults.

use clap::{Parser, ValueEnum};

/// Which guesser answers requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
  /// The external `guessit` executable.
  #[default]
  Guessit,
  /// Built-in rule-based parser. Always available.
  Heuristic,
}

/// Process-level settings, fixed for the lifetime of the shim.
#[derive(Debug, Clone)]
pub struct Config {
  pub backend: Backend,
  /// Program run by the guessit backend (looked up on PATH).
  pub guessit_program: String,
  /// Extra arguments passed to every guessit invocation.
  pub guessit_args: Vec<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      backend: Backend::default(),
      guessit_program: "guessit".to_string(),
      guessit_args: Vec::new(),
    }
  }
}

/// Command line for the `guess-engine` binary.
#[derive(Parser, Debug)]
#[command(author, version, about = "Guess media metadata from file paths over JSON lines on stdio")]
pub struct Args {
  /// Guesser backend
  #[arg(long, value_enum, env = "GUESS_ENGINE_BACKEND", default_value_t = Backend::Guessit)]
  pub backend: Backend,

  /// guessit executable
  #[arg(long = "guessit-bin", env = "GUESSIT_BIN", default_value = "guessit")]
  pub guessit_bin: String,

  /// Extra argument for guessit (repeatable)
  #[arg(long = "guessit-arg", allow_hyphen_values = true)]
  pub guessit_args: Vec<String>,
}

impl From<Args> for Config {
  fn from(args: Args) -> Self {
    Self {
      backend: args.backend,
      guessit_program: args.guessit_bin,
      guessit_args: args.guessit_args,
    }
  }
}
