//! The guessing capability the adapter delegates to.

mod command;
mod heuristic;

pub use command::CommandGuesser;
pub use heuristic::HeuristicGuesser;

use crate::config::{Backend, Config};
use crate::error::GuessError;
use crate::types::{GuessOptions, GuessResult};

/// Infers structured metadata (title, year, episode numbers, ...) from a path.
pub trait Guesser {
  /// Short backend name for logs.
  fn name(&self) -> &str;

  /// Probe whether the backend can answer requests at all. Called once at
  /// startup, before any input is read.
  fn check_available(&self) -> Result<(), GuessError>;

  fn guess(&self, path: &str, options: &GuessOptions) -> Result<GuessResult, GuessError>;
}

impl<G: Guesser + ?Sized> Guesser for Box<G> {
  fn name(&self) -> &str {
    (**self).name()
  }

  fn check_available(&self) -> Result<(), GuessError> {
    (**self).check_available()
  }

  fn guess(&self, path: &str, options: &GuessOptions) -> Result<GuessResult, GuessError> {
    (**self).guess(path, options)
  }
}

/// Build the guesser selected by `config`.
pub fn from_config(config: &Config) -> Box<dyn Guesser> {
  match config.backend {
    Backend::Guessit => Box::new(CommandGuesser::new(
      config.guessit_program.clone(),
      config.guessit_args.clone(),
    )),
    Backend::Heuristic => Box::new(HeuristicGuesser::new()),
  }
}
