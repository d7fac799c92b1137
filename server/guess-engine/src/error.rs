//! Structured error types for the guess engine.

use std::process::ExitStatus;

use thiserror::Error;

/// Failures raised by a guesser backend.
///
/// The `Display` text is what goes back to the caller in the `error` field,
/// so keep it short and free of newlines.
#[derive(Debug, Error)]
pub enum GuessError {
  #[error("{backend} is not available: {reason}")]
  Unavailable { backend: String, reason: String },

  #[error("failed to spawn `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("`{program}` exited with {status}: {stderr}")]
  NonZeroExit {
    program: String,
    status: ExitStatus,
    stderr: String,
  },

  #[error("guesser output was not valid UTF-8: {0}")]
  InvalidUtf8(#[from] std::string::FromUtf8Error),

  #[error("guesser output was not a JSON object: {0}")]
  InvalidOutput(String),

  #[error("path must not be empty")]
  EmptyPath,
}

impl GuessError {
  pub fn unavailable(backend: &str, reason: impl Into<String>) -> Self {
    Self::Unavailable {
      backend: backend.to_string(),
      reason: reason.into(),
    }
  }
}

/// Failures of the stdio loop itself. These end the process.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}
