//! Guesser backed by the external `guessit` executable.

use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tracing::debug;

use super::Guesser;
use crate::error::GuessError;
use crate::types::{GuessOptions, GuessResult};

/// Runs `<program> [args..] --json [--single-value] -- <path>` once per request
/// and reads the JSON object it prints.
#[derive(Debug, Clone)]
pub struct CommandGuesser {
  program: String,
  args: Vec<String>,
}

impl CommandGuesser {
  pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      program: program.into(),
      args,
    }
  }

  fn command(&self, path: &str, options: &GuessOptions) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd.args(&self.args).arg("--json");
    if options.single_episode {
      cmd.arg("--single-value");
    }
    cmd
      .arg("--")
      .arg(path)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());
    cmd
  }

  fn run(&self, mut cmd: Command) -> Result<Output, GuessError> {
    let output = cmd.output().map_err(|source| GuessError::Spawn {
      program: self.program.clone(),
      source,
    })?;
    if !output.status.success() {
      return Err(GuessError::NonZeroExit {
        program: self.program.clone(),
        status: output.status,
        stderr: first_line(&String::from_utf8_lossy(&output.stderr)),
      });
    }
    Ok(output)
  }
}

impl Guesser for CommandGuesser {
  fn name(&self) -> &str {
    "guessit"
  }

  fn check_available(&self) -> Result<(), GuessError> {
    let mut cmd = Command::new(&self.program);
    cmd
      .arg("--version")
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());
    match self.run(cmd) {
      Ok(output) => {
        debug!(
          program = %self.program,
          version = %String::from_utf8_lossy(&output.stdout).trim(),
          "guessit available"
        );
        Ok(())
      }
      Err(e) => Err(GuessError::unavailable(self.name(), e.to_string())),
    }
  }

  fn guess(&self, path: &str, options: &GuessOptions) -> Result<GuessResult, GuessError> {
    if path.trim().is_empty() {
      return Err(GuessError::EmptyPath);
    }
    let output = self.run(self.command(path, options))?;
    let stdout = String::from_utf8(output.stdout)?;
    parse_output(&stdout)
  }
}

fn parse_output(stdout: &str) -> Result<GuessResult, GuessError> {
  match serde_json::from_str::<Value>(stdout.trim()) {
    Ok(Value::Object(map)) => Ok(map),
    Ok(other) => Err(GuessError::InvalidOutput(format!(
      "expected an object, got {}",
      kind_of(&other)
    ))),
    Err(e) => Err(GuessError::InvalidOutput(e.to_string())),
  }
}

fn kind_of(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Error text travels in a single-line JSON field; keep the first non-empty line.
fn first_line(s: &str) -> String {
  s.lines()
    .map(str::trim)
    .find(|l| !l.is_empty())
    .unwrap_or_default()
    .to_string()
}
