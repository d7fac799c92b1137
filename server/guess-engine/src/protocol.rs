//! Line protocol adapter: one JSON request per input line, one JSON response
//! per output line.

use std::io::{BufRead, Write};

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::EngineError;
use crate::guesser::Guesser;
use crate::normalize::normalize_episodes;
use crate::types::*;

/// Counters reported when the input stream closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
  pub lines: u64,
  pub skipped: u64,
  pub results: u64,
  pub errors: u64,
}

/// Turns request lines into responses using a [`Guesser`].
pub struct Adapter<G> {
  guesser: G,
  options: GuessOptions,
}

impl<G: Guesser> Adapter<G> {
  /// Multi-episode parsing is always on (`single_episode = false`).
  pub fn new(guesser: G) -> Self {
    Self {
      guesser,
      options: GuessOptions::default(),
    }
  }

  pub fn guesser(&self) -> &G {
    &self.guesser
  }

  /// Startup dependency check.
  ///
  /// Returns `Ok(false)` after writing the single `dependency_not_installed`
  /// line when the guesser cannot be used; the caller must then exit non-zero
  /// without reading input.
  pub fn check_dependency<W: Write>(&self, out: &mut W) -> Result<bool, EngineError> {
    match self.guesser.check_available() {
      Ok(()) => Ok(true),
      Err(e) => {
        error!(backend = self.guesser.name(), error = %e, "guesser unavailable");
        write_response(out, &Response::error(None, DEPENDENCY_NOT_INSTALLED))?;
        Ok(false)
      }
    }
  }

  /// Handle one input line. `None` means the line is blank and gets no reply.
  pub fn process_line(&self, line: &str) -> Option<Response> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
      return None;
    }

    let req = match parse_request(trimmed) {
      Ok(req) => req,
      Err(detail) => {
        debug!(%detail, "invalid request line");
        return Some(
          Response::error(None, INVALID_INPUT)
            .with_raw(trimmed)
            .with_detail(detail),
        );
      }
    };

    let path = match req.resolved_path() {
      Some(p) => p,
      None => return Some(Response::error(req.id, MISSING_PATH)),
    };

    match self.guesser.guess(path, &self.options) {
      Ok(mut result) => {
        normalize_episodes(&mut result);
        Some(Response::result(req.id, result))
      }
      Err(e) => {
        warn!(backend = self.guesser.name(), path, error = %e, "guess failed");
        Some(Response::error(req.id, e.to_string()))
      }
    }
  }

  /// Read until end of input, answering each non-blank line in order.
  ///
  /// Every response is flushed as soon as it is written.
  pub fn run<R: BufRead, W: Write>(&self, input: R, mut out: W) -> Result<RunStats, EngineError> {
    let mut stats = RunStats::default();
    for line in input.lines() {
      let line = line?;
      stats.lines += 1;
      match self.process_line(&line) {
        Some(resp) => {
          if resp.is_error() {
            stats.errors += 1;
          } else {
            stats.results += 1;
          }
          write_response(&mut out, &resp)?;
        }
        None => stats.skipped += 1,
      }
    }
    Ok(stats)
  }
}

fn parse_request(line: &str) -> Result<InboundRequest, String> {
  match serde_json::from_str::<Value>(line) {
    Ok(obj @ Value::Object(_)) => serde_json::from_value(obj).map_err(|e| e.to_string()),
    Ok(_) => Err("expected a JSON object".to_string()),
    Err(e) => Err(e.to_string()),
  }
}

/// Write one compact JSON line and flush.
pub fn write_response<W: Write>(out: &mut W, resp: &Response) -> Result<(), EngineError> {
  serde_json::to_writer(&mut *out, resp)?;
  out.write_all(b"\n")?;
  out.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::GuessError;
  use serde_json::json;

  /// Echoes the path back as the title, or fails for paths containing "boom".
  struct Echo;

  impl Guesser for Echo {
    fn name(&self) -> &str {
      "echo"
    }

    fn check_available(&self) -> Result<(), GuessError> {
      Ok(())
    }

    fn guess(&self, path: &str, options: &GuessOptions) -> Result<GuessResult, GuessError> {
      assert!(!options.single_episode);
      if path.contains("boom") {
        return Err(GuessError::InvalidOutput("boom".into()));
      }
      let mut map = GuessResult::new();
      map.insert("title".into(), json!(path));
      map.insert("episode".into(), json!(3));
      Ok(map)
    }
  }

  struct Missing;

  impl Guesser for Missing {
    fn name(&self) -> &str {
      "missing"
    }

    fn check_available(&self) -> Result<(), GuessError> {
      Err(GuessError::unavailable("missing", "not installed"))
    }

    fn guess(&self, _: &str, _: &GuessOptions) -> Result<GuessResult, GuessError> {
      unreachable!("never called when unavailable")
    }
  }

  #[test]
  fn blank_lines_are_skipped() {
    let a = Adapter::new(Echo);
    assert!(a.process_line("").is_none());
    assert!(a.process_line("   \t ").is_none());
  }

  #[test]
  fn result_carries_id_and_normalized_episodes() {
    let a = Adapter::new(Echo);
    let resp = a.process_line(r#"{"id":"abc","path":"x.mkv"}"#).unwrap();
    assert_eq!(resp.id, Some(json!("abc")));
    let result = resp.result.unwrap();
    assert_eq!(result["title"], "x.mkv");
    assert_eq!(result["episodes"], json!([3]));
  }

  #[test]
  fn invalid_json_reports_raw_and_detail() {
    let a = Adapter::new(Echo);
    let resp = a.process_line("  {not json  ").unwrap();
    assert_eq!(resp.id, None);
    assert_eq!(resp.error.as_deref(), Some(INVALID_INPUT));
    assert_eq!(resp.raw.as_deref(), Some("{not json"));
    assert!(resp.detail.is_some());
  }

  #[test]
  fn non_object_json_is_invalid_input() {
    let a = Adapter::new(Echo);
    let resp = a.process_line(r#"["x.mkv"]"#).unwrap();
    assert_eq!(resp.error.as_deref(), Some(INVALID_INPUT));
    assert_eq!(resp.detail.as_deref(), Some("expected a JSON object"));
  }

  #[test]
  fn missing_path_keeps_id() {
    let a = Adapter::new(Echo);
    let resp = a.process_line(r#"{"id":7}"#).unwrap();
    assert_eq!(resp.id, Some(json!(7)));
    assert_eq!(resp.error.as_deref(), Some(MISSING_PATH));
  }

  #[test]
  fn guesser_error_is_stringified() {
    let a = Adapter::new(Echo);
    let resp = a.process_line(r#"{"id":"e","filename":"boom.mkv"}"#).unwrap();
    assert_eq!(resp.id, Some(json!("e")));
    assert_eq!(
      resp.error.as_deref(),
      Some("guesser output was not a JSON object: boom")
    );
  }

  #[test]
  fn unavailable_guesser_writes_one_line() {
    let a = Adapter::new(Missing);
    let mut out = Vec::new();
    assert!(!a.check_dependency(&mut out).unwrap());
    assert_eq!(
      String::from_utf8(out).unwrap(),
      "{\"error\":\"dependency_not_installed\"}\n"
    );
  }

  /// Buffers writes and records how many bytes were pending at each flush.
  #[derive(Default)]
  struct FlushLog {
    pending: Vec<u8>,
    written: Vec<u8>,
    flushes: Vec<usize>,
  }

  impl Write for FlushLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.pending.extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
      self.flushes.push(self.pending.len());
      self.written.append(&mut self.pending);
      Ok(())
    }
  }

  #[test]
  fn run_flushes_once_per_emitted_line() {
    let a = Adapter::new(Echo);
    let input = "\n{\"id\":1,\"path\":\"a.mkv\"}\n   \nnope\n\n{\"id\":2}\n\n";
    let mut log = FlushLog::default();
    a.run(input.as_bytes(), &mut log).unwrap();

    assert!(log.pending.is_empty());
    let text = String::from_utf8(log.written.clone()).unwrap();
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    assert_eq!(lines.len(), 3);
    let sizes: Vec<usize> = lines.iter().map(|l| l.len()).collect();
    assert_eq!(log.flushes, sizes);
  }

  #[test]
  fn blank_input_never_flushes() {
    let a = Adapter::new(Echo);
    let mut log = FlushLog::default();
    a.run("\n \n\t\n".as_bytes(), &mut log).unwrap();
    assert!(log.flushes.is_empty());
    assert!(log.written.is_empty());
  }

  #[test]
  fn run_counts_lines() {
    let a = Adapter::new(Echo);
    let input = "{\"path\":\"a.mkv\"}\n\nnope\n{\"id\":1}\n";
    let mut out = Vec::new();
    let stats = a.run(input.as_bytes(), &mut out).unwrap();
    assert_eq!(
      stats,
      RunStats {
        lines: 4,
        skipped: 1,
        results: 1,
        errors: 2,
      }
    );
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
  }
}
