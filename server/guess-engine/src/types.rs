//! Core types for the guess engine (JSON contracts + guesser options).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Error codes (stable, machine-readable)
// ---------------------------------------------------------------------------

pub const DEPENDENCY_NOT_INSTALLED: &str = "dependency_not_installed";
pub const INVALID_INPUT: &str = "invalid_input";
pub const MISSING_PATH: &str = "missing_path";

/// Guessed metadata: field name -> value, in the order the guesser produced them.
pub type GuessResult = Map<String, Value>;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the caller sends)
// ---------------------------------------------------------------------------

/// One request line from stdin. Unknown fields are silently ignored.
///
/// `id` is opaque and echoed back untouched: a missing id stays `None`, an
/// explicit `null` is `Some(Value::Null)` and is echoed as `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundRequest {
  #[serde(default, deserialize_with = "present")]
  pub id: Option<Value>,
  #[serde(default)]
  pub path: Option<Value>,
  #[serde(default)]
  pub filename: Option<Value>,
}

impl InboundRequest {
  /// The path to guess from: `path` first, then `filename`.
  ///
  /// A field only counts when it is a non-empty string.
  pub fn resolved_path(&self) -> Option<&str> {
    usable(self.path.as_ref()).or_else(|| usable(self.filename.as_ref()))
  }
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
  Value::deserialize(d).map(Some)
}

fn usable(v: Option<&Value>) -> Option<&str> {
  match v {
    Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
    _ => None,
  }
}

// ---------------------------------------------------------------------------
// Guesser options
// ---------------------------------------------------------------------------

/// Options handed to the guesser with every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessOptions {
  /// Keep only the first episode of a multi-episode file. The adapter always
  /// sends `false`.
  pub single_episode: bool,
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// One response line. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<GuessResult>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub raw: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detail: Option<String>,
}

impl Response {
  pub fn result(id: Option<Value>, result: GuessResult) -> Self {
    Self {
      id,
      result: Some(result),
      error: None,
      raw: None,
      detail: None,
    }
  }

  pub fn error(id: Option<Value>, error: impl Into<String>) -> Self {
    Self {
      id,
      result: None,
      error: Some(error.into()),
      raw: None,
      detail: None,
    }
  }

  pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
    self.raw = Some(raw.into());
    self
  }

  pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = Some(detail.into());
    self
  }

  pub fn is_error(&self) -> bool {
    self.error.is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn request(v: Value) -> InboundRequest {
    serde_json::from_value(v).unwrap()
  }

  #[test]
  fn path_is_preferred_over_filename() {
    let req = request(json!({"path": "a.mkv", "filename": "b.mkv"}));
    assert_eq!(req.resolved_path(), Some("a.mkv"));
  }

  #[test]
  fn filename_used_when_path_null_or_empty() {
    let req = request(json!({"path": null, "filename": "b.mkv"}));
    assert_eq!(req.resolved_path(), Some("b.mkv"));
    let req = request(json!({"path": "", "filename": "b.mkv"}));
    assert_eq!(req.resolved_path(), Some("b.mkv"));
  }

  #[test]
  fn non_string_path_is_not_usable() {
    let req = request(json!({"id": 1, "path": 42}));
    assert_eq!(req.resolved_path(), None);
  }

  #[test]
  fn null_id_is_kept() {
    let req = request(json!({"id": null, "path": "a.mkv"}));
    assert_eq!(req.id, Some(Value::Null));
    let req = request(json!({"path": "a.mkv"}));
    assert_eq!(req.id, None);
  }

  #[test]
  fn null_id_serializes_as_null() {
    let out = serde_json::to_string(&Response::error(Some(Value::Null), MISSING_PATH)).unwrap();
    assert_eq!(out, r#"{"id":null,"error":"missing_path"}"#);
  }

  #[test]
  fn error_response_omits_unset_fields() {
    let out = serde_json::to_string(&Response::error(Some(json!("x1")), MISSING_PATH)).unwrap();
    assert_eq!(out, r#"{"id":"x1","error":"missing_path"}"#);

    let out = serde_json::to_string(
      &Response::error(None, INVALID_INPUT)
        .with_raw("{oops")
        .with_detail("key must be a string"),
    )
    .unwrap();
    assert_eq!(
      out,
      r#"{"error":"invalid_input","raw":"{oops","detail":"key must be a string"}"#
    );
  }
}
