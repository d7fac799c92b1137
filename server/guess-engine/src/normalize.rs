//! Normalize guesser output into a consistent `episodes` sequence.

use serde_json::Value;

use crate::types::GuessResult;

/// Apply the episode rules in place.
///
/// - a non-null scalar `episode` becomes `episodes: [episode]`; arrays and
///   objects are left alone
/// - a non-null `episode_number` becomes `episodes`, wrapped unless already an
///   array; this runs second, so it wins when both are present
pub fn normalize_episodes(result: &mut GuessResult) {
  if let Some(ep) = result.get("episode").filter(|v| is_scalar(v)) {
    let episodes = Value::Array(vec![ep.clone()]);
    result.insert("episodes".to_string(), episodes);
  }

  if let Some(num) = result.get("episode_number").filter(|v| !v.is_null()) {
    let episodes = as_sequence(num);
    result.insert("episodes".to_string(), episodes);
  }
}

fn is_scalar(v: &Value) -> bool {
  !v.is_null() && !v.is_array() && !v.is_object()
}

fn as_sequence(v: &Value) -> Value {
  match v {
    Value::Array(_) => v.clone(),
    other => Value::Array(vec![other.clone()]),
  }
}
