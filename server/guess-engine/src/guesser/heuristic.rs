//! Built-in rule-based guesser.
//!
//! Score-based: release noise is stripped, episode markers are matched in a
//! fixed order (SxxEyy, Exx-yy ranges, NxMM, Exx), and the remaining text
//! becomes the title. Output keys follow guessit's naming so callers can
//! treat both backends the same.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{json, Value};

use super::Guesser;
use crate::error::GuessError;
use crate::types::{GuessOptions, GuessResult};

static YEAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(19\d{2}|20\d{2}|21\d{2})").unwrap());
static YEAR_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(19|20|21)\d{2}").unwrap());
static SXXEXX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bS(\d{1,2})E(\d{1,3})\b").unwrap());
static SXXEXX_ALL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\bS(\d{1,2})E(\d{2,3})(?:E(\d{2,3}))*\b").unwrap());
static E_NUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)E(\d{2,3})").unwrap());
static XXYY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})x(\d{2,3})\b").unwrap());
static EP_RANGE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\bE(\d{1,3})-(\d{1,3})\b").unwrap());
static E_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bE(\d{1,3})\b").unwrap());
static EPISODE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bEpisode\b").unwrap());
static SMALL_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,3})\b").unwrap());
static SPECIAL_HINT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\b(OVA|OAD|SP|Special)\b").unwrap());
static SEASON_ZERO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Season[\s._-]*0\b").unwrap());
static SEASON_DIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^season\b").unwrap());

static SCREEN_SIZE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\b(480p|720p|1080p|2160p|4k)\b").unwrap());
static VIDEO_CODEC: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\b(x\.?264|x\.?265|h\.?264|h\.?265|hevc|avc)\b").unwrap());
static SOURCE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b(BluRay|Blu-ray|BDRip|BRRip|WEB[-_.]?DL|WEB[-_.]?Rip|WEB|HDTV|HDRip|DVDRip)\b")
    .unwrap()
});

static BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]+\]|\{[^}]+\}").unwrap());
static PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
static NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  [
    r"(?i)\b(480p|720p|1080p|2160p|4k)\b",
    r"(?i)\b(x\.?264|x\.?265|h\.?264|h\.?265|hevc|avc|aac2?\.?0?|aac|ac3)\b",
    r"(?i)\b(BluRay|Blu-ray|BDRip|WEB[-_.]?DL|WEB[-_.]?Rip|WEB|HDTV|DVDRip|HDRip|BRRip|CAM|SCR|TC|TS)\b",
    r"(?i)\b(UNCENSORED|UNCUT|DUAL|VIDEO|AUDIO|ENG|JPN|JP|OV|SUB|SUBBED|DUBBED|ISO)\b",
    r"[-_.]+",
  ]
  .iter()
  .map(|p| Regex::new(p).unwrap())
  .collect()
});
static DOT_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[._]+").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Rule-based guesser with no external dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicGuesser;

impl HeuristicGuesser {
  pub fn new() -> Self {
    Self
  }
}

impl Guesser for HeuristicGuesser {
  fn name(&self) -> &str {
    "heuristic"
  }

  fn check_available(&self) -> Result<(), GuessError> {
    Ok(())
  }

  fn guess(&self, path: &str, options: &GuessOptions) -> Result<GuessResult, GuessError> {
    if path.trim().is_empty() {
      return Err(GuessError::EmptyPath);
    }
    Ok(infer(path, options).into_map())
  }
}

// ---------------------------------------------------------------------------
// Path splitting
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
struct PathParts<'a> {
  base: &'a str,
  container: Option<&'a str>,
  parent: &'a str,
  grand: &'a str,
}

/// Split on both `/` and `\` so Windows paths from the caller work on any host.
fn split_path(full: &str) -> PathParts<'_> {
  let mut parts = full.rsplit(['/', '\\']).filter(|p| !p.is_empty());
  let name = parts.next().unwrap_or_default();
  let parent = parts.next().unwrap_or_default();
  let grand = parts.next().unwrap_or_default();

  let (base, container) = match name.rfind('.') {
    Some(i) if i > 0 && looks_like_extension(&name[i + 1..]) => (&name[..i], Some(&name[i + 1..])),
    _ => (name, None),
  };
  PathParts {
    base,
    container,
    parent,
    grand,
  }
}

fn looks_like_extension(ext: &str) -> bool {
  (2..=4).contains(&ext.len())
    && ext.chars().all(|c| c.is_ascii_alphanumeric())
    && ext.starts_with(|c: char| c.is_ascii_alphabetic())
    && !E_ONLY.is_match(ext)
}

// ---------------------------------------------------------------------------
// Noise handling
// ---------------------------------------------------------------------------

fn strip_noise(s: &str) -> String {
  if s.is_empty() {
    return String::new();
  }
  let mut out = BRACKETS.replace_all(s, " ").into_owned();
  // Parenthesized groups go, unless they hold a year.
  out = PARENS
    .replace_all(&out, |caps: &Captures| {
      if YEAR_START.is_match(&caps[1]) {
        caps[0].to_string()
      } else {
        " ".to_string()
      }
    })
    .into_owned();
  for re in NOISE.iter() {
    out = re.replace_all(&out, " ").into_owned();
  }
  SPACES.replace_all(&out, " ").trim().to_string()
}

fn normalize_separators(s: &str) -> String {
  let out = DOT_UNDERSCORE.replace_all(s, " ");
  SPACES.replace_all(&out, " ").trim().to_string()
}

fn clean(s: &str) -> String {
  normalize_separators(&strip_noise(s))
}

// ---------------------------------------------------------------------------
// Title
// ---------------------------------------------------------------------------

fn pick_title(base: &str, parent: &str, grand: &str) -> String {
  let cleaned = clean(base);
  let markers: [&Regex; 5] = [&*SXXEXX, &*XXYY, &*EPISODE_WORD, &*EP_RANGE, &*E_ONLY];
  let first_marker = markers
    .iter()
    .filter_map(|re| re.find(&cleaned).map(|m| m.start()))
    .min();
  if let Some(idx) = first_marker {
    let cand = cleaned[..idx].trim();
    if cand.chars().count() >= 2 {
      return cand.to_string();
    }
  }
  if cleaned.chars().count() >= 3 {
    return cleaned;
  }

  let p = clean(parent);
  let digits = p.chars().filter(|c| c.is_ascii_digit()).count();
  if p.chars().count() >= 3 && !SEASON_DIR.is_match(&p) && digits < 6 {
    return p;
  }
  let g = clean(grand);
  if g.chars().count() >= 3 {
    return g;
  }
  String::new()
}

/// "Some Movie 2019" / "Some Movie (2019)" -> "Some Movie".
fn strip_trailing_year(title: &str, year: u32) -> &str {
  let y = year.to_string();
  let rest = title
    .strip_suffix(&format!("({})", y))
    .or_else(|| title.strip_suffix(y.as_str()))
    .map(str::trim_end);
  match rest {
    Some(r) if !r.is_empty() => r,
    _ => title,
  }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct Inferred {
  kind: &'static str,
  title: String,
  year: Option<u32>,
  season: Option<u32>,
  episodes: Vec<u32>,
  episode_title: Option<String>,
  absolute: Option<u32>,
  special: bool,
  screen_size: Option<String>,
  source: Option<&'static str>,
  video_codec: Option<&'static str>,
  container: Option<String>,
  confidence: u8,
}

fn num(caps: &Captures, i: usize) -> Option<u32> {
  caps.get(i).and_then(|m| m.as_str().parse().ok())
}

fn infer(full: &str, options: &GuessOptions) -> Inferred {
  let parts = split_path(full.trim());
  let base = parts.base;
  let parent_stripped = strip_noise(parts.parent);
  let base_stripped = strip_noise(base);

  let year = YEAR
    .find(&parent_stripped)
    .or_else(|| YEAR.find(&base_stripped))
    .and_then(|m| m.as_str().parse().ok());

  let mut season: Option<u32> = None;
  let mut episodes: Option<Vec<u32>> = None;

  // SxxEyy, possibly chained (S01E01E02) and repeated.
  let mut eps = Vec::new();
  for (i, caps) in SXXEXX_ALL.captures_iter(base).enumerate() {
    if i == 0 {
      season = num(&caps, 1);
    }
    eps.extend(
      E_NUM
        .captures_iter(&caps[0])
        .filter_map(|c| num(&c, 1)),
    );
  }
  if !eps.is_empty() {
    episodes = Some(eps);
  }

  // E01-03
  if let Some(caps) = EP_RANGE.captures(base) {
    if let (Some(start), Some(end)) = (num(&caps, 1), num(&caps, 2)) {
      if end >= start {
        episodes.get_or_insert_with(Vec::new).extend(start..=end);
      }
    }
  }

  // 1x05
  if let Some(caps) = XXYY.captures(base) {
    season = season.or(num(&caps, 1));
    if episodes.is_none() {
      episodes = num(&caps, 2).map(|e| vec![e]);
    }
  }

  // S01E5
  if let Some(caps) = SXXEXX.captures(base) {
    season = season.or(num(&caps, 1));
    if episodes.is_none() {
      episodes = num(&caps, 2).map(|e| vec![e]);
    }
  }

  if episodes.is_none() {
    if let Some(caps) = E_ONLY.captures(base) {
      episodes = num(&caps, 1).map(|e| vec![e]);
    }
  }

  let mut episodes = episodes.unwrap_or_default();
  if options.single_episode {
    episodes.truncate(1);
  }

  // Bare numbers count as an absolute episode only when nothing explicit matched.
  let small: Vec<u32> = SMALL_NUMBER
    .captures_iter(base)
    .filter_map(|c| num(&c, 1))
    .filter(|n| (1..1000).contains(n))
    .collect();
  let absolute = if episodes.is_empty() {
    small.last().copied()
  } else {
    None
  };

  let special = SPECIAL_HINT.is_match(base) || SEASON_ZERO.is_match(parts.parent);
  if special {
    season = Some(0);
  }

  let has_episode = !episodes.is_empty() || absolute.is_some() || special;
  let kind = if has_episode || SEASON_DIR.is_match(&parent_stripped) {
    "episode"
  } else {
    "movie"
  };

  let raw_title = pick_title(base, parts.parent, parts.grand);
  let title = match year {
    Some(y) => strip_trailing_year(&raw_title, y).to_string(),
    None => raw_title,
  };
  let title = if title.is_empty() {
    clean(parts.parent)
  } else {
    title
  };

  let episode_title = if has_episode {
    episode_title(base)
  } else {
    None
  };

  let mut confidence: i32 = 10;
  if kind == "episode" {
    confidence += 30;
  }
  if !episodes.is_empty() {
    confidence += 30;
  }
  if season.is_some() {
    confidence += 10;
  }
  if absolute.is_some() {
    confidence += 8;
  }
  if special {
    confidence += 5;
  }
  if year.is_some() {
    confidence += 5;
  }
  if title.chars().count() >= 2 {
    confidence += 8;
  } else {
    confidence -= 5;
  }

  Inferred {
    kind,
    title,
    year,
    season,
    episodes,
    episode_title,
    absolute,
    special,
    screen_size: SCREEN_SIZE.find(base).map(|m| screen_size(m.as_str())),
    source: SOURCE.find(base).map(|m| source(m.as_str())),
    video_codec: VIDEO_CODEC.find(base).map(|m| video_codec(m.as_str())),
    container: parts.container.map(str::to_ascii_lowercase),
    confidence: confidence.clamp(0, 100) as u8,
  }
}

/// Text after the episode marker, e.g. "Show.S02E05.The.Title.1080p" -> "The Title".
fn episode_title(base: &str) -> Option<String> {
  let end = [&*SXXEXX_ALL, &*EP_RANGE, &*XXYY, &*SXXEXX, &*E_ONLY, &*EPISODE_WORD]
    .iter()
    .find_map(|re| re.find(base))
    .map(|m| m.end())?;
  let after = clean(&base[end..]);
  let trimmed = after
    .trim_start_matches(|c: char| c == '-' || c == ':' || c.is_whitespace())
    .trim_end_matches(|c: char| matches!(c, '-' | '_' | '.' | ':' | ';') || c.is_whitespace());
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

fn screen_size(tag: &str) -> String {
  let lower = tag.to_ascii_lowercase();
  if lower == "4k" {
    "2160p".to_string()
  } else {
    lower
  }
}

fn source(tag: &str) -> &'static str {
  let lower = tag.to_ascii_lowercase();
  if lower.starts_with("web") {
    "Web"
  } else if lower == "hdtv" || lower == "hdrip" {
    "HDTV"
  } else if lower == "dvdrip" {
    "DVD"
  } else {
    "Blu-ray"
  }
}

fn video_codec(tag: &str) -> &'static str {
  let lower = tag.to_ascii_lowercase().replace('.', "");
  if lower.ends_with("265") || lower == "hevc" {
    "H.265"
  } else {
    "H.264"
  }
}

impl Inferred {
  fn into_map(self) -> GuessResult {
    let mut out = GuessResult::new();
    out.insert("type".into(), json!(self.kind));
    if !self.title.is_empty() {
      out.insert("title".into(), json!(self.title));
    }
    if let Some(y) = self.year {
      out.insert("year".into(), json!(y));
    }
    if let Some(s) = self.season {
      out.insert("season".into(), json!(s));
    }
    match self.episodes.as_slice() {
      [] => {}
      [single] => {
        out.insert("episode".into(), json!(single));
      }
      many => {
        out.insert("episode".into(), json!(many));
      }
    }
    if let Some(t) = self.episode_title {
      out.insert("episode_title".into(), json!(t));
    }
    if let Some(a) = self.absolute {
      out.insert("absolute_episode".into(), json!(a));
    }
    if self.special {
      out.insert("episode_details".into(), json!("Special"));
    }
    if let Some(s) = self.screen_size {
      out.insert("screen_size".into(), json!(s));
    }
    if let Some(s) = self.source {
      out.insert("source".into(), json!(s));
    }
    if let Some(c) = self.video_codec {
      out.insert("video_codec".into(), json!(c));
    }
    if let Some(c) = self.container {
      out.insert("container".into(), json!(c));
    }
    out.insert("confidence".into(), Value::from(self.confidence));
    out
  }
}
