// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for run timestamps, output paths, column letters, char-safe clipping, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; paths; clap CommandFactory
// outputs: Timestamped file names, prepared directories, spreadsheet column letters, man page text
// side_effects: prepare_out_dir creates directories
// invariants:
// - timestamped_file_name pattern is stable and locale-independent (%Y%m%d_%H%M%S)
// - clip_chars never splits UTF-8 and counts characters, not bytes
// - column_letter is bijective over 0-based indices (0 -> A, 25 -> Z, 26 -> AA)
// errors: IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use clap::CommandFactory;

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current local time is used.
pub fn effective_now(override_now: Option<DateTime<Local>>) -> DateTime<Local> {
  override_now.unwrap_or_else(Local::now)
}

/// Parse the hidden `--now-override` value (`%Y-%m-%dT%H:%M:%S`, local time).
pub fn parse_now(raw: Option<&str>) -> Result<Option<DateTime<Local>>> {
  let Some(s) = raw else { return Ok(None) };

  let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S")
    .with_context(|| format!("invalid --now-override {:?} (expected YYYY-MM-DDTHH:MM:SS)", s))?;

  let local = naive
    .and_local_timezone(Local)
    .earliest()
    .with_context(|| format!("--now-override {:?} does not exist in the local timezone", s))?;

  Ok(Some(local))
}

/// `<prefix><YYYYmmdd_HHMMSS>.<ext>`
pub fn timestamped_file_name(prefix: &str, ext: &str, now: DateTime<Local>) -> String {
  format!("{}{}.{}", prefix, now.format("%Y%m%d_%H%M%S"), ext)
}

/// Ensure the output directory exists and return it as a path.
pub fn prepare_out_dir(out_dir: &Path) -> Result<PathBuf> {
  std::fs::create_dir_all(out_dir).with_context(|| format!("creating output dir {}", out_dir.display()))?;

  Ok(out_dir.to_path_buf())
}

/// Spreadsheet column letter for a 0-based column index.
pub fn column_letter(index: usize) -> String {
  let mut n = index + 1;
  let mut letters = Vec::new();

  while n > 0 {
    let rem = (n - 1) % 26;
    letters.push((b'A' + rem as u8) as char);
    n = (n - 1) / 26;
  }

  letters.iter().rev().collect()
}

/// Clip to at most `max_chars` characters (not bytes).
pub fn clip_chars(text: &str, max_chars: usize) -> String {
  match text.char_indices().nth(max_chars) {
    Some((byte_idx, _)) => text[..byte_idx].to_string(),
    None => text.to_string(),
  }
}

/// Final non-empty path segment of a URL (`.../issues/42` -> `42`).
pub fn last_path_segment(url: &str) -> &str {
  url.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
