// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Flatten nested GitHub JSON (REST pulls/issues, GraphQL project items) into name-indexed FlatRecords
// role: transform/flatten
// inputs: serde_json::Value payloads as returned by the API
// outputs: FlatRecord per item; sanitized cell text; Status field extraction
// invariants:
// - List relations (labels, assignees, reviewers) are joined into one string; order preserved
// - Missing optional fields (milestone, author, status, body) become empty/Null, never errors
// - sanitize_for_excel is idempotent and never exceeds MAX_CELL_CHARS
// - extract_status returns the first entry whose field name is "Status"
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::ext::serde_json::{value_to_text, JsonFetch};
use crate::util::clip_chars;

/// Per-cell character limit of the xlsx format.
pub const MAX_CELL_CHARS: usize = 32_767;
pub const LINK_PLACEHOLDER: &str = "[LINK]";

/// Column names shared by the flattener, the sheet builders and the post-processor.
pub mod col {
  pub const NUMBER: &str = "Number";
  pub const TYPE: &str = "Type";
  pub const TITLE: &str = "Title";
  pub const BODY: &str = "Body";
  pub const REPORTER: &str = "Reporter (User)";
  pub const LABELS: &str = "Labels";
  pub const MILESTONE: &str = "Milestone";
  pub const STATE: &str = "State";
  pub const REVIEWERS: &str = "Reviewers";
  pub const COMMITTERS: &str = "Committers";
  pub const URL: &str = "URL";
  pub const CREATED_AT: &str = "Created At";
  pub const UPDATED_AT: &str = "Updated At";
  pub const AUTHOR: &str = "Author";
  pub const STATUS: &str = "Status";
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Null,
  Text(String),
  Int(i64),
}

impl FieldValue {
  pub fn as_text(&self) -> String {
    match self {
      FieldValue::Null => String::new(),
      FieldValue::Text(s) => s.clone(),
      FieldValue::Int(n) => n.to_string(),
    }
  }
}

impl From<Option<String>> for FieldValue {
  fn from(v: Option<String>) -> Self {
    v.map(FieldValue::Text).unwrap_or(FieldValue::Null)
  }
}

impl From<String> for FieldValue {
  fn from(v: String) -> Self {
    FieldValue::Text(v)
  }
}

impl From<&str> for FieldValue {
  fn from(v: &str) -> Self {
    FieldValue::Text(v.to_string())
  }
}

/// Tabular projection of one source item, keyed by column name in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatRecord {
  fields: Vec<(&'static str, FieldValue)>,
}

impl FlatRecord {
  pub fn with(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
    let value = value.into();

    match self.fields.iter_mut().find(|(n, _)| *n == name) {
      Some(slot) => slot.1 = value,
      None => self.fields.push((name, value)),
    }

    self
  }

  pub fn get(&self, name: &str) -> Option<&FieldValue> {
    self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
  }

  /// Display text of a column; absent or null columns read as empty.
  pub fn text(&self, name: &str) -> String {
    self.get(name).map(FieldValue::as_text).unwrap_or_default()
  }

  #[cfg(test)]
  pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.fields.iter().map(|(n, _)| *n)
  }
}

static RE_HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<]+?>").unwrap());
static RE_URL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"https?://(?:[!\x24-\x5Fa-z]|%[0-9a-fA-F]{2})+").unwrap());

/// Make free text safe for a single spreadsheet cell.
///
/// Whitespace is normalized first (CR dropped, LF/TAB to space) so that the
/// later passes cannot be re-triggered by a second call. Tag stripping runs to
/// a fixpoint because removing one tag can expose another (`<<a>b>`).
pub fn sanitize_for_excel(text: &str) -> String {
  if text.is_empty() {
    return String::new();
  }

  let mut out = text.replace('\r', "").replace(['\n', '\t'], " ");

  while RE_HTML_TAG.is_match(&out) {
    out = RE_HTML_TAG.replace_all(&out, " ").into_owned();
  }

  out = RE_URL.replace_all(&out, LINK_PLACEHOLDER).into_owned();

  clip_chars(&out, MAX_CELL_CHARS)
}

/// Coerce any JSON value to text (`null` -> empty) and sanitize it.
pub fn sanitize_value(v: &Value) -> String {
  sanitize_for_excel(&value_to_text(v))
}

/// First field value named "Status": its `text`, else its single-select `name`.
pub fn extract_status(field_values: &[Value]) -> Option<String> {
  for entry in field_values {
    let Some(field_name) = entry.fetch("field.name").to::<String>() else {
      continue;
    };

    if field_name != col::STATUS {
      continue;
    }

    if let Some(text) = entry.fetch("text").text() {
      return Some(text);
    }

    if let Some(name) = entry.fetch("name").text() {
      return Some(name);
    }
  }

  None
}

fn sanitized(v: &Value, path: &str) -> String {
  v.fetch(path).value().map(sanitize_value).unwrap_or_default()
}

fn rest_item_record(item: &Value, item_type: &str) -> FlatRecord {
  let number = item.fetch("number").to::<i64>().map(FieldValue::Int).unwrap_or(FieldValue::Null);

  FlatRecord::default()
    .with(col::NUMBER, number)
    .with(col::TYPE, item_type)
    .with(col::TITLE, sanitized(item, "title"))
    .with(col::BODY, sanitized(item, "body"))
    .with(col::REPORTER, item.fetch("assignees").join("login", ","))
    .with(col::LABELS, item.fetch("labels").join("name", ","))
    .with(col::MILESTONE, item.fetch("milestone.title").text().unwrap_or_default())
    .with(col::STATE, item.fetch("state").text().unwrap_or_default())
    .with(col::REVIEWERS, item.fetch("requested_reviewers").join("login", ","))
    .with(col::COMMITTERS, item.fetch("user.login").text().unwrap_or_default())
    .with(col::URL, item.fetch("html_url").text().unwrap_or_default())
}

/// REST `/pulls` entry.
pub fn flatten_pull_request(pr: &Value) -> FlatRecord {
  rest_item_record(pr, "Pull Request")
}

/// REST `/issues` entry; that endpoint also lists pull requests, which carry a `pull_request` key.
pub fn flatten_issue(issue: &Value) -> FlatRecord {
  let item_type = if issue.fetch("pull_request").value().is_some() {
    "Pull Request"
  } else {
    "Issue"
  };

  rest_item_record(issue, item_type)
}

/// GraphQL projectV2 item node. Draft items and non-issue content come back
/// as null or `{}` and are skipped.
pub fn flatten_project_item(node: &Value) -> Option<FlatRecord> {
  let content = node.fetch("content").value()?;

  if content.as_object().map(|o| o.is_empty()).unwrap_or(true) {
    return None;
  }

  let field_values = node
    .fetch("fieldValues.nodes")
    .value()
    .and_then(|v| v.as_array())
    .map(|a| a.as_slice())
    .unwrap_or(&[]);

  let status = extract_status(field_values);
  debug!(number = ?content.fetch("number").text(), status = ?status, "project item");

  let record = FlatRecord::default()
    .with(col::TITLE, content.fetch("title").text().unwrap_or_default())
    .with(col::URL, content.fetch("url").text().unwrap_or_default())
    .with(col::CREATED_AT, content.fetch("createdAt").text().unwrap_or_default())
    .with(col::UPDATED_AT, content.fetch("updatedAt").text().unwrap_or_default())
    .with(col::STATE, content.fetch("state").text().unwrap_or_default())
    .with(col::AUTHOR, content.fetch("author.login").text().unwrap_or_default())
    .with(col::LABELS, content.fetch("labels.nodes").join("name", ", "))
    .with(col::MILESTONE, content.fetch("milestone.title").text())
    .with(col::STATUS, status);

  Some(record)
}
