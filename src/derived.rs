// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Spreadsheet formula templates for the derived label columns, row substitution, and in-process evaluators
// role: transform/derived-columns
// inputs: Template text with placeholder refs G2 (labels) and B2 (URL); destination cell refs; raw labels/URL text
// outputs: Formula text bound to a row; the value the formula computes, used as cached result and for filtering
// invariants:
// - Substitution replaces whole cell-reference tokens only; no placeholder survives
// - Evaluators agree with the spreadsheet semantics of their templates (SEARCH case-insensitive, FIND case-sensitive)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;

pub const LABEL_STATUS_FORMULA: &str = r#"=IFERROR(MID(G2, SEARCH("Status: ", G2) + LEN("Status: "), IF(ISNUMBER(SEARCH(",", G2, SEARCH("Status: ", G2) + LEN("Status: "))), SEARCH(",", G2, SEARCH("Status: ", G2) + LEN("Status: ")) - (SEARCH("Status: ", G2) + LEN("Status: ")), LEN(G2))), "")"#;

pub const ISSUE_TYPE_FORMULA: &str = r#"=IF(OR(UPPER(LEFT(G2, FIND(" ", G2 & " ") - 1)) = "FEATURE", UPPER(LEFT(G2, FIND(" ", G2 & " ") - 1)) = "USER STORY", UPPER(LEFT(G2, FIND(" ", G2 & " ") - 1)) = "TASK", UPPER(LEFT(G2, FIND(" ", G2 & " ") - 1)) = "EPIC", UPPER(LEFT(G2, FIND(" ", G2 & " ") - 1)) = "OPERATIONAL", UPPER(LEFT(G2, FIND(" ", G2 & " ") - 1)) = "DEFECT"), UPPER(LEFT(G2, FIND(" ", G2 & " ") - 1)), IF(OR(LEFT(G2, 4) = "Pod:", G2 = ""), "", IFERROR(IF(ISERROR(FIND(",", G2)), G2, LEFT(G2, FIND(",", G2) - 1)), G2)))"#;

pub const POD_FORMULA: &str = r#"=IFERROR(MID(G2, SEARCH("Pod: ", G2) + LEN("Pod: "), SEARCH(",", G2, SEARCH("Pod: ", G2)) - (SEARCH("Pod: ", G2) + LEN("Pod: "))), "")"#;

pub const IS_DEFECT_FORMULA: &str = r#"=IF(ISNUMBER(SEARCH("Defect", G2)), "Defect", "")"#;

pub const HYPERLINK_FORMULA: &str = r#"=HYPERLINK(B2, TRIM(RIGHT(SUBSTITUTE(B2, "/", REPT(" ", 100)), 100)))"#;

const ISSUE_TYPES: [&str; 6] = ["FEATURE", "USER STORY", "TASK", "EPIC", "OPERATIONAL", "DEFECT"];

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(G2|B2)\b").unwrap());
static RE_STATUS_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)status: ").unwrap());
static RE_POD_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)pod: ").unwrap());
static RE_DEFECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)defect").unwrap());

/// A derived column: its template and the evaluator that mirrors it.
#[derive(Debug, Clone, Copy)]
pub struct Derived {
  pub template: &'static str,
  pub eval: fn(&str) -> String,
}

pub const LABEL_STATUS: Derived = Derived {
  template: LABEL_STATUS_FORMULA,
  eval: label_status,
};

pub const ISSUE_TYPE: Derived = Derived {
  template: ISSUE_TYPE_FORMULA,
  eval: issue_type,
};

pub const POD: Derived = Derived {
  template: POD_FORMULA,
  eval: pod,
};

pub const IS_DEFECT: Derived = Derived {
  template: IS_DEFECT_FORMULA,
  eval: is_defect,
};

/// Bind a template to a row: `G2` -> `labels_ref`, `B2` -> `url_ref`.
pub fn render_formula(template: &str, labels_ref: &str, url_ref: &str) -> String {
  RE_PLACEHOLDER
    .replace_all(template, |caps: &regex::Captures| match &caps[1] {
      "G2" => labels_ref.to_string(),
      _ => url_ref.to_string(),
    })
    .into_owned()
}

/// Text after the first "Status: " (any case) up to the next comma or the end.
pub fn label_status(labels: &str) -> String {
  let Some(mark) = RE_STATUS_MARK.find(labels) else {
    return String::new();
  };

  let rest = &labels[mark.end()..];

  match rest.find(',') {
    Some(comma) => rest[..comma].to_string(),
    None => rest.to_string(),
  }
}

/// Whitelisted first word in upper case; otherwise the first comma token,
/// except for blobs that open with "Pod:" or are empty.
pub fn issue_type(labels: &str) -> String {
  let first_word = labels.split(' ').next().unwrap_or("").to_uppercase();

  if ISSUE_TYPES.contains(&first_word.as_str()) {
    return first_word;
  }

  let opens_with_pod = labels
    .get(..4)
    .map(|head| head.eq_ignore_ascii_case("pod:"))
    .unwrap_or(false);

  if opens_with_pod || labels.is_empty() {
    return String::new();
  }

  match labels.find(',') {
    Some(comma) => labels[..comma].to_string(),
    None => labels.to_string(),
  }
}

/// Text after the first "Pod: " (any case) up to the next comma; empty when no comma follows.
pub fn pod(labels: &str) -> String {
  let Some(mark) = RE_POD_MARK.find(labels) else {
    return String::new();
  };

  let rest = &labels[mark.end()..];

  rest.find(',').map(|comma| rest[..comma].to_string()).unwrap_or_default()
}

pub fn is_defect(labels: &str) -> String {
  if RE_DEFECT.is_match(labels) {
    "Defect".to_string()
  } else {
    String::new()
  }
}

/// Display text of the HYPERLINK formula: the final path segment (at most 100 chars), whitespace-trimmed.
pub fn link_text(url: &str) -> String {
  let segment = url.rsplit('/').next().unwrap_or("");
  let count = segment.chars().count();
  let tail: String = segment.chars().skip(count.saturating_sub(100)).collect();

  tail.split_whitespace().collect::<Vec<_>>().join(" ")
}
