//! test-support: helpers for CLI-level tests of `gh-status-report`.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! Then in tests:
//! ```rust,ignore
//! use test_support::{init_tracing, write_token, cmd_bin};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let td = test_support::tempdir();
//!     let token = write_token(td.path());
//!     let mut cmd = cmd_bin("gh-status-report");
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::{
  env,
  path::{Path, PathBuf},
};

pub const BIN: &str = "gh-status-report";

/// Env vars that switch the binary to its fixture-backed GitHub API.
pub const ENV_REST_PAGES: &str = "GHR_TEST_REST_PAGES";
pub const ENV_GRAPHQL_PAGES: &str = "GHR_TEST_GRAPHQL_PAGES";
pub const ENV_ISSUES_JSON: &str = "GHR_TEST_ISSUES_JSON";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
  static INIT: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,test=info"));
    // with_test_writer() causes logs to appear alongside failing tests only
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
  });
  Lazy::force(&INIT);
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
  tempfile::tempdir().expect("create tempdir")
}

/// Write a dummy token file into `dir` and return its path.
pub fn write_token(dir: &Path) -> PathBuf {
  let path = dir.join("github_token.txt");
  std::fs::write(&path, "  ghp_test_token\n").expect("write token");
  path
}

/// Run the binary with `assert_cmd`, returning the ready-to-run `Command`.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
  init_tracing();
  assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
  EnvGuard::set_many(vars)
}

/// Guard for temporarily setting environment variables.
pub struct EnvGuard {
  prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
  pub fn set_many(kv: &[(&str, &str)]) -> Self {
    let mut prev = Vec::with_capacity(kv.len());
    for (k, v) in kv {
      prev.push((k.to_string(), env::var(k).ok()));
      env::set_var(k, v);
    }
    Self { prev }
  }
}

impl Drop for EnvGuard {
  fn drop(&mut self) {
    for (k, old) in self.prev.drain(..) {
      match old {
        Some(v) => env::set_var(&k, v),
        None => env::remove_var(&k),
      }
    }
  }
}

/// Files in `dir` whose name starts with `prefix`.
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
  let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
    .expect("read dir")
    .filter_map(|e| e.ok().map(|e| e.path()))
    .filter(|p| {
      p.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(prefix))
        .unwrap_or(false)
    })
    .collect();
  found.sort();
  found
}

// --- GitHub payload builders (feature = "serde") ---

#[cfg(feature = "serde")]
pub mod fixtures {
  use serde_json::{json, Value};

  pub fn pull_request(number: u64, title: &str, labels: &[&str]) -> Value {
    json!({
      "number": number,
      "title": title,
      "body": format!("<p>Body of {}</p>", title),
      "html_url": format!("https://github.com/acme/app/pull/{}", number),
      "state": "open",
      "user": { "login": "octo" },
      "assignees": [{ "login": "alice" }],
      "labels": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>(),
      "milestone": null,
      "requested_reviewers": []
    })
  }

  /// REST pages of at most 100 items, in the array form the fixture backend serves as page 1..N.
  pub fn rest_pages(items: Vec<Value>) -> Value {
    Value::Array(items.chunks(100).map(|c| Value::Array(c.to_vec())).collect())
  }

  pub fn project_item(number: u64, title: &str, labels: &[&str], milestone: Option<&str>, status: Option<&str>) -> Value {
    let mut field_values = vec![json!({ "field": { "name": "Title" }, "text": title })];
    if let Some(s) = status {
      field_values.push(json!({ "field": { "name": "Status" }, "name": s }));
    }

    json!({
      "content": {
        "number": number,
        "title": title,
        "url": format!("https://github.com/acme/app/issues/{}", number),
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-02T10:00:00Z",
        "state": "OPEN",
        "author": { "login": "octo" },
        "labels": { "nodes": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>() },
        "milestone": milestone.map(|m| json!({ "title": m }))
      },
      "fieldValues": { "nodes": field_values }
    })
  }

  pub fn graphql_page(nodes: Vec<Value>, end_cursor: Option<&str>, has_next_page: bool) -> Value {
    json!({
      "data": { "organization": { "projectV2": { "items": {
        "pageInfo": { "endCursor": end_cursor, "hasNextPage": has_next_page },
        "nodes": nodes
      } } } }
    })
  }

  /// `{"<project>": {"null" | "<cursor>": envelope}}` for the GraphQL fixture env var.
  pub fn graphql_fixture(projects: Vec<(u32, Vec<(Option<&str>, Value)>)>) -> Value {
    let mut all = serde_json::Map::new();

    for (project, pages) in projects {
      let mut by_cursor = serde_json::Map::new();
      for (cursor, envelope) in pages {
        by_cursor.insert(cursor.unwrap_or("null").to_string(), envelope);
      }
      all.insert(project.to_string(), Value::Object(by_cursor));
    }

    Value::Object(all)
  }

  /// `{"<issue number>": {"number": n, "body": body}}` for the issue fixture env var.
  pub fn issues(bodies: &[(u64, &str)]) -> Value {
    let mut all = serde_json::Map::new();
    for (number, body) in bodies {
      all.insert(number.to_string(), json!({ "number": number, "body": body }));
    }
    Value::Object(all)
  }
}
