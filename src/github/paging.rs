// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Paged retrieval from GitHub: REST page/per_page loops and GraphQL projectV2 cursor loops
// role: github/paging
// inputs: &dyn GithubApi; REST base URL or GraphQL endpoint + org + project number
// outputs: FetchOutcome with accumulated raw items, request count, and optional abort reason
// side_effects: Sequential network requests through the api seam; progress and aborts logged via tracing
// invariants:
// - REST stops on the first empty page; GraphQL stops when hasNextPage is false (or no endCursor)
// - Any failure stops only the current resource and keeps items already accumulated
// - Pages are requested strictly one after another; no retries or backoff
// errors: Never propagated; recorded in FetchOutcome::aborted
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::Value;
use tracing::{info, warn};

use crate::ext::serde_json::JsonFetch;
use crate::github::api::GithubApi;
use crate::github::error::FetchError;

pub const PER_PAGE: usize = 100;

/// Everything one paged fetch produced.
#[derive(Debug)]
pub struct FetchOutcome<T> {
  pub items: Vec<T>,
  /// Requests issued, including the terminating empty/failed one.
  pub pages: usize,
  pub aborted: Option<FetchError>,
}

impl<T> Default for FetchOutcome<T> {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      pages: 0,
      aborted: None,
    }
  }
}

impl<T> FetchOutcome<T> {
  fn abort(&mut self, err: FetchError) {
    warn!(error = %err, items_kept = self.items.len(), "fetch aborted");
    self.aborted = Some(err);
  }
}

pub fn rest_page_url(base_url: &str, page: usize) -> String {
  format!("{}?state=all&page={}&per_page={}", base_url, page, PER_PAGE)
}

/// Fetch every page of a REST list endpoint (`/repos/{o}/{r}/pulls`, `/issues`).
pub fn fetch_rest_all(api: &dyn GithubApi, base_url: &str) -> FetchOutcome<Value> {
  let mut outcome = FetchOutcome::default();
  let mut page = 1usize;

  loop {
    let url = rest_page_url(base_url, page);
    info!(url = %url, "fetching");
    outcome.pages += 1;

    let reply = match api.get(&url) {
      Ok(r) => r,
      Err(e) => {
        outcome.abort(e);
        break;
      }
    };

    if !reply.is_ok() {
      outcome.abort(FetchError::Status {
        url,
        status: reply.status,
        body: reply.body,
      });
      break;
    }

    let batch = match reply.json() {
      Ok(Value::Array(arr)) => arr,
      Ok(_) => {
        outcome.abort(FetchError::Shape(format!("{} did not return a JSON array", url)));
        break;
      }
      Err(e) => {
        outcome.abort(e);
        break;
      }
    };

    if batch.is_empty() {
      break;
    }

    outcome.items.extend(batch);
    page += 1;
  }

  outcome
}

const PROJECT_ITEMS_QUERY: &str = r#"
{
  organization(login: $ORG) {
    projectV2(number: $NUMBER) {
      items(first: 100, after: $AFTER) {
        pageInfo {
          endCursor
          hasNextPage
        }
        nodes {
          content {
            ... on Issue {
              id
              number
              title
              url
              createdAt
              updatedAt
              state
              author {
                login
              }
              labels(first: 10) {
                nodes {
                  name
                }
              }
              milestone {
                title
              }
            }
          }
          fieldValues(first: 100) {
            nodes {
              ... on ProjectV2ItemFieldValueCommon {
                field {
                  ... on ProjectV2FieldCommon {
                    name
                  }
                }
              }
              ... on ProjectV2ItemFieldTextValue {
                field {
                  ... on ProjectV2Field {
                    name
                  }
                }
                text
              }
              ... on ProjectV2ItemFieldSingleSelectValue {
                field {
                  ... on ProjectV2SingleSelectField {
                    name
                  }
                }
                name
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// `null` for the first page, a quoted string afterwards. An empty cursor counts as none.
pub fn cursor_literal(cursor: Option<&str>) -> String {
  match cursor.filter(|c| !c.is_empty()) {
    Some(c) => serde_json::to_string(c).unwrap_or_else(|_| "null".to_string()),
    None => "null".to_string(),
  }
}

pub fn project_items_query(org: &str, project_number: u32, cursor: Option<&str>) -> String {
  let org_literal = serde_json::to_string(org).unwrap_or_else(|_| "\"\"".to_string());

  PROJECT_ITEMS_QUERY
    .replace("$ORG", &org_literal)
    .replace("$NUMBER", &project_number.to_string())
    .replace("$AFTER", &cursor_literal(cursor))
}

fn graphql_error_messages(errors: &[Value]) -> Vec<String> {
  errors
    .iter()
    .map(|e| e.fetch("message").text().unwrap_or_else(|| e.to_string()))
    .collect()
}

/// Fetch every item node of one organization project board.
pub fn fetch_project_items(api: &dyn GithubApi, graphql_url: &str, org: &str, project_number: u32) -> FetchOutcome<Value> {
  let mut outcome = FetchOutcome::default();
  let mut cursor: Option<String> = None;

  loop {
    let query = project_items_query(org, project_number, cursor.as_deref());
    info!(project = project_number, after = cursor.as_deref().unwrap_or("null"), "fetching project items");
    outcome.pages += 1;

    let reply = match api.post_json(graphql_url, &serde_json::json!({ "query": query })) {
      Ok(r) => r,
      Err(e) => {
        outcome.abort(e);
        break;
      }
    };

    if !reply.is_ok() {
      outcome.abort(FetchError::Status {
        url: graphql_url.to_string(),
        status: reply.status,
        body: reply.body,
      });
      break;
    }

    let envelope = match reply.json() {
      Ok(v) => v,
      Err(e) => {
        outcome.abort(e);
        break;
      }
    };

    if let Some(errors) = envelope.get("errors").and_then(|e| e.as_array()) {
      outcome.abort(FetchError::Graphql(graphql_error_messages(errors)));
      break;
    }

    let Some(items) = envelope.fetch("data.organization.projectV2.items").value() else {
      outcome.abort(FetchError::Shape(format!(
        "project {} response lacks data.organization.projectV2.items",
        project_number
      )));
      break;
    };

    if let Some(nodes) = items.fetch("nodes").value().and_then(|n| n.as_array()) {
      outcome.items.extend(nodes.iter().cloned());
    }

    let has_next = items.fetch("pageInfo.hasNextPage").to::<bool>().unwrap_or(false);
    let end_cursor = items.fetch("pageInfo.endCursor").to::<String>();

    if !has_next {
      break;
    }

    match end_cursor {
      Some(c) if !c.is_empty() => cursor = Some(c),
      _ => {
        warn!(project = project_number, "hasNextPage without endCursor; stopping");
        break;
      }
    }
  }

  info!(project = project_number, items = outcome.items.len(), pages = outcome.pages, "project fetched");

  outcome
}
