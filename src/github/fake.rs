//! In-memory `GithubApi` for unit tests plus payload builders shaped like
//! the real REST and GraphQL responses.

use std::cell::RefCell;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::github::api::{ApiReply, GithubApi};
use crate::github::error::FetchError;
use crate::github::paging::{rest_page_url, PER_PAGE};

static RE_PROJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"projectV2\(number:\s*(\d+)\)").unwrap());
static RE_AFTER: Lazy<Regex> = Lazy::new(|| Regex::new(r#"after:\s*(null|"([^"]*)")"#).unwrap());

#[derive(Default)]
pub struct FakeApi {
  replies: HashMap<String, ApiReply>,
  graphql: HashMap<(u32, Option<String>), Value>,
  log: RefCell<Vec<String>>,
}

impl FakeApi {
  pub fn new() -> Self {
    Self::default()
  }

  /// Serve `items` from `base` in pages of 100, followed by an empty page.
  pub fn rest_items(mut self, base: &str, items: Vec<Value>) -> Self {
    for (idx, chunk) in items.chunks(PER_PAGE).enumerate() {
      let body = Value::Array(chunk.to_vec()).to_string();
      self.replies.insert(rest_page_url(base, idx + 1), ApiReply::ok(body));
    }
    self
  }

  pub fn rest_page(mut self, base: &str, page: usize, reply: ApiReply) -> Self {
    self.replies.insert(rest_page_url(base, page), reply);
    self
  }

  /// Exact-URL reply (single issue lookups).
  pub fn reply(mut self, url: &str, reply: ApiReply) -> Self {
    self.replies.insert(url.to_string(), reply);
    self
  }

  pub fn graphql(mut self, project: u32, after: Option<&str>, envelope: Value) -> Self {
    self.graphql.insert((project, after.map(str::to_string)), envelope);
    self
  }

  pub fn requested(&self) -> Vec<String> {
    self.log.borrow().clone()
  }
}

impl GithubApi for FakeApi {
  fn get(&self, url: &str) -> Result<ApiReply, FetchError> {
    self.log.borrow_mut().push(format!("GET {}", url));
    Ok(self.replies.get(url).cloned().unwrap_or_else(|| ApiReply::ok("[]")))
  }

  fn post_json(&self, url: &str, payload: &Value) -> Result<ApiReply, FetchError> {
    let query = payload.get("query").and_then(|q| q.as_str()).unwrap_or("");
    let project = RE_PROJECT
      .captures(query)
      .and_then(|c| c[1].parse::<u32>().ok())
      .unwrap_or(0);
    let after = RE_AFTER
      .captures(query)
      .and_then(|c| c.get(2).map(|m| m.as_str().to_string()));

    self
      .log
      .borrow_mut()
      .push(format!("POST {} project={} after={}", url, project, after.as_deref().unwrap_or("null")));

    let envelope = self
      .graphql
      .get(&(project, after))
      .cloned()
      .unwrap_or_else(|| json!({ "errors": [{ "message": "no fixture" }] }));

    Ok(ApiReply::ok(envelope.to_string()))
  }
}

pub fn pull_request_json(number: u64, title: &str, labels: &[&str]) -> Value {
  json!({
    "number": number,
    "title": title,
    "body": format!("Body of {}", title),
    "html_url": format!("https://github.com/acme/app/pull/{}", number),
    "state": "open",
    "user": { "login": "octo" },
    "assignees": [{ "login": "alice" }, { "login": "bob" }],
    "labels": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>(),
    "milestone": null,
    "requested_reviewers": [{ "login": "carol" }]
  })
}

pub fn issue_url(number: u64) -> String {
  format!("https://github.com/acme/app/issues/{}", number)
}

pub fn project_node(number: u64, title: &str, labels: &[&str], milestone: Option<&str>, status: Option<&str>) -> Value {
  let mut field_values = vec![
    json!({ "field": { "name": "Title" }, "text": title }),
    json!({}),
  ];

  if let Some(s) = status {
    field_values.push(json!({ "field": { "name": "Status" }, "name": s }));
  }

  json!({
    "content": {
      "id": format!("I_{}", number),
      "number": number,
      "title": title,
      "url": issue_url(number),
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
    "data": {
      "organization": {
        "projectV2": {
          "items": {
            "pageInfo": { "endCursor": end_cursor, "hasNextPage": has_next_page },
            "nodes": nodes
          }
        }
      }
    }
  })
}
