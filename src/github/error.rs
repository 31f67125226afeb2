//! Error types for GitHub fetches.
//!
//! None of these abort a run: a fetch that fails stops paging for that one
//! resource, keeps whatever was accumulated, and records the reason.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
  /// The request never produced an HTTP response
  #[error("request to {url} failed: {message}")]
  Transport { url: String, message: String },

  /// Any status other than 200
  #[error("HTTP {status} from {url}: {body}")]
  Status { url: String, status: u16, body: String },

  /// GraphQL `errors` envelope
  #[error("GraphQL errors: {}", .0.join("; "))]
  Graphql(Vec<String>),

  /// Body parsed but not in the expected shape
  #[error("unexpected response shape: {0}")]
  Shape(String),
}
