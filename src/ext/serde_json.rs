// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Nested JSON lookups via dotted paths, typed extraction, scalar-to-text coercion and name-list joining for API payloads
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper used by the record flattener
// invariants: No panics; missing paths yield None; null counts as missing
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Wrapper around a JSON location to allow typed extraction via a clear second step.
pub struct JsonFetched<'a> {
  inner: Option<&'a Value>,
}

impl<'a> JsonFetched<'a> {
  /// Attempt to deserialize the fetched value as `T`.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// The raw value, if present and not null.
  pub fn value(&self) -> Option<&'a Value> {
    self.inner
  }

  /// Render a scalar as display text: strings verbatim, numbers and bools via
  /// their JSON form. Arrays/objects are rendered as compact JSON.
  pub fn text(&self) -> Option<String> {
    self.inner.map(value_to_text)
  }

  /// Join `key` of every object in the fetched array, e.g. the `name` of each label.
  /// Entries missing `key` are skipped. A missing array yields an empty string.
  pub fn join(&self, key: &str, sep: &str) -> String {
    let Some(arr) = self.inner.and_then(|v| v.as_array()) else {
      return String::new();
    };

    arr
      .iter()
      .filter_map(|item| item.fetch(key).text())
      .collect::<Vec<_>>()
      .join(sep)
  }
}

/// Display text for any JSON value (`null` -> empty).
pub fn value_to_text(v: &Value) -> String {
  match v {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Extension to fetch nested values via dotted paths like "author.login".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    if cur.is_null() {
      return JsonFetched { inner: None };
    }

    JsonFetched { inner: Some(cur) }
  }
}
