//! Immutable query parameter bag for resolve calls.
//!
//! A `Query` is an opaque, serializable set of filter/sort/pagination
//! parameters. It has no identity; build a fresh one per call. The
//! accessor treats it as a value and never inspects individual keys.

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Filter/sort/pagination parameters for a resolve call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
  params: BTreeMap<String, String>,
}

impl Query {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add an arbitrary parameter (builder style).
  pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
    self.params.insert(key.into(), value.to_string());
    self
  }

  /// Cap the number of returned items.
  pub fn limit(self, n: u64) -> Self {
    self.with("limit", n)
  }

  /// Skip the first `n` items.
  pub fn offset(self, n: u64) -> Self {
    self.with("offset", n)
  }

  /// Sort by a field; prefix with `-` for descending order.
  pub fn order(self, field: &str) -> Self {
    self.with("order", field)
  }

  pub fn is_empty(&self) -> bool {
    self.params.is_empty()
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.params.get(key).map(String::as_str)
  }

  /// Encode as a query string without the leading `?`.
  ///
  /// Parameters come out in lexicographic key order, so equal queries
  /// always encode identically.
  pub fn encode(&self) -> String {
    form_urlencoded::Serializer::new(String::new())
      .extend_pairs(self.params.iter())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_encode_is_sorted_and_escaped() {
    let query = Query::new()
      .with("slug", "hello world")
      .limit(20)
      .order("-when_timestamp");

    assert_eq!(
      query.encode(),
      "limit=20&order=-when_timestamp&slug=hello+world"
    );
  }

  #[test]
  fn test_empty_query_encodes_empty() {
    let query = Query::new();
    assert!(query.is_empty());
    assert_eq!(query.encode(), "");
  }

  #[test]
  fn test_with_overwrites_existing_key() {
    let query = Query::new().limit(10).limit(50);
    assert_eq!(query.get("limit"), Some("50"));
  }

  #[test]
  fn test_equal_queries_compare_equal() {
    let a = Query::new().offset(5).with("projectid", 1);
    let b = Query::new().with("projectid", 1).offset(5);
    assert_eq!(a, b);
  }
}
