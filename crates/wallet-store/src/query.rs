//! Document queries.
//!
//! A `DocumentQuery` is an equality filter over dotted JSON paths, with an
//! additional `contains` form for array fields. It is deliberately small:
//! the synchronized persistence engines this boundary abstracts support
//! exactly this shape efficiently, and the consumption layer never needs
//! more.

use serde_json::Value;

/// One condition of a document query.
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    /// The value at `path` equals the expected value.
    Equals { path: String, expected: Value },
    /// The array at `path` contains the expected value.
    Contains { path: String, expected: Value },
    /// The value at `path` is absent or JSON null.
    IsNull { path: String },
}

/// Equality filter over dotted JSON paths.
///
/// Built with chained calls, matching documents via [`DocumentQuery::matches`]:
///
/// ```
/// use wallet_store::DocumentQuery;
/// use serde_json::json;
///
/// let query = DocumentQuery::new()
///     .field("kind.type", json!("Repository"))
///     .contains("content.tags", json!("formal"));
///
/// let doc = json!({
///     "kind": { "type": "Repository" },
///     "content": { "tags": ["formal", "legal"] },
/// });
/// assert!(query.matches(&doc));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentQuery {
    conditions: Vec<Condition>,
}

impl DocumentQuery {
    /// Creates an empty query matching every document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the value at `path` to equal `expected`.
    #[must_use]
    pub fn field(mut self, path: impl Into<String>, expected: Value) -> Self {
        self.conditions.push(Condition::Equals {
            path: path.into(),
            expected,
        });
        self
    }

    /// Requires the array at `path` to contain `expected`.
    #[must_use]
    pub fn contains(mut self, path: impl Into<String>, expected: Value) -> Self {
        self.conditions.push(Condition::Contains {
            path: path.into(),
            expected,
        });
        self
    }

    /// Requires the value at `path` to be absent or null.
    #[must_use]
    pub fn is_null(mut self, path: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::IsNull { path: path.into() });
        self
    }

    /// Whether the query has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether a document satisfies every condition of this query.
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Equals { path, expected } => {
                lookup(document, path).is_some_and(|found| found == expected)
            }
            Condition::Contains { path, expected } => lookup(document, path)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(expected)),
            Condition::IsNull { path } => {
                lookup(document, path).map_or(true, Value::is_null)
            }
        })
    }
}

/// Resolves a dotted path inside a JSON document.
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "id": "a-1",
            "kind": { "type": "OwnShared", "peer": "bob" },
            "content": { "tags": ["formal"], "value": { "@type": "GivenName" } },
            "succeededBy": null,
        })
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(DocumentQuery::new().matches(&doc()));
    }

    #[test]
    fn equality_on_nested_path() {
        let query = DocumentQuery::new().field("kind.peer", json!("bob"));
        assert!(query.matches(&doc()));

        let query = DocumentQuery::new().field("kind.peer", json!("carol"));
        assert!(!query.matches(&doc()));
    }

    #[test]
    fn missing_path_does_not_match_equality() {
        let query = DocumentQuery::new().field("kind.reference", json!("r-1"));
        assert!(!query.matches(&doc()));
    }

    #[test]
    fn contains_on_array_field() {
        let query = DocumentQuery::new().contains("content.tags", json!("formal"));
        assert!(query.matches(&doc()));

        let query = DocumentQuery::new().contains("content.tags", json!("legal"));
        assert!(!query.matches(&doc()));
    }

    #[test]
    fn contains_on_non_array_does_not_match() {
        let query = DocumentQuery::new().contains("id", json!("a-1"));
        assert!(!query.matches(&doc()));
    }

    #[test]
    fn is_null_matches_null_and_absent() {
        assert!(DocumentQuery::new().is_null("succeededBy").matches(&doc()));
        assert!(DocumentQuery::new().is_null("deletionInfo").matches(&doc()));
        assert!(!DocumentQuery::new().is_null("id").matches(&doc()));
    }

    #[test]
    fn conditions_combine_conjunctively() {
        let query = DocumentQuery::new()
            .field("kind.type", json!("OwnShared"))
            .field("kind.peer", json!("bob"))
            .contains("content.tags", json!("formal"));
        assert!(query.matches(&doc()));

        let query = DocumentQuery::new()
            .field("kind.type", json!("OwnShared"))
            .field("kind.peer", json!("carol"));
        assert!(!query.matches(&doc()));
    }
}
