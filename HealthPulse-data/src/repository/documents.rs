use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::RepositoryError;

/// A stored document: a JSON object filed under a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-generated identifier
    pub id: String,

    /// Collection the document belongs to
    pub collection: String,

    /// Document body
    pub data: Value,

    /// When the document was added
    pub created_at: DateTime<Utc>,
}

/// Sort direction for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Equals(String, Value),
    GreaterOrEqual(String, Value),
    LessThan(String, Value),
}

/// Query filter over document fields
///
/// Field names are top-level keys; dotted names (`a.b`) reach into nested
/// objects. Ordering compares numbers numerically, RFC 3339 timestamps by
/// instant and any other strings lexically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFilter {
    conditions: Vec<Condition>,
    order_by: Option<(String, SortDirection)>,
    limit: Option<usize>,
}

impl DocumentFilter {
    /// An empty filter matching every document in a collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Equals(field.to_string(), value.into()));
        self
    }

    /// Require `field >= value`
    pub fn where_gte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::GreaterOrEqual(field.to_string(), value.into()));
        self
    }

    /// Require `field < value`
    pub fn where_lt(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::LessThan(field.to_string(), value.into()));
        self
    }

    /// Sort results by a field
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    /// Keep at most `limit` results (applied after sorting)
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document body satisfies every condition
    pub fn matches(&self, data: &Value) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Equals(field, expected) => field_value(data, field) == Some(expected),
            Condition::GreaterOrEqual(field, bound) => matches!(
                field_value(data, field).and_then(|v| compare_values(v, bound)),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Condition::LessThan(field, bound) => matches!(
                field_value(data, field).and_then(|v| compare_values(v, bound)),
                Some(Ordering::Less)
            ),
        })
    }

    /// Filter, sort and truncate a set of candidate documents
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut selected: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.matches(&doc.data))
            .collect();

        match &self.order_by {
            Some((field, direction)) => {
                selected.sort_by(|a, b| {
                    let ordering = match (field_value(&a.data, field), field_value(&b.data, field)) {
                        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        (None, None) => Ordering::Equal,
                    };
                    match direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                });
            }
            None => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn field_value<'a>(data: &'a Value, field: &str) -> Option<&'a Value> {
    if field.contains('.') {
        data.pointer(&format!("/{}", field.replace('.', "/")))
    } else {
        data.get(field)
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => Some(x.cmp(&y)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Merge the top-level keys of `patch` into `data`
pub(crate) fn merge_patch(data: &mut Value, patch: &Value) -> Result<(), RepositoryError> {
    let patch = patch
        .as_object()
        .ok_or_else(|| RepositoryError::Validation("patch must be a JSON object".to_string()))?;
    let target = data
        .as_object_mut()
        .ok_or_else(|| RepositoryError::Validation("stored document is not a JSON object".to_string()))?;
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
    Ok(())
}

/// Document-oriented persistence service
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a document to a collection, returning the generated id
    async fn add(&self, collection: &str, data: Value) -> Result<String, RepositoryError>;

    /// Query a collection
    async fn query(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, RepositoryError>;

    /// Merge `patch` into an existing document
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), RepositoryError>;

    /// Fetch one document by id
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document {
            id: id.to_string(),
            collection: "readings".to_string(),
            data,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_equality_filter() {
        let filter = DocumentFilter::new().where_eq("ownerId", "alice");
        assert!(filter.matches(&json!({ "ownerId": "alice", "systolic": 120 })));
        assert!(!filter.matches(&json!({ "ownerId": "bob" })));
        assert!(!filter.matches(&json!({ "systolic": 120 })));
    }

    #[test]
    fn test_range_filter_on_timestamps() {
        let filter = DocumentFilter::new()
            .where_gte("timestamp", "2024-03-01T00:00:00Z")
            .where_lt("timestamp", "2024-03-08T00:00:00Z");
        assert!(filter.matches(&json!({ "timestamp": "2024-03-01T00:00:00Z" })));
        assert!(filter.matches(&json!({ "timestamp": "2024-03-05T10:30:00Z" })));
        assert!(!filter.matches(&json!({ "timestamp": "2024-03-08T00:00:00Z" })));
        assert!(!filter.matches(&json!({ "timestamp": 5 })));
    }

    #[test]
    fn test_timestamps_compare_by_instant() {
        // Fractional seconds and offsets must not change the order
        let filter = DocumentFilter::new().where_lt("timestamp", "2024-03-01T08:00:00.500Z");
        assert!(filter.matches(&json!({ "timestamp": "2024-03-01T08:00:00Z" })));
        assert!(!filter.matches(&json!({ "timestamp": "2024-03-01T09:00:00.750+01:00" })));

        let docs = vec![
            doc("later", json!({ "timestamp": "2024-03-01T08:00:00.500Z" })),
            doc("earlier", json!({ "timestamp": "2024-03-01T08:00:00Z" })),
        ];
        let filter = DocumentFilter::new().order_by("timestamp", SortDirection::Descending);
        let ids: Vec<String> = filter.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["later", "earlier"]);
    }

    #[test]
    fn test_nested_field() {
        let filter = DocumentFilter::new().where_eq("components.mood", 80);
        assert!(filter.matches(&json!({ "components": { "mood": 80 } })));
    }

    #[test]
    fn test_apply_sorts_and_limits() {
        let docs = vec![
            doc("a", json!({ "timestamp": "2024-03-01T08:00:00Z" })),
            doc("b", json!({ "timestamp": "2024-03-03T08:00:00Z" })),
            doc("c", json!({ "timestamp": "2024-03-02T08:00:00Z" })),
        ];
        let filter = DocumentFilter::new()
            .order_by("timestamp", SortDirection::Descending)
            .limit(2);

        let ids: Vec<String> = filter.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_merge_patch_rejects_non_objects() {
        let mut data = json!({ "a": 1 });
        assert!(merge_patch(&mut data, &json!([1, 2])).is_err());
        merge_patch(&mut data, &json!({ "b": 2 })).unwrap();
        assert_eq!(data, json!({ "a": 1, "b": 2 }));
    }
}
