//! In-process document store.
//!
//! The storage collaborator behind the repositories: named collections of
//! JSON documents keyed by an opaque id, supporting insert, predicate
//! queries, merge updates, deletes and atomic numeric increments.
//!
//! Every mutation runs inside a single collection write-lock scope, so
//! check-then-insert uniqueness ([`Store::insert_unique`]) and counter
//! increments ([`Store::increment`]) cannot interleave with concurrent
//! writers on the same collection.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Number, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Collection holding job documents.
pub const JOBS_COLLECTION: &str = "jobs";

/// Collection holding bid documents.
pub const BIDS_COLLECTION: &str = "bids";

/// Document id field. Stored inside the document itself so query results
/// carry their ids.
pub const ID_FIELD: &str = "_id";

/// A stored document.
pub type Document = Map<String, Value>;

/// Serialize a model into a document.
pub fn to_document<T: serde::Serialize>(value: &T) -> StoreResult<Document> {
    use serde::ser::Error as _;
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(serde_json::Error::custom(
            format!("expected a JSON object, got {other}"),
        ))),
    }
}

/// Deserialize a document into a model.
pub fn from_document<T: serde::de::DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

// =============================================================================
// Predicates and ordering
// =============================================================================

/// Conjunctive query predicate over document fields.
///
/// Field paths may be dotted (`buyer.email`) to address nested objects.
/// An empty filter matches every document.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

#[derive(Debug, Clone)]
enum Condition {
    /// Exact equality on a field path.
    Eq { path: String, value: Value },
    /// Case-insensitive substring match on a string field.
    ContainsCi { path: String, needle: String },
}

impl Filter {
    /// Create an empty (match-all) filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require exact equality on `path`.
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            path: path.into(),
            value: value.into(),
        });
        self
    }

    /// Require `path` to be a string containing `needle`, ignoring case.
    /// An empty needle matches every string field.
    pub fn contains_ci(mut self, path: impl Into<String>, needle: impl Into<String>) -> Self {
        self.conditions.push(Condition::ContainsCi {
            path: path.into(),
            needle: needle.into().to_lowercase(),
        });
        self
    }

    /// True when no conditions were added.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| match c {
            Condition::Eq { path, value } => lookup(doc, path) == Some(value),
            Condition::ContainsCi { path, needle } => lookup(doc, path)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(needle)),
        })
    }
}

/// Resolve a dotted field path against a document.
fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Sort direction for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Single-field ordering applied to query results.
#[derive(Debug, Clone)]
pub struct Sort {
    pub path: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn ascending(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Total order over JSON values: missing < null < bool < number < string.
/// Numbers compare numerically, strings lexicographically (ISO dates sort
/// chronologically under this).
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_value(x, y),
    }
}

fn compare_value(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&y.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of an update operation, echoing what the store did.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UpdateOutcome {
    /// Documents matched by the id (0 or 1).
    pub matched: u64,
    /// Documents actually changed.
    pub modified: u64,
    /// Id of the document created by an upsert, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<String>,
}

/// Result of a delete operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeleteOutcome {
    /// Documents removed (0 or 1).
    pub deleted: u64,
}

// =============================================================================
// Store
// =============================================================================

struct Collection {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl Collection {
    fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }
}

/// In-process document store. Cheap to clone; clones share state.
///
/// Opened once at startup and injected into the repositories; dropping the
/// last handle releases all data.
#[derive(Clone, Default)]
pub struct Store {
    collections: Arc<RwLock<HashMap<String, Arc<Collection>>>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn collection(&self, name: &str) -> Arc<Collection> {
        {
            let collections = self.collections.read().await;
            if let Some(c) = collections.get(name) {
                return Arc::clone(c);
            }
        }
        let mut collections = self.collections.write().await;
        Arc::clone(
            collections
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Collection::new())),
        )
    }

    /// Insert a document, assigning a fresh id. Returns the id.
    pub async fn insert_one(&self, collection: &str, mut doc: Document) -> String {
        let id = Uuid::new_v4().to_string();
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        let col = self.collection(collection).await;
        let mut docs = col.docs.write().await;
        docs.insert(id.clone(), doc);
        id
    }

    /// Insert a document only if nothing matching `unique` exists.
    ///
    /// The existence check and the insert run under one write-lock scope,
    /// so two concurrent calls with the same key cannot both succeed.
    pub async fn insert_unique(
        &self,
        collection: &str,
        unique: &Filter,
        mut doc: Document,
    ) -> StoreResult<String> {
        let col = self.collection(collection).await;
        let mut docs = col.docs.write().await;
        if docs.values().any(|d| unique.matches(d)) {
            return Err(StoreError::already_exists(format!(
                "{collection} document matching uniqueness predicate"
            )));
        }
        let id = Uuid::new_v4().to_string();
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        docs.insert(id.clone(), doc);
        Ok(id)
    }

    /// Find all documents matching `filter`, optionally sorted.
    pub async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> Vec<Document> {
        let col = self.collection(collection).await;
        let docs = col.docs.read().await;
        let mut results: Vec<Document> = docs.values().filter(|d| filter.matches(d)).cloned().collect();
        if let Some(sort) = sort {
            results.sort_by(|a, b| {
                let ord = compare_values(lookup(a, &sort.path), lookup(b, &sort.path));
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        results
    }

    /// Find the first document matching `filter`.
    pub async fn find_one(&self, collection: &str, filter: &Filter) -> Option<Document> {
        let col = self.collection(collection).await;
        let docs = col.docs.read().await;
        docs.values().find(|d| filter.matches(d)).cloned()
    }

    /// Fetch a document by id.
    pub async fn find_by_id(&self, collection: &str, id: &str) -> Option<Document> {
        let col = self.collection(collection).await;
        let docs = col.docs.read().await;
        docs.get(id).cloned()
    }

    /// Merge `patch` into the document with the given id. Supplied fields
    /// overwrite, others are retained; the id field is never writable.
    ///
    /// With `upsert` set, a missing id creates a new document under it.
    pub async fn update_one(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
        upsert: bool,
    ) -> UpdateOutcome {
        let col = self.collection(collection).await;
        let mut docs = col.docs.write().await;
        let mut patch = patch;
        patch.remove(ID_FIELD);

        if let Some(doc) = docs.get_mut(id) {
            let changed = patch.iter().any(|(k, v)| doc.get(k) != Some(v));
            doc.extend(patch);
            UpdateOutcome {
                matched: 1,
                modified: u64::from(changed),
                upserted_id: None,
            }
        } else if upsert {
            let mut doc = patch;
            doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
            docs.insert(id.to_string(), doc);
            UpdateOutcome {
                matched: 0,
                modified: 0,
                upserted_id: Some(id.to_string()),
            }
        } else {
            UpdateOutcome {
                matched: 0,
                modified: 0,
                upserted_id: None,
            }
        }
    }

    /// Merge `patch` into the document with the given id, but only if the
    /// document also satisfies `guard`. The guard evaluation and the merge
    /// share one write-lock scope.
    ///
    /// Returns `matched: 0` when the id exists but the guard rejects it.
    pub async fn update_one_matching(
        &self,
        collection: &str,
        id: &str,
        guard: &Filter,
        patch: Document,
    ) -> UpdateOutcome {
        let col = self.collection(collection).await;
        let mut docs = col.docs.write().await;
        let mut patch = patch;
        patch.remove(ID_FIELD);

        match docs.get_mut(id) {
            Some(doc) if guard.matches(doc) => {
                let changed = patch.iter().any(|(k, v)| doc.get(k) != Some(v));
                doc.extend(patch);
                UpdateOutcome {
                    matched: 1,
                    modified: u64::from(changed),
                    upserted_id: None,
                }
            }
            _ => UpdateOutcome {
                matched: 0,
                modified: 0,
                upserted_id: None,
            },
        }
    }

    /// Delete a document by id. Reports zero deleted when the id is absent.
    pub async fn delete_one(&self, collection: &str, id: &str) -> DeleteOutcome {
        let col = self.collection(collection).await;
        let mut docs = col.docs.write().await;
        DeleteOutcome {
            deleted: u64::from(docs.remove(id).is_some()),
        }
    }

    /// Atomically add `delta` to a numeric field, treating a missing field
    /// as 0 and flooring the result at 0. Returns the new value.
    pub async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> StoreResult<i64> {
        let col = self.collection(collection).await;
        let mut docs = col.docs.write().await;
        let doc = docs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(format!("{collection}/{id}")))?;
        let current = doc.get(field).and_then(Value::as_i64).unwrap_or(0);
        let next = (current + delta).max(0);
        doc.insert(field.to_string(), Value::Number(Number::from(next)));
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_and_find_by_id() {
        let store = Store::new();
        let id = store
            .insert_one("jobs", doc(json!({ "title": "Logo design" })))
            .await;

        let found = store.find_by_id("jobs", &id).await.unwrap();
        assert_eq!(found.get("title").unwrap(), "Logo design");
        assert_eq!(found.get(ID_FIELD).unwrap(), &Value::String(id));
    }

    #[tokio::test]
    async fn filter_equality_with_dotted_path() {
        let store = Store::new();
        store
            .insert_one("jobs", doc(json!({ "buyer": { "email": "a@x.com" } })))
            .await;
        store
            .insert_one("jobs", doc(json!({ "buyer": { "email": "b@x.com" } })))
            .await;

        let results = store
            .find("jobs", &Filter::new().eq("buyer.email", "a@x.com"), None)
            .await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn contains_ci_matches_case_insensitively_and_empty_matches_all() {
        let store = Store::new();
        store
            .insert_one("jobs", doc(json!({ "title": "Frontend Engineer" })))
            .await;
        store
            .insert_one("jobs", doc(json!({ "title": "Gardener" })))
            .await;

        let hits = store
            .find("jobs", &Filter::new().contains_ci("title", "ENG"), None)
            .await;
        assert_eq!(hits.len(), 1);

        let all = store
            .find("jobs", &Filter::new().contains_ci("title", ""), None)
            .await;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn sort_orders_iso_dates() {
        let store = Store::new();
        for d in ["2025-03-01", "2025-01-15", "2025-02-10"] {
            store.insert_one("jobs", doc(json!({ "deadline": d }))).await;
        }

        let asc = store
            .find("jobs", &Filter::new(), Some(&Sort::ascending("deadline")))
            .await;
        let deadlines: Vec<&str> = asc
            .iter()
            .map(|d| d.get("deadline").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(deadlines, vec!["2025-01-15", "2025-02-10", "2025-03-01"]);

        let desc = store
            .find("jobs", &Filter::new(), Some(&Sort::descending("deadline")))
            .await;
        assert_eq!(
            desc.first().unwrap().get("deadline").unwrap(),
            "2025-03-01"
        );
    }

    #[tokio::test]
    async fn update_merges_and_keeps_unlisted_fields() {
        let store = Store::new();
        let id = store
            .insert_one(
                "jobs",
                doc(json!({ "title": "Old", "category": "web", "bid_count": 3 })),
            )
            .await;

        let outcome = store
            .update_one("jobs", &id, doc(json!({ "title": "New" })), false)
            .await;
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.modified, 1);

        let updated = store.find_by_id("jobs", &id).await.unwrap();
        assert_eq!(updated.get("title").unwrap(), "New");
        assert_eq!(updated.get("category").unwrap(), "web");
        assert_eq!(updated.get("bid_count").unwrap(), 3);
    }

    #[tokio::test]
    async fn update_cannot_rewrite_id() {
        let store = Store::new();
        let id = store.insert_one("jobs", doc(json!({ "title": "t" }))).await;

        store
            .update_one("jobs", &id, doc(json!({ "_id": "hijacked" })), false)
            .await;
        let unchanged = store.find_by_id("jobs", &id).await.unwrap();
        assert_eq!(unchanged.get(ID_FIELD).unwrap(), &Value::String(id));
    }

    #[tokio::test]
    async fn upsert_creates_missing_document() {
        let store = Store::new();
        let outcome = store
            .update_one("jobs", "fresh-id", doc(json!({ "title": "t" })), true)
            .await;
        assert_eq!(outcome.upserted_id.as_deref(), Some("fresh-id"));
        assert!(store.find_by_id("jobs", "fresh-id").await.is_some());
    }

    #[tokio::test]
    async fn delete_missing_reports_zero() {
        let store = Store::new();
        let outcome = store.delete_one("jobs", "nope").await;
        assert_eq!(outcome.deleted, 0);
    }

    #[tokio::test]
    async fn increment_missing_document_fails() {
        let store = Store::new();
        let err = store.increment("jobs", "nope", "bid_count", 1).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_increments_do_not_lose_updates() {
        let store = Store::new();
        let id = store
            .insert_one("jobs", doc(json!({ "bid_count": 0 })))
            .await;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store.increment("jobs", &id, "bid_count", 1).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let doc = store.find_by_id("jobs", &id).await.unwrap();
        assert_eq!(doc.get("bid_count").unwrap(), 50);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_unique_inserts_admit_exactly_one() {
        let store = Store::new();
        let unique = Filter::new().eq("email", "a@x.com").eq("jobId", "j1");

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            let unique = unique.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_unique(
                        "bids",
                        &unique,
                        doc(json!({ "email": "a@x.com", "jobId": "j1" })),
                    )
                    .await
            }));
        }

        let mut successes = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let stored = store.find("bids", &Filter::new(), None).await;
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn guarded_update_rejects_non_matching_document() {
        let store = Store::new();
        let id = store
            .insert_one("bids", doc(json!({ "status": "accepted" })))
            .await;

        let outcome = store
            .update_one_matching(
                "bids",
                &id,
                &Filter::new().eq("status", "pending"),
                doc(json!({ "status": "rejected" })),
            )
            .await;
        assert_eq!(outcome.matched, 0);

        let unchanged = store.find_by_id("bids", &id).await.unwrap();
        assert_eq!(unchanged.get("status").unwrap(), "accepted");
    }
}
