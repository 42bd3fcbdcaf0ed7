use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};

use crate::db::store::{DocumentStore, FieldFilter, FindQuery, SortDirection};
use crate::error::AppError;

/// In-process DocumentStore with MongoDB-like query semantics.
///
/// Used by tests and for running the API locally without a database.
/// Documents are kept in insertion order per collection.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored document of `collection`, `_id` included.
    pub fn dump(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .map(|collections| collections.get(collection).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Document>>>, AppError> {
        self.collections
            .lock()
            .map_err(|_| AppError::Database("in-memory store lock poisoned".into()))
    }
}

fn with_id(mut doc: Document) -> (String, Document) {
    let id = match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(other) => other.to_string(),
        None => {
            let oid = ObjectId::new();
            doc.insert("_id", oid);
            oid.to_hex()
        }
    };
    (id, doc)
}

/// `{field: value}` semantics: scalar equality or array membership.
fn matches(doc: &Document, filter: &FieldFilter) -> bool {
    let (field, value) = match filter {
        FieldFilter::Equals { field, value } | FieldFilter::Contains { field, value } => {
            (field, value)
        }
    };
    match doc.get(field) {
        Some(Bson::String(s)) => s == value,
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Bson::String(s) if s == value)),
        _ => false,
    }
}

/// Cross-type rank following MongoDB's comparison order for the types this
/// service stores. Missing and null sort lowest.
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::ObjectId(_)) => 5,
        Some(Bson::Boolean(_)) => 6,
        Some(Bson::DateTime(_)) => 7,
        Some(_) => 8,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let by_rank = type_rank(a).cmp(&type_rank(b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }
    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => x.cmp(y),
        (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.cmp(y),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (as_f64(x), as_f64(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String, AppError> {
        let (id, doc) = with_id(doc);
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(id)
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize, AppError> {
        let count = docs.len();
        let mut collections = self.lock()?;
        let stored = collections.entry(collection.to_string()).or_default();
        stored.extend(docs.into_iter().map(|doc| with_id(doc).1));
        Ok(count)
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, AppError> {
        let collections = self.lock()?;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| query.filter.as_ref().is_none_or(|f| matches(doc, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        if let Some((field, direction)) = &query.sort {
            found.sort_by(|a, b| {
                let ordering = compare(a.get(field), b.get(field));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.effective_limit() {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn is_empty(&self, collection: &str) -> Result<bool, AppError> {
        Ok(self
            .lock()?
            .get(collection)
            .is_none_or(|docs| docs.is_empty()))
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        let mut names: Vec<String> = self.lock()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
