use std::sync::Arc;

use bson::{Bson, Document};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::db::store::{DocumentStore, FindQuery};
use crate::error::AppError;
use crate::models::entity::Schema;

/// At most this many collection names are reported by diagnostics.
pub const MAX_REPORTED_COLLECTIONS: usize = 10;

/// Result of [`Repository::seed_if_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    pub seeded: bool,
    pub count: usize,
}

/// Typed access to the document store.
///
/// Holds the process-wide storage handle, which may be absent when no
/// database is configured. Every operation then fails with
/// [`AppError::StorageUnavailable`] so callers can tell "no data" apart from
/// "no storage".
#[derive(Clone, Default)]
pub struct Repository {
    store: Option<Arc<dyn DocumentStore>>,
}

impl Repository {
    pub fn new(store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self { store }
    }

    pub fn connected(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(Some(store))
    }

    pub fn unconfigured() -> Self {
        Self::new(None)
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&dyn DocumentStore, AppError> {
        self.store.as_deref().ok_or_else(AppError::not_configured)
    }

    /// Insert a validated entity into its collection and return the new id.
    ///
    /// `created_at` and `updated_at` are stamped on the stored document.
    pub async fn insert<E: Schema>(&self, entity: &E) -> Result<String, AppError> {
        let store = self.store()?;
        let doc = stamped(encode(entity)?);
        let collection = E::KIND.collection();
        let id = store.insert_one(collection, doc).await.inspect_err(|e| {
            tracing::warn!("Insert into '{}' failed: {}", collection, e);
        })?;
        tracing::debug!("Inserted document {} into '{}'", id, collection);
        Ok(id)
    }

    /// Run `query` against the entity's collection.
    ///
    /// Internal identifiers are stripped and each document is re-validated
    /// against the entity schema; a stored document that no longer fits the
    /// schema fails the whole read.
    pub async fn find<E: Schema>(&self, query: &FindQuery) -> Result<Vec<E>, AppError> {
        let store = self.store()?;
        let collection = E::KIND.collection();
        let documents = store.find(collection, query).await.inspect_err(|e| {
            tracing::warn!("Query on '{}' failed: {}", collection, e);
        })?;

        documents
            .into_iter()
            .map(|doc| decode::<E>(collection, doc))
            .collect()
    }

    /// Insert `defaults` only if the collection holds no documents.
    ///
    /// The emptiness check and the insert are separate round-trips, so two
    /// concurrent callers may both seed.
    pub async fn seed_if_empty<E: Schema>(&self, defaults: &[E]) -> Result<SeedOutcome, AppError> {
        let store = self.store()?;
        let collection = E::KIND.collection();

        if !store.is_empty(collection).await? {
            tracing::info!("Collection '{}' already populated, skipping seed", collection);
            return Ok(SeedOutcome {
                seeded: false,
                count: 0,
            });
        }

        let docs = defaults
            .iter()
            .map(|entity| encode(entity).map(stamped))
            .collect::<Result<Vec<_>, _>>()?;
        let count = store.insert_many(collection, docs).await?;
        tracing::info!("Seeded {} documents into '{}'", count, collection);

        Ok(SeedOutcome {
            seeded: true,
            count,
        })
    }

    /// Known collection names, capped at [`MAX_REPORTED_COLLECTIONS`].
    pub async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        let mut names = self.store()?.list_collection_names().await?;
        names.truncate(MAX_REPORTED_COLLECTIONS);
        Ok(names)
    }
}

fn encode<E: Schema>(entity: &E) -> Result<Document, AppError> {
    entity.to_document().map_err(|e| {
        AppError::Internal(format!(
            "Failed to encode {} document: {}",
            E::KIND.collection(),
            e
        ))
    })
}

fn stamped(mut doc: Document) -> Document {
    let now = Bson::DateTime(bson::DateTime::from_chrono(Utc::now()));
    doc.insert("created_at", now.clone());
    doc.insert("updated_at", now);
    doc
}

fn decode<E: Schema>(collection: &str, mut doc: Document) -> Result<E, AppError> {
    doc.remove("_id");
    E::from_raw(&document_to_json(doc)).map_err(|e| {
        tracing::error!("Stored '{}' document does not match schema: {}", collection, e);
        AppError::Internal(format!("Stored {} document is invalid", collection))
    })
}

/// Plain JSON view of a stored document: datetimes become RFC 3339 strings
/// and object ids become hex strings.
pub fn document_to_json(doc: Document) -> Value {
    Value::Object(
        doc.into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect(),
    )
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::DateTime(dt) => {
            Value::String(dt.to_chrono().to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryDocumentStore;
    use crate::db::store::{FieldFilter, MockDocumentStore};
    use crate::models::case_study::CaseStudy;
    use crate::models::lead::Lead;
    use crate::models::service::{Service, ServiceCategory};
    use bson::doc;

    fn lead() -> Lead {
        Lead {
            name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            phone: None,
            company: Some("Navy".into()),
            service_interest: None,
            message: None,
            source: "website".into(),
        }
    }

    fn service(title: &str, category: ServiceCategory) -> Service {
        Service {
            title: title.into(),
            category,
            description: "d".into(),
            features: vec![],
            icon: None,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_repository_rejects_everything() {
        let repo = Repository::unconfigured();
        assert!(!repo.is_configured());

        let err = repo.insert(&lead()).await.unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
        let err = repo.find::<Service>(&FindQuery::all()).await.unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
        let err = repo.seed_if_empty::<Service>(&[]).await.unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
        let err = repo.list_collection_names().await.unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_insert_stamps_timestamps() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repo = Repository::connected(store.clone());

        let id = repo.insert(&lead()).await.unwrap();
        assert!(!id.is_empty());

        let stored = store.dump("lead");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].get_str("email").unwrap(), "grace@example.com");
        assert!(stored[0].get_datetime("created_at").is_ok());
        assert!(stored[0].get_datetime("updated_at").is_ok());
    }

    #[tokio::test]
    async fn test_find_strips_internal_fields() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repo = Repository::connected(store.clone());
        repo.insert(&service("Cloud Migration", ServiceCategory::It))
            .await
            .unwrap();

        let found: Vec<Service> = repo.find(&FindQuery::all()).await.unwrap();
        assert_eq!(found.len(), 1);
        let json = serde_json::to_value(&found[0]).unwrap();
        assert!(json.get("_id").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["title"], "Cloud Migration");
    }

    #[tokio::test]
    async fn test_find_rejects_document_that_breaks_schema() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .insert_one("service", doc! { "title": "Broken", "category": "Design", "description": "d" })
            .await
            .unwrap();
        let repo = Repository::connected(store);

        let err = repo.find::<Service>(&FindQuery::all()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_seed_if_empty_is_idempotent() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repo = Repository::connected(store.clone());
        let defaults = vec![
            service("a", ServiceCategory::It),
            service("b", ServiceCategory::Satcom),
        ];

        let first = repo.seed_if_empty(&defaults).await.unwrap();
        assert_eq!(first, SeedOutcome { seeded: true, count: 2 });

        let second = repo.seed_if_empty(&defaults).await.unwrap();
        assert_eq!(second, SeedOutcome { seeded: false, count: 0 });
        assert_eq!(store.dump("service").len(), 2);
    }

    #[tokio::test]
    async fn test_membership_query_through_repository() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .insert_one(
                "casestudy",
                doc! { "title": "t", "client": "c", "summary": "s", "tags": ["X", "Y"] },
            )
            .await
            .unwrap();
        let repo = Repository::connected(store);

        let query = FindQuery::all().filter(Some(FieldFilter::contains("tags", "Y")));
        let found: Vec<CaseStudy> = repo.find(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tags, vec!["X", "Y"]);
    }

    #[tokio::test]
    async fn test_collection_names_capped() {
        let mut mock = MockDocumentStore::new();
        mock.expect_list_collection_names()
            .returning(|| Ok((0..15).map(|i| format!("c{i}")).collect()));
        let repo = Repository::connected(Arc::new(mock));

        let names = repo.list_collection_names().await.unwrap();
        assert_eq!(names.len(), MAX_REPORTED_COLLECTIONS);
        assert_eq!(names[0], "c0");
    }

    #[tokio::test]
    async fn test_storage_failure_propagates_from_find() {
        let mut mock = MockDocumentStore::new();
        mock.expect_find()
            .returning(|_, _| Err(AppError::Database("connection reset".into())));
        let repo = Repository::connected(Arc::new(mock));

        let err = repo.find::<Service>(&FindQuery::all()).await.unwrap_err();
        assert!(matches!(err, AppError::Database(msg) if msg == "connection reset"));
    }

    #[test]
    fn test_datetime_rendered_as_rfc3339() {
        let dt = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 6, 1, 12, 0, 0).unwrap();
        let json = document_to_json(doc! { "at": bson::DateTime::from_chrono(dt) });
        assert_eq!(json["at"], "2024-06-01T12:00:00.000Z");
    }
}
