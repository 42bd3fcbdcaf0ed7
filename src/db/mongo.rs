use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::options::FindOptions;

use crate::db::store::{DocumentStore, FieldFilter, FindQuery};
use crate::error::AppError;

/// MongoDB implementation of the DocumentStore.
pub struct MongoDocumentStore {
    db: mongodb::Database,
}

impl MongoDocumentStore {
    pub fn new(db: mongodb::Database) -> Self {
        Self { db }
    }

    /// Build a client for `uri` and bind it to `database`.
    ///
    /// The driver connects lazily, so an unreachable server surfaces on the
    /// first operation rather than here.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        let client = mongodb::Client::with_uri_str(uri).await?;
        Ok(Self::new(client.database(database)))
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

/// Equality and membership share one MongoDB form: `{field: value}` matches
/// a scalar equal to `value` or an array containing it.
fn filter_document(filter: Option<&FieldFilter>) -> Document {
    match filter {
        None => Document::new(),
        Some(FieldFilter::Equals { field, value }) | Some(FieldFilter::Contains { field, value }) => {
            doc! { field.as_str(): value.as_str() }
        }
    }
}

fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String, AppError> {
        let result = self.collection(collection).insert_one(doc).await?;
        Ok(id_to_string(&result.inserted_id))
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize, AppError> {
        if docs.is_empty() {
            return Ok(0);
        }
        let result = self.collection(collection).insert_many(docs).await?;
        Ok(result.inserted_ids.len())
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, AppError> {
        let mut options = FindOptions::default();
        if let Some((field, direction)) = &query.sort {
            options.sort = Some(doc! { field.as_str(): direction.as_i32() });
        }
        options.limit = query.effective_limit().map(i64::from);

        let cursor = self
            .collection(collection)
            .find(filter_document(query.filter.as_ref()))
            .with_options(options)
            .await?;

        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn is_empty(&self, collection: &str) -> Result<bool, AppError> {
        let first = self.collection(collection).find_one(doc! {}).await?;
        Ok(first.is_none())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self.db.list_collection_names().await?)
    }
}
