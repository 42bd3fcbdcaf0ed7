#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use bson::{doc, Document};
use chrono::{DateTime, Utc};

use agency_api::app::{build_router, AppState};
use agency_api::config::AppConfig;
use agency_api::db::memory::InMemoryDocumentStore;
use agency_api::db::repository::Repository;
use agency_api::db::store::DocumentStore;

/// Holds the in-memory store and the Axum router wired to it.
///
/// The store is exposed so tests can pre-populate collections the API only
/// reads, and inspect what the API wrote.
pub struct TestEnv {
    pub store: Arc<InMemoryDocumentStore>,
    pub router: Router,
}

impl TestEnv {
    /// Build a router backed by a fresh, empty in-memory store.
    pub fn start() -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let config = AppConfig {
            database_url: Some("mongodb://in-memory".to_string()),
            database_name: Some("agency_test".to_string()),
            ..AppConfig::default()
        };
        let state = AppState::new(Repository::connected(store.clone()), config);

        Self {
            store,
            router: build_router(state),
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }

    /// Helper: insert a raw document as an external process would.
    pub async fn put(&self, collection: &str, doc: Document) {
        self.store
            .insert_one(collection, doc)
            .await
            .expect("Failed to insert fixture");
    }

    /// Helper: insert a news item published at `at`.
    pub async fn put_news(&self, title: &str, at: DateTime<Utc>) {
        self.put(
            "newsitem",
            doc! {
                "title": title,
                "summary": format!("{title} summary"),
                "published_at": bson::DateTime::from_chrono(at),
            },
        )
        .await;
    }

    /// Helper: insert a case study with the given tags, created at `at`.
    pub async fn put_case_study(&self, title: &str, tags: &[&str], at: DateTime<Utc>) {
        self.put(
            "casestudy",
            doc! {
                "title": title,
                "client": "ACME Shipping",
                "summary": "Fleet connectivity",
                "tags": tags.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
                "created_at": bson::DateTime::from_chrono(at),
            },
        )
        .await;
    }
}

/// Build a `TestServer` with no storage configured.
pub fn server_without_storage() -> axum_test::TestServer {
    let state = AppState::new(Repository::unconfigured(), AppConfig::default());

    axum_test::TestServer::builder()
        .build(build_router(state))
}
