//! Exercises `MongoDocumentStore` against a real MongoDB.
//!
//! Needs a Docker daemon: `cargo test -- --ignored`.

use std::sync::Arc;

use bson::doc;
use chrono::{Duration, TimeZone, Utc};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use agency_api::api::seed::process_seed_services;
use agency_api::db::mongo::MongoDocumentStore;
use agency_api::db::repository::Repository;
use agency_api::db::store::{DocumentStore, FieldFilter, FindQuery, SortDirection};
use agency_api::models::lead::Lead;
use agency_api::models::news_item::NewsItem;
use agency_api::models::service::Service;

async fn start_mongo() -> (ContainerAsync<Mongo>, Arc<MongoDocumentStore>) {
    let container = Mongo::default()
        .start()
        .await
        .expect("Failed to start MongoDB container");
    let port = container
        .get_host_port_ipv4(27017)
        .await
        .expect("Failed to get MongoDB port");
    let store = MongoDocumentStore::connect(&format!("mongodb://127.0.0.1:{port}"), "agency_test")
        .await
        .expect("Failed to connect to MongoDB");
    (container, Arc::new(store))
}

#[tokio::test]
#[ignore = "requires docker"]
async fn mongo_insert_and_filter() {
    let (_mongo, store) = start_mongo().await;

    let id = store
        .insert_one("casestudy", doc! { "title": "xy", "tags": ["X", "Y"] })
        .await
        .unwrap();
    assert_eq!(id.len(), 24);

    for (tag, expected) in [("X", 1), ("Y", 1), ("Z", 0)] {
        let query = FindQuery::all().filter(Some(FieldFilter::contains("tags", tag)));
        let found = store.find("casestudy", &query).await.unwrap();
        assert_eq!(found.len(), expected, "tag {tag}");
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn mongo_sort_and_limit() {
    let (_mongo, store) = start_mongo().await;
    let repo = Repository::connected(store.clone());

    let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    for (title, at) in [("T2", t1 + Duration::days(1)), ("T1", t1), ("T3", t1 + Duration::days(2))] {
        repo.insert(&NewsItem {
            title: title.to_string(),
            summary: "s".to_string(),
            url: None,
            published_at: at,
        })
        .await
        .unwrap();
    }

    let query = FindQuery::all()
        .sort("published_at", SortDirection::Descending)
        .limit(2);
    let news: Vec<NewsItem> = repo.find(&query).await.unwrap();
    let titles: Vec<&str> = news.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["T3", "T2"]);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn mongo_seed_is_idempotent() {
    let (_mongo, store) = start_mongo().await;
    let repo = Repository::connected(store.clone());

    assert!(process_seed_services(&repo).await.unwrap().seeded);
    assert!(!process_seed_services(&repo).await.unwrap().seeded);

    let services: Vec<Service> = repo.find(&FindQuery::all()).await.unwrap();
    assert_eq!(services.len(), 4);

    let names = repo.list_collection_names().await.unwrap();
    assert_eq!(names, vec!["service".to_string()]);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn mongo_lead_round_trip() {
    let (_mongo, store) = start_mongo().await;
    let repo = Repository::connected(store.clone());

    let lead = Lead {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        phone: None,
        company: None,
        service_interest: None,
        message: None,
        source: "website".to_string(),
    };
    let id = repo.insert(&lead).await.unwrap();

    let stored = store.find("lead", &FindQuery::all()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get_object_id("_id").unwrap().to_hex(), id);
    assert_eq!(stored[0].get_str("source").unwrap(), "website");
}
