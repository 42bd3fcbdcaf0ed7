use std::sync::Arc;

use agency_api::app::{build_router, AppState};
use agency_api::config::AppConfig;
use agency_api::db::mongo::MongoDocumentStore;
use agency_api::db::repository::Repository;
use agency_api::db::store::DocumentStore;

/// Open the storage handle if both connection settings are present.
///
/// A bad connection string is logged and the service keeps running with
/// storage reported as unconfigured.
async fn connect_storage(config: &AppConfig) -> Option<Arc<dyn DocumentStore>> {
    let Some((uri, database)) = config.storage_target() else {
        tracing::warn!("DATABASE_URL / DATABASE_NAME not set; running without storage");
        return None;
    };

    match MongoDocumentStore::connect(uri, database).await {
        Ok(store) => {
            tracing::info!("MongoDB client ready for database '{}'", database);
            Some(Arc::new(store))
        }
        Err(e) => {
            tracing::error!("Failed to initialise MongoDB client: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agency_api=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting agency API v{}...", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    let repo = Repository::new(connect_storage(&config).await);
    let addr = config.bind_addr();

    let app = build_router(AppState::new(repo, config));

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
