use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::AppConfig;
use crate::db::repository::Repository;

/// Shared application state passed to every handler.
///
/// The repository wraps the single storage handle created at startup; it is
/// never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: Repository, config: AppConfig) -> Self {
        Self { repo, config }
    }
}

/// Wide-open CORS with credentials.
///
/// Wildcards cannot be combined with credentials, so the request's own
/// origin, method and headers are mirrored back instead.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build the full router with middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::health::root_handler))
        .route("/test", get(api::health::diagnostics_handler))
        .route("/api/hello", get(api::health::hello_handler))
        .route("/seed/services", post(api::seed::seed_services_handler))
        .route("/api/leads", post(api::leads::create_lead_handler))
        .route("/api/services", get(api::content::list_services_handler))
        .route("/api/news", get(api::content::list_news_handler))
        .route(
            "/api/case-studies",
            get(api::content::list_case_studies_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}
