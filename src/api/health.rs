use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::config::AppConfig;
use crate::db::repository::Repository;
use crate::error::truncate_detail;

pub const SERVICE_NAME: &str = "Marketing & Satcom Agency API";

const DIAGNOSTIC_DETAIL: usize = 80;

/// Response for `GET /test`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub collections: Vec<String>,
}

/// Build the diagnostic report. Never fails: storage problems are folded
/// into the status strings.
pub async fn process_diagnostics(repo: &Repository, config: &AppConfig) -> DiagnosticReport {
    let mut report = DiagnosticReport {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: "❌ Not Set".to_string(),
        database_name: "❌ Not Set".to_string(),
        collections: Vec::new(),
    };

    if !repo.is_configured() {
        return report;
    }

    report.database = "✅ Connected".to_string();
    report.database_url = if config.database_url().is_some() {
        "✅ Set".to_string()
    } else {
        "❌ Not Set".to_string()
    };
    report.database_name = config.database_name().unwrap_or("Unknown").to_string();

    match repo.list_collection_names().await {
        Ok(names) => report.collections = names,
        Err(e) => {
            tracing::warn!("Diagnostics could not list collections: {}", e);
            report.database = format!(
                "⚠️ Connected but error listing collections: {}",
                truncate_detail(&e.message(), DIAGNOSTIC_DETAIL)
            );
        }
    }

    report
}

/// Axum handler for `GET /`.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "message": "Backend running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Axum handler for `GET /api/hello`.
pub async fn hello_handler() -> Json<Value> {
    Json(json!({ "message": "Hello from the backend API!" }))
}

/// Axum handler for `GET /test`.
pub async fn diagnostics_handler(State(state): State<AppState>) -> Json<DiagnosticReport> {
    Json(process_diagnostics(&state.repo, &state.config).await)
}
