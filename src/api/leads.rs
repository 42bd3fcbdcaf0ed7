use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;
use crate::db::repository::Repository;
use crate::error::AppError;
use crate::models::entity::Schema;
use crate::models::lead::Lead;

/// The response from a successful lead submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadReceipt {
    /// Identifier of the stored lead.
    pub id: String,
    /// Always `"received"`.
    pub status: String,
}

/// Core lead submission logic — separated from the HTTP layer for testability.
///
/// Validates the raw payload first, so a malformed lead is rejected with
/// field-level detail even when storage is down. Nothing is written unless
/// validation passes.
pub async fn process_create_lead(repo: &Repository, raw: &Value) -> Result<LeadReceipt, AppError> {
    let lead = Lead::from_raw(raw)?;
    let id = repo.insert(&lead).await?;

    tracing::info!("Lead {} received (source: {})", id, lead.source);

    Ok(LeadReceipt {
        id,
        status: "received".to_string(),
    })
}

/// Axum handler for `POST /api/leads`.
pub async fn create_lead_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LeadReceipt>, AppError> {
    let Json(raw) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let receipt = process_create_lead(&state.repo, &raw).await?;
    Ok(Json(receipt))
}
