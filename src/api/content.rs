use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::db::repository::Repository;
use crate::db::store::{FieldFilter, FindQuery, SortDirection};
use crate::error::AppError;
use crate::models::case_study::CaseStudy;
use crate::models::news_item::NewsItem;
use crate::models::service::Service;

/// Default number of news items and case studies per listing.
pub const DEFAULT_LIST_LIMIT: u32 = 6;

/// Query parameters for `GET /api/services`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceQuery {
    pub category: Option<String>,
}

/// Query parameters for `GET /api/news`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsQuery {
    pub limit: Option<u32>,
}

/// Query parameters for `GET /api/case-studies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseStudyQuery {
    pub tag: Option<String>,
    pub limit: Option<u32>,
}

/// An empty query value means "no filter".
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Services, optionally restricted to one category. Unlimited, in storage order.
pub async fn process_list_services(
    repo: &Repository,
    params: ServiceQuery,
) -> Result<Vec<Service>, AppError> {
    let filter = present(params.category).map(|c| FieldFilter::equals("category", c));
    repo.find(&FindQuery::all().filter(filter)).await
}

/// Most recent news first.
pub async fn process_list_news(
    repo: &Repository,
    params: NewsQuery,
) -> Result<Vec<NewsItem>, AppError> {
    let query = FindQuery::all()
        .sort("published_at", SortDirection::Descending)
        .limit(params.limit.unwrap_or(DEFAULT_LIST_LIMIT));
    repo.find(&query).await
}

/// Most recently created case studies first, optionally restricted to a tag.
pub async fn process_list_case_studies(
    repo: &Repository,
    params: CaseStudyQuery,
) -> Result<Vec<CaseStudy>, AppError> {
    let query = FindQuery::all()
        .filter(present(params.tag).map(|t| FieldFilter::contains("tags", t)))
        .sort("created_at", SortDirection::Descending)
        .limit(params.limit.unwrap_or(DEFAULT_LIST_LIMIT));
    repo.find(&query).await
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|Query(inner)| inner)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Axum handler for `GET /api/services`.
pub async fn list_services_handler(
    State(state): State<AppState>,
    params: Result<Query<ServiceQuery>, QueryRejection>,
) -> Result<Json<Vec<Service>>, AppError> {
    let services = process_list_services(&state.repo, query_params(params)?).await?;
    Ok(Json(services))
}

/// Axum handler for `GET /api/news`.
pub async fn list_news_handler(
    State(state): State<AppState>,
    params: Result<Query<NewsQuery>, QueryRejection>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    let news = process_list_news(&state.repo, query_params(params)?).await?;
    Ok(Json(news))
}

/// Axum handler for `GET /api/case-studies`.
pub async fn list_case_studies_handler(
    State(state): State<AppState>,
    params: Result<Query<CaseStudyQuery>, QueryRejection>,
) -> Result<Json<Vec<CaseStudy>>, AppError> {
    let case_studies = process_list_case_studies(&state.repo, query_params(params)?).await?;
    Ok(Json(case_studies))
}
