use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::db::repository::Repository;
use crate::error::AppError;
use crate::models::service::{Service, ServiceCategory};

/// Response for `POST /seed/services`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResponse {
    pub seeded: bool,
    /// Number of services inserted; only present when seeding happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn service(
    title: &str,
    category: ServiceCategory,
    description: &str,
    features: [&str; 3],
    icon: &str,
) -> Service {
    Service {
        title: title.to_string(),
        category,
        description: description.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
        icon: Some(icon.to_string()),
    }
}

/// The starter catalogue: two IT and two Satcom offerings.
pub fn default_services() -> Vec<Service> {
    vec![
        service(
            "Managed IT Services",
            ServiceCategory::It,
            "End-to-end monitoring, patching, and support for your infrastructure.",
            ["24/7 monitoring", "Proactive patching", "SLA-backed support"],
            "Server",
        ),
        service(
            "Cloud Migration",
            ServiceCategory::It,
            "Plan, migrate, and optimize workloads across AWS/Azure/GCP.",
            ["Assessment", "Lift-and-shift", "Cost optimization"],
            "Cloud",
        ),
        service(
            "VSAT Deployment",
            ServiceCategory::Satcom,
            "Reliable satellite internet for remote sites and maritime.",
            ["Ku/Ka-band", "Global coverage", "Managed service"],
            "SatelliteDish",
        ),
        service(
            "Emergency Connectivity",
            ServiceCategory::Satcom,
            "Rapid-deploy terminals for disaster recovery and field ops.",
            ["Portable terminals", "Rapid setup", "Secure links"],
            "Radio",
        ),
    ]
}

/// Seed the default services unless the collection already has any.
pub async fn process_seed_services(repo: &Repository) -> Result<SeedResponse, AppError> {
    let outcome = repo.seed_if_empty(&default_services()).await?;

    Ok(if outcome.seeded {
        SeedResponse {
            seeded: true,
            count: Some(outcome.count),
            message: None,
        }
    } else {
        SeedResponse {
            seeded: false,
            count: None,
            message: Some("Services already exist".to_string()),
        }
    })
}

/// Axum handler for `POST /seed/services`.
pub async fn seed_services_handler(
    State(state): State<AppState>,
) -> Result<Json<SeedResponse>, AppError> {
    Ok(Json(process_seed_services(&state.repo).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryDocumentStore;
    use crate::db::store::FindQuery;
    use std::sync::Arc;

    #[test]
    fn test_default_catalogue() {
        let services = default_services();
        assert_eq!(services.len(), 4);
        let it = services
            .iter()
            .filter(|s| s.category == ServiceCategory::It)
            .count();
        assert_eq!(it, 2);
        assert!(services.iter().all(|s| s.features.len() == 3 && s.icon.is_some()));
    }

    #[tokio::test]
    async fn test_seed_twice() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repo = Repository::connected(store.clone());

        let first = process_seed_services(&repo).await.unwrap();
        assert!(first.seeded);
        assert_eq!(first.count, Some(4));

        let second = process_seed_services(&repo).await.unwrap();
        assert!(!second.seeded);
        assert_eq!(second.message.as_deref(), Some("Services already exist"));
        assert_eq!(store.dump("service").len(), 4);

        let listed: Vec<Service> = repo.find(&FindQuery::all()).await.unwrap();
        assert_eq!(listed, default_services());
    }

    #[test]
    fn test_response_omits_absent_fields() {
        let json = serde_json::to_value(SeedResponse {
            seeded: true,
            count: Some(4),
            message: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "seeded": true, "count": 4 }));
    }
}
