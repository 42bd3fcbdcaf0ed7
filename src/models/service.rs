use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::entity::{EntityKind, Schema};
use crate::models::validation::{Choice, FieldReader, Rule, ValidationErrors};

/// The two lines of business a service can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceCategory {
    #[serde(rename = "IT")]
    It,
    Satcom,
}

impl ServiceCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceCategory::It => "IT",
            ServiceCategory::Satcom => "Satcom",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Choice for ServiceCategory {
    const ALLOWED: &'static [&'static str] = &["IT", "Satcom"];

    /// Exact, case-sensitive match.
    fn parse(value: &str) -> Option<Self> {
        match value {
            "IT" => Some(ServiceCategory::It),
            "Satcom" => Some(ServiceCategory::Satcom),
            _ => None,
        }
    }
}

/// A service offering shown on the marketing site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub title: String,
    pub category: ServiceCategory,
    /// Short description.
    pub description: String,
    /// Key features, in display order.
    pub features: Vec<String>,
    /// Icon name for the UI (lucide icon key).
    pub icon: Option<String>,
}

impl Schema for Service {
    const KIND: EntityKind = EntityKind::Service;

    fn from_raw(raw: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new(raw);
        let title = fields.required_str("title");
        let category = fields.required_choice::<ServiceCategory>("category");
        let description = fields.required_str("description");
        let features = fields.string_list("features");
        let icon = fields.optional_str("icon");
        fields.finish()?;

        let category = category.ok_or_else(|| {
            ValidationErrors::single("category", Rule::Required, "field required")
        })?;

        Ok(Service {
            title,
            category,
            description,
            features,
            icon,
        })
    }
}
