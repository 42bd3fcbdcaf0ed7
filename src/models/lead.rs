use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::entity::{EntityKind, Schema};
use crate::models::validation::{FieldReader, ValidationErrors};

/// Where a lead came from when the client does not say.
pub const DEFAULT_LEAD_SOURCE: &str = "website";

/// A contact/inquiry submission from a prospective customer.
///
/// Stored in the `lead` collection; write-only from the API's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Full name.
    pub name: String,
    /// Contact email address (syntactically validated).
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// Interested service or category.
    pub service_interest: Option<String>,
    pub message: Option<String>,
    /// Where this lead originated. `null` and absent both store the default.
    pub source: String,
}

impl Schema for Lead {
    const KIND: EntityKind = EntityKind::Lead;

    fn from_raw(raw: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new(raw);
        let lead = Lead {
            name: fields.required_str("name"),
            email: fields.required_email("email"),
            phone: fields.optional_str("phone"),
            company: fields.optional_str("company"),
            service_interest: fields.optional_str("service_interest"),
            message: fields.optional_str("message"),
            source: fields
                .optional_str("source")
                .unwrap_or_else(|| DEFAULT_LEAD_SOURCE.to_string()),
        };
        fields.finish()?;
        Ok(lead)
    }
}
