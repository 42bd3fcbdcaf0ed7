use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::entity::{EntityKind, Schema};
use crate::models::validation::{FieldReader, ValidationErrors};

/// A portfolio entry. Populated externally; this service only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub title: String,
    pub client: String,
    /// Industry/vertical.
    pub industry: Option<String>,
    /// Short summary of the engagement.
    pub summary: String,
    /// Measurable outcomes.
    pub results: Vec<String>,
    /// Tags used by the `tag` membership filter.
    pub tags: Vec<String>,
    /// Hero/cover image URL.
    pub featured_image: Option<String>,
}

impl Schema for CaseStudy {
    const KIND: EntityKind = EntityKind::CaseStudy;

    fn from_raw(raw: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new(raw);
        let case_study = CaseStudy {
            title: fields.required_str("title"),
            client: fields.required_str("client"),
            industry: fields.optional_str("industry"),
            summary: fields.required_str("summary"),
            results: fields.string_list("results"),
            tags: fields.string_list("tags"),
            featured_image: fields.optional_str("featured_image"),
        };
        fields.finish()?;
        Ok(case_study)
    }
}
