use bson::Bson;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::entity::{EntityKind, Schema};
use crate::models::validation::{FieldReader, ValidationErrors};

/// A short company news highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    /// Link for more details.
    pub url: Option<String>,
    /// Publish timestamp; defaults to the moment of validation.
    pub published_at: DateTime<Utc>,
}

impl Schema for NewsItem {
    const KIND: EntityKind = EntityKind::NewsItem;

    fn from_raw(raw: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new(raw);
        let title = fields.required_str("title");
        let summary = fields.required_str("summary");
        let url = fields.optional_str("url");
        let published_at = fields.timestamp("published_at").unwrap_or_else(Utc::now);
        fields.finish()?;
        Ok(NewsItem {
            title,
            summary,
            url,
            published_at,
        })
    }

    /// `published_at` is stored as a BSON datetime so that sorting in the
    /// database is chronological rather than lexical.
    fn to_document(&self) -> Result<bson::Document, bson::ser::Error> {
        let mut doc = bson::to_document(self)?;
        doc.insert(
            "published_at",
            Bson::DateTime(bson::DateTime::from_chrono(self.published_at)),
        );
        Ok(doc)
    }
}
