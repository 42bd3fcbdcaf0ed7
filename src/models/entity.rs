use serde::Serialize;
use serde_json::Value;

use crate::models::case_study::CaseStudy;
use crate::models::lead::Lead;
use crate::models::news_item::NewsItem;
use crate::models::service::Service;
use crate::models::validation::ValidationErrors;

/// The four entity kinds, each stored in its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Lead,
    Service,
    CaseStudy,
    NewsItem,
}

impl EntityKind {
    /// Collection name: the lowercased entity name.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Lead => "lead",
            EntityKind::Service => "service",
            EntityKind::CaseStudy => "casestudy",
            EntityKind::NewsItem => "newsitem",
        }
    }
}

/// A typed entity bound to its collection.
///
/// `from_raw` is the only way untyped data becomes an entity, both for
/// request bodies and for documents read back from storage.
pub trait Schema: Serialize + Sized + Send + Sync {
    const KIND: EntityKind;

    fn from_raw(raw: &Value) -> Result<Self, ValidationErrors>;

    /// Encode for storage.
    fn to_document(&self) -> Result<bson::Document, bson::ser::Error> {
        bson::to_document(self)
    }
}

/// Any validated entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Lead(Lead),
    Service(Service),
    CaseStudy(CaseStudy),
    NewsItem(NewsItem),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Lead(_) => EntityKind::Lead,
            Entity::Service(_) => EntityKind::Service,
            Entity::CaseStudy(_) => EntityKind::CaseStudy,
            Entity::NewsItem(_) => EntityKind::NewsItem,
        }
    }
}

/// Validate `raw` against the schema of `kind`, applying defaults.
pub fn validate(raw: &Value, kind: EntityKind) -> Result<Entity, ValidationErrors> {
    Ok(match kind {
        EntityKind::Lead => Entity::Lead(Lead::from_raw(raw)?),
        EntityKind::Service => Entity::Service(Service::from_raw(raw)?),
        EntityKind::CaseStudy => Entity::CaseStudy(CaseStudy::from_raw(raw)?),
        EntityKind::NewsItem => Entity::NewsItem(NewsItem::from_raw(raw)?),
    })
}
