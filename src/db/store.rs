use async_trait::async_trait;
use bson::Document;

use crate::error::AppError;

/// Sort direction for [`FindQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// The MongoDB sort specifier (`1` / `-1`).
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// A single-field predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFilter {
    /// `field == value`
    Equals { field: String, value: String },
    /// The list-valued `field` contains `value`.
    Contains { field: String, value: String },
}

impl FieldFilter {
    pub fn equals(field: &str, value: impl Into<String>) -> Self {
        FieldFilter::Equals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn contains(field: &str, value: impl Into<String>) -> Self {
        FieldFilter::Contains {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

/// A filtered, optionally sorted and limited read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    /// `None` matches every document.
    pub filter: Option<FieldFilter>,
    pub sort: Option<(String, SortDirection)>,
    /// `None` or `Some(0)` means no limit.
    pub limit: Option<u32>,
}

impl FindQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Option<FieldFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The effective limit, with `0` normalised to "unlimited".
    pub fn effective_limit(&self) -> Option<u32> {
        self.limit.filter(|n| *n > 0)
    }
}

/// Untyped document storage, keyed by collection name.
///
/// Abstracted as a trait so tests can run against an in-memory store or a
/// mock without a real MongoDB instance. Documents returned by `find` still
/// carry their internal `_id`; stripping it is the repository's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document and return its new identifier as a string.
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String, AppError>;

    /// Insert several documents; returns how many were written.
    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<usize, AppError>;

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, AppError>;

    /// Returns `true` if the collection holds no documents (or does not exist).
    async fn is_empty(&self, collection: &str) -> Result<bool, AppError>;

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError>;
}
