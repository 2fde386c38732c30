use async_trait::async_trait;

use crate::types::{Category, NewUpdate, UpdateRecord};
use crate::Result;

pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// Read filter used by the display layer. Results are always newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateQuery {
    pub category: Option<Category>,
    pub source: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl UpdateQuery {
    pub fn matches(&self, record: &UpdateRecord) -> bool {
        if self.category.is_some_and(|c| c != record.category) {
            return false;
        }
        if self.source.as_deref().is_some_and(|s| s != record.source) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                record.title.to_lowercase().contains(&term)
                    || record.summary.to_lowercase().contains(&term)
                    || record.source.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_QUERY_LIMIT)
    }
}

#[async_trait]
pub trait UpdateStorage: Send + Sync {
    /// True when an update with this exact link is stored, optionally scoped to a category
    async fn exists(&self, link: &str, category: Option<Category>) -> Result<bool>;

    /// Persist an update, assigning its id and timestamps
    async fn save(&self, update: NewUpdate) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Option<UpdateRecord>>;

    async fn query(&self, query: &UpdateQuery) -> Result<Vec<UpdateRecord>>;
}
