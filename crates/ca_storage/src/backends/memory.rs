use std::sync::Arc;

use async_trait::async_trait;
use ca_core::{Category, Error, NewUpdate, Result, UpdateQuery, UpdateRecord, UpdateStorage};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::StorageBackend;

#[derive(Default)]
struct MemoryStore {
    // insertion order, which is also created_at order
    updates: Vec<UpdateRecord>,
    last_created: Option<DateTime<Utc>>,
}

impl MemoryStore {
    fn exists(&self, link: &str, category: Option<Category>) -> bool {
        self.updates
            .iter()
            .any(|u| u.link == link && category.map_or(true, |c| u.category == c))
    }

    fn insert(&mut self, update: NewUpdate) -> Result<String> {
        if self.exists(&update.link, Some(update.category)) {
            return Err(Error::Duplicate(update.link));
        }

        let now = Utc::now();
        let created_at = match self.last_created {
            Some(last) if last > now => last,
            _ => now,
        };
        let id = Uuid::new_v4().to_string();
        self.updates.push(update.into_record(id.clone(), created_at));
        self.last_created = Some(created_at);
        Ok(id)
    }

    fn query(&self, query: &UpdateQuery) -> Vec<UpdateRecord> {
        self.updates
            .iter()
            .rev()
            .filter(|u| query.matches(u))
            .take(query.effective_limit())
            .cloned()
            .collect()
    }
}

/// Process-local store, used for development and tests.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.updates.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: Option<&str>) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl UpdateStorage for InMemoryStorage {
    async fn exists(&self, link: &str, category: Option<Category>) -> Result<bool> {
        Ok(self.store.read().await.exists(link, category))
    }

    async fn save(&self, update: NewUpdate) -> Result<String> {
        self.store.write().await.insert(update)
    }

    async fn get(&self, id: &str) -> Result<Option<UpdateRecord>> {
        let store = self.store.read().await;
        Ok(store.updates.iter().find(|u| u.id == id).cloned())
    }

    async fn query(&self, query: &UpdateQuery) -> Result<Vec<UpdateRecord>> {
        Ok(self.store.read().await.query(query))
    }
}
