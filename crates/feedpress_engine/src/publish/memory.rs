use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feedpress_core::PublishableArticle;

use super::{ContentStore, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub article: PublishableArticle,
}

/// In-process store for dry runs and tests. Timestamps come from the local
/// clock at insert time, standing in for server-assigned ones.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<StoredRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn records(&self) -> Vec<StoredRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn stamp(article: &PublishableArticle, now: DateTime<Utc>) -> PublishableArticle {
        PublishableArticle {
            created_at: now,
            updated_at: now,
            published_at: now,
            ..article.clone()
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        Ok(self.lock().iter().any(|record| record.article.slug == slug))
    }

    async fn insert(&self, article: &PublishableArticle) -> Result<String, StoreError> {
        let mut records = self.lock();
        let id = format!("mem-{}", records.len() + 1);
        records.push(StoredRecord {
            id: id.clone(),
            article: Self::stamp(article, Utc::now()),
        });
        Ok(id)
    }
}
