//! Content store boundary and the slug-checked publisher.
mod firestore;
mod memory;

use async_trait::async_trait;
use feedpress_core::PublishableArticle;
use feedpress_logging::{press_debug, press_info};
use thiserror::Error;

pub use firestore::{FirestoreSettings, FirestoreStore, DEFAULT_FIRESTORE_API_BASE};
pub use memory::{MemoryStore, StoredRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Network(String),
    #[error("store rejected request with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected store response: {0}")]
    Response(String),
}

/// A document collection keyed by slug.
#[async_trait]
pub trait ContentStore: Send + Sync {
    fn name(&self) -> &str;

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError>;

    /// Insert a new record. The store assigns `createdAt`, `updatedAt` and
    /// `publishedAt`. Returns the document id.
    async fn insert(&self, article: &PublishableArticle) -> Result<String, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { document_id: String },
    DuplicateSlug,
}

/// Writes finished articles, refusing slugs the store already holds.
///
/// Check-then-insert is not atomic; a single publishing process is assumed.
pub struct Publisher {
    store: Box<dyn ContentStore>,
}

impl Publisher {
    pub fn new(store: Box<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub async fn publish(&self, article: &PublishableArticle) -> Result<PublishOutcome, StoreError> {
        if self.store.slug_exists(&article.slug).await? {
            press_debug!("Slug {} already stored in {}", article.slug, self.store.name());
            return Ok(PublishOutcome::DuplicateSlug);
        }
        let document_id = self.store.insert(article).await?;
        press_info!("Stored {} as {document_id}", article.slug);
        Ok(PublishOutcome::Published { document_id })
    }
}
