use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use feedpress_core::{ArticleStatus, PublishableArticle};
use feedpress_engine::publish::{
    ContentStore, FirestoreSettings, FirestoreStore, MemoryStore, PublishOutcome, Publisher,
    StoreError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article(slug: &str, source_url: &str) -> PublishableArticle {
    let at = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    PublishableArticle {
        title: "New T".to_string(),
        slug: slug.to_string(),
        excerpt: "E".to_string(),
        content: "<p>X</p>".to_string(),
        category: "tech".to_string(),
        tags: vec!["a".to_string(), "b".to_string()],
        thumbnail: "https://img.example/1.jpg".to_string(),
        source_url: source_url.to_string(),
        source_name: "Src".to_string(),
        author: "Editorial Desk".to_string(),
        status: ArticleStatus::Published,
        created_at: at,
        updated_at: at,
        published_at: at,
        views: 0,
    }
}

/// Lets a test keep a handle on the store it hands to the publisher.
struct Shared(Arc<MemoryStore>);

#[async_trait]
impl ContentStore for Shared {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        self.0.slug_exists(slug).await
    }

    async fn insert(&self, article: &PublishableArticle) -> Result<String, StoreError> {
        self.0.insert(article).await
    }
}

#[tokio::test]
async fn same_slug_is_stored_once() {
    let store = Arc::new(MemoryStore::new());
    let publisher = Publisher::new(Box::new(Shared(store.clone())));

    let first = publisher
        .publish(&article("new-t", "https://src/a1"))
        .await
        .unwrap();
    let second = publisher
        .publish(&article("new-t", "https://src/a2"))
        .await
        .unwrap();

    assert_eq!(
        first,
        PublishOutcome::Published {
            document_id: "mem-1".to_string()
        }
    );
    assert_eq!(second, PublishOutcome::DuplicateSlug);
    assert_eq!(store.len(), 1);
    assert_eq!(store.records()[0].article.source_url, "https://src/a1");
}

#[tokio::test]
async fn memory_store_assigns_timestamps() {
    let store = MemoryStore::new();
    let before = Utc::now();
    store.insert(&article("s", "https://src/a1")).await.unwrap();

    let record = &store.records()[0];
    assert!(record.article.created_at >= before);
    assert_eq!(record.article.created_at, record.article.published_at);
    assert_eq!(record.article.created_at, record.article.updated_at);
}

const DOCS: &str = "/v1/projects/demo/databases/(default)/documents";

fn firestore(server: &MockServer) -> FirestoreStore {
    FirestoreStore::new(FirestoreSettings {
        api_base: server.uri(),
        ..FirestoreSettings::new("demo", "token-1")
    })
    .unwrap()
}

#[tokio::test]
async fn firestore_reports_existing_slug() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(header("authorization", "Bearer token-1"))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "from": [{ "collectionId": "articles" }],
                "where": { "fieldFilter": {
                    "field": { "fieldPath": "slug" },
                    "op": "EQUAL",
                    "value": { "stringValue": "new-t" }
                } },
                "limit": 1
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "document": { "name": "projects/demo/databases/(default)/documents/articles/x" },
              "readTime": "2026-01-01T00:00:00Z" }
        ])))
        .mount(&server)
        .await;

    assert!(firestore(&server).slug_exists("new-t").await.unwrap());
}

#[tokio::test]
async fn firestore_empty_query_means_free_slug() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "readTime": "2026-01-01T00:00:00Z" }])),
        )
        .mount(&server)
        .await;

    assert!(!firestore(&server).slug_exists("free").await.unwrap());
}

#[tokio::test]
async fn firestore_commit_uses_server_timestamps() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:commit")))
        .and(body_partial_json(json!({
            "writes": [{
                "update": { "fields": {
                    "slug": { "stringValue": "new-t" },
                    "sourceUrl": { "stringValue": "https://src/a1" },
                    "status": { "stringValue": "published" },
                    "views": { "integerValue": "0" },
                    "tags": { "arrayValue": { "values": [
                        { "stringValue": "a" }, { "stringValue": "b" }
                    ] } }
                } },
                "currentDocument": { "exists": false },
                "updateTransforms": [
                    { "fieldPath": "createdAt", "setToServerValue": "REQUEST_TIME" },
                    { "fieldPath": "updatedAt", "setToServerValue": "REQUEST_TIME" },
                    { "fieldPath": "publishedAt", "setToServerValue": "REQUEST_TIME" }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commitTime": "2026-01-01T00:00:00Z" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = firestore(&server)
        .insert(&article("new-t", "https://src/a1"))
        .await
        .unwrap();
    assert_eq!(id, feedpress_core::Fingerprint::of_link("https://src/a1").to_string());
}

#[tokio::test]
async fn firestore_errors_surface_as_store_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let publisher = Publisher::new(Box::new(firestore(&server)));
    let err = publisher
        .publish(&article("new-t", "https://src/a1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 503, .. }));
}
