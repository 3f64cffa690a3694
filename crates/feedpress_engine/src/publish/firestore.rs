use std::time::Duration;

use async_trait::async_trait;
use feedpress_core::{Fingerprint, PublishableArticle};
use feedpress_logging::press_debug;
use serde_json::{json, Map, Value};

use super::{ContentStore, StoreError};

pub const DEFAULT_FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com";

/// Fields the server fills in with its own commit time.
const SERVER_TIMESTAMP_FIELDS: [&str; 3] = ["createdAt", "updatedAt", "publishedAt"];

#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    pub api_base: String,
    pub project_id: String,
    /// OAuth bearer token; an empty token sends no Authorization header.
    pub access_token: String,
    pub collection: String,
    pub request_timeout: Duration,
}

impl FirestoreSettings {
    pub fn new(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_FIRESTORE_API_BASE.to_string(),
            project_id: project_id.into(),
            access_token: access_token.into(),
            collection: "articles".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1/{}:{method}",
            self.api_base.trim_end_matches('/'),
            self.database_path()
        )
    }
}

/// Document store speaking the Firestore REST protocol.
pub struct FirestoreStore {
    http: reqwest::Client,
    settings: FirestoreSettings,
}

impl FirestoreStore {
    pub fn new(settings: FirestoreSettings) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| StoreError::Network(err.to_string()))?;
        Ok(Self { http, settings })
    }

    async fn post(&self, method: &str, body: &Value) -> Result<Value, StoreError> {
        let mut request = self.http.post(self.settings.endpoint(method)).json(body);
        if !self.settings.access_token.is_empty() {
            request = request.bearer_auth(&self.settings.access_token);
        }
        let response = request
            .send()
            .await
            .map_err(|err| StoreError::Network(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| StoreError::Network(err.to_string()))?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|err| StoreError::Response(err.to_string()))
    }
}

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

/// Firestore typed-value encoding of every non-timestamp article field.
pub(crate) fn document_fields(article: &PublishableArticle) -> Map<String, Value> {
    let tags: Vec<Value> = article.tags.iter().map(|tag| string_value(tag)).collect();
    let mut fields = Map::new();
    for (name, value) in [
        ("title", &article.title),
        ("slug", &article.slug),
        ("excerpt", &article.excerpt),
        ("content", &article.content),
        ("category", &article.category),
        ("thumbnail", &article.thumbnail),
        ("sourceUrl", &article.source_url),
        ("sourceName", &article.source_name),
        ("author", &article.author),
    ] {
        fields.insert(name.to_string(), string_value(value));
    }
    fields.insert("status".to_string(), string_value(article.status.as_str()));
    fields.insert("tags".to_string(), json!({ "arrayValue": { "values": tags } }));
    fields.insert(
        "views".to_string(),
        json!({ "integerValue": article.views.to_string() }),
    );
    fields
}

#[async_trait]
impl ContentStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.settings.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "slug" },
                        "op": "EQUAL",
                        "value": string_value(slug),
                    }
                },
                "limit": 1,
            }
        });
        let rows = self.post("runQuery", &query).await?;
        let rows = rows
            .as_array()
            .ok_or_else(|| StoreError::Response("runQuery did not return a list".to_string()))?;
        Ok(rows.iter().any(|row| row.get("document").is_some()))
    }

    async fn insert(&self, article: &PublishableArticle) -> Result<String, StoreError> {
        let document_id = Fingerprint::of_link(&article.source_url).to_string();
        let name = format!(
            "{}/{}/{document_id}",
            self.settings.database_path(),
            self.settings.collection
        );
        let transforms: Vec<Value> = SERVER_TIMESTAMP_FIELDS
            .iter()
            .map(|field| json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }))
            .collect();
        let commit = json!({
            "writes": [{
                "update": { "name": name, "fields": document_fields(article) },
                "currentDocument": { "exists": false },
                "updateTransforms": transforms,
            }]
        });

        press_debug!("Committing {name}");
        self.post("commit", &commit).await?;
        Ok(document_id)
    }
}
