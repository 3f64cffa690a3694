use async_trait::async_trait;

/// Input handed to every backend; each one picks the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    pub title: String,
    pub text: String,
    pub source_url: String,
    pub category: String,
}

/// Tagged result of a single backend invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    /// Raw response text; may wrap the JSON object in prose.
    Text(String),
    /// Quota or rate limit hit. The orchestrator pauses before the next backend.
    RateLimited(String),
    /// Anything else: network, refusal, empty or malformed output.
    Failed(String),
}

#[async_trait]
pub trait RewriteBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(&self, request: &RewriteRequest) -> BackendReply;

    /// Start a clean context before the next entry.
    async fn reset(&self) {}
}
