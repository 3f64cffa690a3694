use std::time::Duration;

use async_trait::async_trait;
use feedpress_logging::press_debug;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{article_prompt, BackendReply, RewriteBackend, RewriteRequest};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Priority order used when the configuration names no models.
pub const DEFAULT_GEMINI_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro-latest",
];

const ERROR_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout: Duration,
    pub max_source_chars: usize,
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            request_timeout: Duration::from_secs(60),
            max_source_chars: 3000,
        }
    }
}

/// Text-in backend calling the `generateContent` REST endpoint of one model.
pub struct GeminiBackend {
    http: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiBackend {
    pub fn new(settings: GeminiSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    fn endpoint(&self) -> Result<Url, url::ParseError> {
        let base = self.settings.api_base.trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{base}/v1beta/models/{}:generateContent",
            self.settings.model
        ))?;
        url.query_pairs_mut().append_pair("key", &self.settings.api_key);
        Ok(url)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn is_quota_error(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    lowered.contains("resource_exhausted") || lowered.contains("quota")
}

fn snippet(body: &str) -> String {
    super::truncate_chars(body.trim(), ERROR_SNIPPET_CHARS).to_string()
}

fn reply_text(response: GenerateResponse) -> BackendReply {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return BackendReply::Text(text);
    }
    match response.prompt_feedback.and_then(|f| f.block_reason) {
        Some(reason) => BackendReply::Failed(format!("prompt blocked: {reason}")),
        None => BackendReply::Failed("empty response".to_string()),
    }
}

#[async_trait]
impl RewriteBackend for GeminiBackend {
    fn name(&self) -> &str {
        &self.settings.model
    }

    async fn invoke(&self, request: &RewriteRequest) -> BackendReply {
        let url = match self.endpoint() {
            Ok(url) => url,
            Err(err) => return BackendReply::Failed(format!("invalid endpoint: {err}")),
        };
        let prompt = article_prompt(request, self.settings.max_source_chars);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt }],
            }],
        };

        press_debug!("POST generateContent for {}", self.settings.model);
        let response = match self.http.post(url).json(&body).send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => return BackendReply::Failed("timeout".to_string()),
            Err(err) => return BackendReply::Failed(err.to_string()),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => return BackendReply::Failed(err.to_string()),
        };

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return BackendReply::RateLimited(snippet(&text));
        }
        if !status.is_success() {
            if is_quota_error(&text) {
                return BackendReply::RateLimited(snippet(&text));
            }
            return BackendReply::Failed(format!("http {}: {}", status.as_u16(), snippet(&text)));
        }

        match serde_json::from_str::<GenerateResponse>(&text) {
            Ok(parsed) => reply_text(parsed),
            Err(err) => BackendReply::Failed(format!("unexpected response shape: {err}")),
        }
    }
}
