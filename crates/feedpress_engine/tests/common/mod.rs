#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feedpress_engine::rewrite::{BackendReply, RewriteBackend, RewriteRequest};
use feedpress_engine::{FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher};

/// Serves canned bodies by URL; anything else is a 404.
#[derive(Default, Clone)]
pub struct StaticFetcher {
    bodies: HashMap<String, (String, Vec<u8>)>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies
            .insert(url.to_string(), (content_type.to_string(), body.into()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let Some((content_type, bytes)) = self.bodies.get(url) else {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(404),
                message: "not found".to_string(),
            });
        };
        Ok(FetchOutput {
            bytes: bytes.clone(),
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: Some(content_type.clone()),
                byte_len: bytes.len() as u64,
            },
        })
    }
}

/// Replies from a script; the last reply repeats once the script runs out.
pub struct ScriptedBackend {
    name: String,
    replies: Mutex<Vec<BackendReply>>,
    calls: Arc<Mutex<usize>>,
    resets: Arc<Mutex<usize>>,
}

impl ScriptedBackend {
    pub fn new(name: &str, replies: Vec<BackendReply>) -> Self {
        Self {
            name: name.to_string(),
            replies: Mutex::new(replies),
            calls: Arc::new(Mutex::new(0)),
            resets: Arc::new(Mutex::new(0)),
        }
    }

    pub fn always(name: &str, reply: BackendReply) -> Self {
        Self::new(name, vec![reply])
    }

    pub fn calls(&self) -> Arc<Mutex<usize>> {
        self.calls.clone()
    }

    pub fn resets(&self) -> Arc<Mutex<usize>> {
        self.resets.clone()
    }
}

#[async_trait]
impl RewriteBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, _request: &RewriteRequest) -> BackendReply {
        *self.calls.lock().unwrap() += 1;
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies
                .first()
                .cloned()
                .unwrap_or_else(|| BackendReply::Failed("no script".into()))
        }
    }

    async fn reset(&self) {
        *self.resets.lock().unwrap() += 1;
    }
}

pub const VALID_ARTICLE: &str =
    r#"{"title":"New T","excerpt":"E","content":"<p>X</p><p>Y</p>","tags":["a"]}"#;

pub fn request() -> RewriteRequest {
    RewriteRequest {
        title: "Old title".to_string(),
        text: "Body text".to_string(),
        source_url: "https://src/a1".to_string(),
        category: "tech".to_string(),
    }
}

/// A page whose main block holds `text_len` characters and the given images.
pub fn article_page(text_len: usize, images: &[&str]) -> String {
    let text = "a".repeat(text_len);
    let imgs: String = images
        .iter()
        .map(|src| format!(r#"<img src="{src}">"#))
        .collect();
    format!(
        "<html><head><title>t</title></head><body><nav><p>menu</p></nav>\
         <article><p>{text}</p>{imgs}</article></body></html>"
    )
}

pub fn rss(items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link)| format!("<item><title>{title}</title><link>{link}</link></item>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Feed</title><link>https://src/</link><description>d</description>{items}</channel></rss>"#
    )
}
