use std::time::Duration;

use async_trait::async_trait;
use feedpress_core::{json_objects, parse_rewritten};
use feedpress_logging::{press_debug, press_warn};

use super::{url_prompt, BackendReply, RewriteBackend, RewriteRequest};

/// A driven chat page. Implementations own the browser automation.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Type the prompt into the chat input and send it.
    async fn submit(&self, prompt: &str) -> Result<(), String>;
    /// Full visible text of the conversation.
    async fn page_text(&self) -> Result<String, String>;
    /// Open a new, empty conversation.
    async fn new_chat(&self) -> Result<(), String>;
}

/// How long to wait for a streamed reply to settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub initial_wait: Duration,
    pub poll_interval: Duration,
    pub max_polls: usize,
    /// Consecutive unchanged reads that count as "finished".
    pub stable_polls: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_wait: Duration::from_secs(10),
            poll_interval: Duration::from_secs(2),
            max_polls: 40,
            stable_polls: 3,
        }
    }
}

/// URL-in backend: the assistant behind the session reads the source page itself.
pub struct BrowserBackend {
    name: String,
    session: Box<dyn BrowserSession>,
    poll: PollSettings,
}

impl BrowserBackend {
    pub fn new(name: impl Into<String>, session: Box<dyn BrowserSession>, poll: PollSettings) -> Self {
        Self {
            name: name.into(),
            session,
            poll,
        }
    }

    /// Wait until the page text stops growing, bounded by `max_polls`.
    async fn settled_text(&self) -> Option<String> {
        let mut last_len = None;
        let mut stable = 0;
        for _ in 0..self.poll.max_polls {
            match self.session.page_text().await {
                Ok(text) => {
                    if last_len == Some(text.len()) {
                        stable += 1;
                        if stable >= self.poll.stable_polls {
                            return Some(text);
                        }
                    } else {
                        stable = 0;
                        last_len = Some(text.len());
                    }
                }
                Err(err) => press_debug!("{}: page read failed: {err}", self.name),
            }
            tokio::time::sleep(self.poll.poll_interval).await;
        }
        None
    }
}

/// The last balanced JSON object on the page that is a valid article.
///
/// Earlier objects may belong to previous turns of the conversation.
pub fn last_article_json(page: &str) -> Option<&str> {
    json_objects(page)
        .filter(|(span, _)| parse_rewritten(span).is_ok())
        .last()
        .map(|(span, _)| span)
}

/// Text added to the page after the first `baseline` bytes.
///
/// A page shorter than the baseline was replaced wholesale and is scanned in full.
fn reply_part(page: &str, baseline: usize) -> &str {
    if baseline > page.len() {
        return page;
    }
    let start = (baseline..=page.len())
        .find(|idx| page.is_char_boundary(*idx))
        .unwrap_or(page.len());
    &page[start..]
}

#[async_trait]
impl RewriteBackend for BrowserBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &RewriteRequest) -> BackendReply {
        // Anything already on the page belongs to earlier turns.
        let baseline = match self.session.page_text().await {
            Ok(text) => text.len(),
            Err(err) => return BackendReply::Failed(format!("page read failed: {err}")),
        };
        if let Err(err) = self.session.submit(&url_prompt(request)).await {
            return BackendReply::Failed(format!("submit failed: {err}"));
        }
        tokio::time::sleep(self.poll.initial_wait).await;

        if let Some(text) = self.settled_text().await {
            if let Some(json) = last_article_json(reply_part(&text, baseline)) {
                return BackendReply::Text(json.to_string());
            }
        }

        // One last read in case the reply finished right at the bound.
        match self.session.page_text().await {
            Ok(text) => match last_article_json(reply_part(&text, baseline)) {
                Some(json) => BackendReply::Text(json.to_string()),
                None => BackendReply::Failed("no article JSON on the page".to_string()),
            },
            Err(err) => BackendReply::Failed(format!("page read failed: {err}")),
        }
    }

    async fn reset(&self) {
        if let Err(err) = self.session.new_chat().await {
            press_warn!("{}: could not open a new chat: {err}", self.name);
        }
    }
}
