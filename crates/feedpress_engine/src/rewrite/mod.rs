//! Rewrite backends and the fallback/retry orchestrator driving them.
mod backend;
mod browser;
mod gemini;
mod orchestrator;
mod prompt;

pub use backend::{BackendReply, RewriteBackend, RewriteRequest};
pub use browser::{last_article_json, BrowserBackend, BrowserSession, PollSettings};
pub use gemini::{GeminiBackend, GeminiSettings, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODELS};
pub use orchestrator::{RetryPolicy, RewriteOrchestrator};
pub use prompt::{article_prompt, truncate_chars, url_prompt};
