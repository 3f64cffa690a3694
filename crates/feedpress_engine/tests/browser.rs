use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use feedpress_engine::rewrite::{
    last_article_json, BackendReply, BrowserBackend, BrowserSession, PollSettings, RewriteBackend,
    RewriteRequest,
};
use pretty_assertions::assert_eq;
use tokio::time::Instant;

#[derive(Default)]
struct Recorded {
    prompts: Vec<String>,
    reads: usize,
    history_reads: usize,
    new_chats: usize,
}

/// Before a prompt is sent the page shows `history`. Afterwards it follows
/// `frames`, repeating the last one; `None` grows forever.
struct ScriptedSession {
    history: String,
    frames: Option<Vec<String>>,
    fail_submit: bool,
    fail_new_chat: bool,
    log: Arc<Mutex<Recorded>>,
}

impl ScriptedSession {
    fn frames(frames: &[&str]) -> (Self, Arc<Mutex<Recorded>>) {
        let log = Arc::new(Mutex::new(Recorded::default()));
        let session = Self {
            history: String::new(),
            frames: Some(frames.iter().map(|f| f.to_string()).collect()),
            fail_submit: false,
            fail_new_chat: false,
            log: log.clone(),
        };
        (session, log)
    }

    fn after(mut self, history: &str) -> Self {
        self.history = history.to_string();
        self
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn submit(&self, prompt: &str) -> Result<(), String> {
        if self.fail_submit {
            return Err("input box not found".to_string());
        }
        self.log.lock().unwrap().prompts.push(prompt.to_string());
        Ok(())
    }

    async fn page_text(&self) -> Result<String, String> {
        let mut log = self.log.lock().unwrap();
        if log.prompts.is_empty() {
            log.history_reads += 1;
            return Ok(self.history.clone());
        }
        log.reads += 1;
        match &self.frames {
            Some(frames) => {
                let idx = (log.reads - 1).min(frames.len() - 1);
                Ok(frames[idx].clone())
            }
            None => Ok("typing".repeat(log.reads)),
        }
    }

    async fn new_chat(&self) -> Result<(), String> {
        self.log.lock().unwrap().new_chats += 1;
        if self.fail_new_chat {
            return Err("button missing".to_string());
        }
        Ok(())
    }
}

fn request() -> RewriteRequest {
    RewriteRequest {
        title: "ignored".to_string(),
        text: "ignored".to_string(),
        source_url: "https://src/a1".to_string(),
        category: "tech".to_string(),
    }
}

const OLD_REPLY: &str = r#"{"title":"Old","excerpt":"","content":"<p>old</p>","tags":[]}"#;
const NEW_REPLY: &str = r#"{"title":"New T","excerpt":"E","content":"<p>X</p>","tags":["a"]}"#;

#[tokio::test(start_paused = true)]
async fn waits_for_stable_page_and_takes_last_article() {
    let full = format!("Read the article... {OLD_REPLY} more chat {NEW_REPLY} Copy");
    let (session, log) = ScriptedSession::frames(&["", "Thinking {\"title\":", &full]);
    let backend = BrowserBackend::new("chat", Box::new(session), PollSettings::default());

    let started = Instant::now();
    let reply = backend.invoke(&request()).await;

    assert_eq!(reply, BackendReply::Text(NEW_REPLY.to_string()));
    // 10s initial wait, then reads 1..=6 with a 2s pause after each of the first five.
    assert_eq!(started.elapsed(), Duration::from_secs(20));
    let log = log.lock().unwrap();
    assert_eq!(log.reads, 6);
    assert!(log.prompts[0].contains("https://src/a1"));
}

#[tokio::test(start_paused = true)]
async fn gives_up_when_page_never_settles() {
    let log = Arc::new(Mutex::new(Recorded::default()));
    let session = ScriptedSession {
        history: String::new(),
        frames: None,
        fail_submit: false,
        fail_new_chat: false,
        log: log.clone(),
    };
    let poll = PollSettings {
        max_polls: 5,
        ..PollSettings::default()
    };
    let backend = BrowserBackend::new("chat", Box::new(session), poll);

    let started = Instant::now();
    let reply = backend.invoke(&request()).await;

    assert_eq!(
        reply,
        BackendReply::Failed("no article JSON on the page".to_string())
    );
    assert_eq!(started.elapsed(), Duration::from_secs(10 + 5 * 2));
    assert_eq!(log.lock().unwrap().reads, 6);
}

#[tokio::test(start_paused = true)]
async fn stable_page_without_article_fails() {
    let (session, _log) = ScriptedSession::frames(&["I cannot open that link."]);
    let backend = BrowserBackend::new("chat", Box::new(session), PollSettings::default());
    assert!(matches!(
        backend.invoke(&request()).await,
        BackendReply::Failed(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn submit_failure_is_immediate() {
    let log = Arc::new(Mutex::new(Recorded::default()));
    let session = ScriptedSession {
        history: String::new(),
        frames: Some(vec![NEW_REPLY.to_string()]),
        fail_submit: true,
        fail_new_chat: false,
        log: log.clone(),
    };
    let backend = BrowserBackend::new("chat", Box::new(session), PollSettings::default());

    let started = Instant::now();
    let reply = backend.invoke(&request()).await;
    assert_eq!(
        reply,
        BackendReply::Failed("submit failed: input box not found".to_string())
    );
    assert_eq!(started.elapsed(), Duration::ZERO);
    let log = log.lock().unwrap();
    assert_eq!(log.reads, 0);
    assert_eq!(log.history_reads, 1);
}

#[tokio::test(start_paused = true)]
async fn article_from_an_earlier_turn_is_not_taken_as_the_reply() {
    let (session, log) = ScriptedSession::frames(&[&format!(
        "{OLD_REPLY} Sorry, I can't access that link."
    )]);
    let session = ScriptedSession {
        fail_new_chat: true,
        ..session.after(OLD_REPLY)
    };
    let backend = BrowserBackend::new("chat", Box::new(session), PollSettings::default());

    backend.reset().await;
    let reply = backend.invoke(&request()).await;

    assert_eq!(
        reply,
        BackendReply::Failed("no article JSON on the page".to_string())
    );
    assert_eq!(log.lock().unwrap().new_chats, 1);
}

#[tokio::test(start_paused = true)]
async fn reply_after_earlier_turn_is_found() {
    let (session, _log) = ScriptedSession::frames(&[&format!("{OLD_REPLY} Sure. {NEW_REPLY}")]);
    let backend = BrowserBackend::new("chat", Box::new(session.after(OLD_REPLY)), PollSettings::default());
    assert_eq!(
        backend.invoke(&request()).await,
        BackendReply::Text(NEW_REPLY.to_string())
    );
}

#[tokio::test]
async fn reset_opens_a_new_chat() {
    let (session, log) = ScriptedSession::frames(&[""]);
    let backend = BrowserBackend::new("chat", Box::new(session), PollSettings::default());
    backend.reset().await;
    assert_eq!(log.lock().unwrap().new_chats, 1);
    assert_eq!(backend.name(), "chat");
}

#[test]
fn last_article_skips_invalid_trailing_objects() {
    let page = format!("{NEW_REPLY} then {{\"title\": \"\"}} and {{broken");
    assert_eq!(last_article_json(&page), Some(NEW_REPLY));
    assert_eq!(last_article_json("nothing"), None);
}
