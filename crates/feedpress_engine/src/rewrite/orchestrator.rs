use std::time::Duration;

use feedpress_core::{parse_rewritten, RewrittenArticle};
use feedpress_logging::{press_debug, press_info, press_warn};

use super::{BackendReply, RewriteBackend, RewriteRequest};

/// Timing and bounds for the fallback loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause after a backend reports a rate limit, before trying the next one.
    pub rate_limit_delay: Duration,
    /// Pause between two full sweeps over the backend list.
    pub sweep_backoff: Duration,
    /// Total sweeps before giving up; at least one is always made.
    pub max_sweeps: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_delay: Duration::from_secs(5),
            sweep_backoff: Duration::from_secs(60),
            max_sweeps: 3,
        }
    }
}

/// Tries backends in priority order until one yields a valid article.
pub struct RewriteOrchestrator {
    backends: Vec<Box<dyn RewriteBackend>>,
    policy: RetryPolicy,
}

impl RewriteOrchestrator {
    pub fn new(backends: Vec<Box<dyn RewriteBackend>>, policy: RetryPolicy) -> Self {
        Self { backends, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|backend| backend.name()).collect()
    }

    /// Returns `None` once every sweep is exhausted without a valid article.
    pub async fn rewrite(&self, request: &RewriteRequest) -> Option<RewrittenArticle> {
        if self.backends.is_empty() {
            press_warn!("No rewrite backends configured");
            return None;
        }

        let sweeps = self.policy.max_sweeps.max(1);
        for sweep in 1..=sweeps {
            for backend in &self.backends {
                press_debug!("Rewriting with {} (sweep {sweep}/{sweeps})", backend.name());
                match backend.invoke(request).await {
                    BackendReply::Text(text) => match parse_rewritten(&text) {
                        Ok(article) => {
                            press_info!("Rewrite produced by {}", backend.name());
                            return Some(article);
                        }
                        Err(err) => {
                            press_warn!("{} returned an unusable article: {err}", backend.name());
                        }
                    },
                    BackendReply::RateLimited(reason) => {
                        press_warn!(
                            "{} is rate limited ({reason}), pausing {:?}",
                            backend.name(),
                            self.policy.rate_limit_delay
                        );
                        tokio::time::sleep(self.policy.rate_limit_delay).await;
                    }
                    BackendReply::Failed(reason) => {
                        press_warn!("{} failed: {reason}", backend.name());
                    }
                }
            }

            if sweep < sweeps {
                press_info!(
                    "All rewrite backends failed, retrying in {:?}",
                    self.policy.sweep_backoff
                );
                tokio::time::sleep(self.policy.sweep_backoff).await;
            }
        }

        press_warn!("Rewrite abandoned after {sweeps} sweeps");
        None
    }

    /// Give every backend a fresh context.
    pub async fn reset(&self) {
        for backend in &self.backends {
            backend.reset().await;
        }
    }
}
