//! Turns a loaded configuration into a runnable pipeline.
use feedpress_engine::publish::{ContentStore, FirestoreStore, MemoryStore, Publisher};
use feedpress_engine::rewrite::{GeminiBackend, RewriteBackend, RewriteOrchestrator};
use feedpress_engine::{Config, Pipeline, RunError};
use feedpress_logging::{press_info, press_warn};

/// Command-line adjustments applied on top of every loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    /// Publish into an in-memory store instead of the configured one.
    pub dry_run: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config.rewrite.api_key = key.to_string();
        }
    }
}

pub fn rewriter(config: &Config) -> Result<RewriteOrchestrator, RunError> {
    if !config.rewrite.has_api_key() {
        return Err(RunError::Setup(
            "no generative API key configured (rewrite.api_key or GEMINI_API_KEY)".to_string(),
        ));
    }
    let backends = config
        .rewrite
        .gemini_backends()
        .into_iter()
        .map(|settings| {
            GeminiBackend::new(settings)
                .map(|backend| Box::new(backend) as Box<dyn RewriteBackend>)
                .map_err(|err| RunError::Setup(err.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RewriteOrchestrator::new(backends, config.rewrite.retry_policy()))
}

pub fn publisher(config: &Config, dry_run: bool) -> Result<Option<Publisher>, RunError> {
    let store: Box<dyn ContentStore> = if dry_run {
        Box::new(MemoryStore::new())
    } else if let Some(store) = &config.store {
        let firestore = FirestoreStore::new(store.firestore())
            .map_err(|err| RunError::Setup(err.to_string()))?;
        Box::new(firestore)
    } else {
        return Ok(None);
    };
    Ok(Some(Publisher::new(store)))
}

pub fn pipeline(config: &Config, overrides: &Overrides) -> Result<Pipeline, RunError> {
    let rewriter = rewriter(config)?;
    let publisher = publisher(config, overrides.dry_run)?;
    match &publisher {
        Some(publisher) => press_info!("Publishing to {}", publisher.store_name()),
        None => press_warn!("No content store configured; articles go to the batch output only"),
    }
    press_info!(
        "{} sources, rewrite backends: {}",
        config.sources.len(),
        rewriter.backend_names().join(", ")
    );
    Pipeline::from_config(config, rewriter, publisher)
}
