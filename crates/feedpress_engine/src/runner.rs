//! Run loop: one pass over all sources, and the guarded continuous mode.
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use feedpress_core::{
    assemble_article, update, ArticleContext, ArticleStatus, Effect, EntryOutcome, FeedEntry,
    FeedSource, Msg, RunLimits, RunState, RunSummary,
};
use feedpress_logging::{enter_entry, press_error, press_info, press_warn};
use futures_util::FutureExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, ConfigError, Settings};
use crate::extract::{fetch_article, ExtractError, Extractor, SelectorExtractor};
use crate::feed::read_feed;
use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::ledger::{FingerprintLedger, LedgerError};
use crate::output::{BatchOutput, OutputError};
use crate::publish::{PublishOutcome, Publisher};
use crate::rewrite::{RewriteOrchestrator, RewriteRequest};

/// Failures that abort a whole pass. Per-entry failures never do.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid extractor settings: {0}")]
    Extractor(#[from] ExtractError),
    #[error("pipeline setup failed: {0}")]
    Setup(String),
}

/// Per-pass knobs taken from `settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOptions {
    pub limits: RunLimits,
    /// Politeness pause between two processed entries.
    pub entry_delay: Duration,
    pub auto_publish: bool,
    pub author: String,
    pub slug_max_len: usize,
}

impl From<&Settings> for PassOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            limits: settings.run_limits(),
            entry_delay: settings.entry_delay(),
            auto_publish: settings.auto_publish,
            author: settings.author.clone(),
            slug_max_len: settings.slug_max_len,
        }
    }
}

/// Everything a pipeline is assembled from.
pub struct PipelineParts {
    pub feeds: Box<dyn Fetcher>,
    pub pages: Box<dyn Fetcher>,
    pub extractor: Box<dyn Extractor>,
    pub rewriter: RewriteOrchestrator,
    /// `None` keeps articles in the batch output only.
    pub publisher: Option<Publisher>,
    pub ledger: FingerprintLedger,
    pub output: BatchOutput,
    pub options: PassOptions,
}

/// Feed entry to stored article, one entry at a time.
pub struct Pipeline {
    feeds: Box<dyn Fetcher>,
    pages: Box<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    rewriter: RewriteOrchestrator,
    publisher: Option<Publisher>,
    ledger: FingerprintLedger,
    output: BatchOutput,
    options: PassOptions,
    entries_started: u64,
}

impl Pipeline {
    pub fn new(parts: PipelineParts) -> Self {
        Self {
            feeds: parts.feeds,
            pages: parts.pages,
            extractor: parts.extractor,
            rewriter: parts.rewriter,
            publisher: parts.publisher,
            ledger: parts.ledger,
            output: parts.output,
            options: parts.options,
            entries_started: 0,
        }
    }

    /// Real fetchers, extractor, ledger and output as configured.
    pub fn from_config(
        config: &Config,
        rewriter: RewriteOrchestrator,
        publisher: Option<Publisher>,
    ) -> Result<Self, RunError> {
        Ok(Self::new(PipelineParts {
            feeds: Box::new(ReqwestFetcher::new(config.extract.feed_fetch())),
            pages: Box::new(ReqwestFetcher::new(config.extract.page_fetch())),
            extractor: Box::new(SelectorExtractor::new(config.extract.extractor())?),
            rewriter,
            publisher,
            ledger: FingerprintLedger::load(&config.paths.ledger)?,
            output: BatchOutput::new(&config.paths.output),
            options: PassOptions::from(&config.settings),
        }))
    }

    pub fn ledger(&self) -> &FingerprintLedger {
        &self.ledger
    }

    pub fn output(&self) -> &BatchOutput {
        &self.output
    }

    /// One pass over `sources` in order. Stops early, between entries, once
    /// `cancel` fires.
    ///
    /// Each entry is processed inside a thread-local log scope, so the
    /// returned future is `!Send` and must be driven on a current-thread
    /// runtime (or `block_on`), never spawned onto a work-stealing one.
    pub async fn run_pass(
        &mut self,
        sources: &[FeedSource],
        cancel: &CancellationToken,
    ) -> Result<RunSummary, RunError> {
        let mut state = RunState::new(self.options.limits);
        let mut processed_any = false;

        'sources: for source in sources {
            if cancel.is_cancelled() {
                break;
            }
            if !state.run_has_capacity() {
                press_info!("Run cap of {} entries reached", self.options.limits.per_run);
                break;
            }
            state = update(
                state,
                Msg::SourceStarted {
                    name: source.name.clone(),
                },
            )
            .0;
            press_info!("Reading feed {} ({})", source.name, source.feed_url);

            let entries = match read_feed(self.feeds.as_ref(), source).await {
                Ok(entries) => entries,
                Err(err) => {
                    press_warn!("Skipping source {}: {err}", source.name);
                    continue;
                }
            };

            for entry in entries {
                if cancel.is_cancelled() {
                    break 'sources;
                }
                if !state.source_has_capacity() {
                    break;
                }
                let fingerprint = entry.fingerprint();
                if self.ledger.contains(&fingerprint) {
                    state = update(state, Msg::EntrySkipped { fingerprint }).0;
                    continue;
                }

                if processed_any && !pause(cancel, self.options.entry_delay).await {
                    break 'sources;
                }
                processed_any = true;

                self.entries_started += 1;
                let _scope = enter_entry(self.entries_started);
                press_info!("Processing {:?} <{}>", entry.title, entry.link);
                let outcome = self.process_entry(source, &entry).await;
                press_info!("Outcome: {}", outcome.label());

                let (next, effects) = update(
                    state,
                    Msg::EntryFinished {
                        fingerprint,
                        outcome,
                    },
                );
                state = next;
                self.apply(effects)?;
                self.rewriter.reset().await;
            }
        }

        let summary = state.summary().clone();
        press_info!(
            "Pass finished: {} published, {} saved, {} duplicate, {} store failures, {} skipped, {} to retry",
            summary.published,
            summary.saved,
            summary.duplicates,
            summary.store_failures,
            summary.skipped,
            summary.retryable_failures
        );
        Ok(summary)
    }

    async fn process_entry(&self, source: &FeedSource, entry: &FeedEntry) -> EntryOutcome {
        let raw = match fetch_article(self.pages.as_ref(), self.extractor.as_ref(), &entry.link).await {
            Ok(raw) => raw,
            Err(err) if err.is_fetch() => {
                press_warn!("Fetch failed: {err}");
                return EntryOutcome::FetchFailed;
            }
            Err(err) => {
                press_warn!("Extraction failed: {err}");
                return EntryOutcome::ExtractionFailed;
            }
        };

        let request = RewriteRequest {
            title: entry.title.clone(),
            text: raw.text.clone(),
            source_url: entry.link.clone(),
            category: source.category.clone(),
        };
        let Some(rewritten) = self.rewriter.rewrite(&request).await else {
            return EntryOutcome::RewriteFailed;
        };

        let article = assemble_article(
            rewritten,
            &ArticleContext {
                source,
                entry,
                raw: &raw,
                status: ArticleStatus::from_auto_publish(self.options.auto_publish),
                author: &self.options.author,
                slug_max_len: self.options.slug_max_len,
                now: Utc::now(),
            },
        );

        let Some(publisher) = &self.publisher else {
            return EntryOutcome::Saved(Box::new(article));
        };
        match publisher.publish(&article).await {
            Ok(PublishOutcome::Published { .. }) => EntryOutcome::Published(Box::new(article)),
            Ok(PublishOutcome::DuplicateSlug) => {
                press_warn!("Slug {} already published", article.slug);
                EntryOutcome::DuplicateSlug { slug: article.slug }
            }
            Err(err) => {
                press_warn!("Store write failed, keeping article for import: {err}");
                EntryOutcome::StoreFailed(Box::new(article))
            }
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Result<(), RunError> {
        for effect in effects {
            match effect {
                Effect::AppendOutput(article) => {
                    let total = self.output.append(std::slice::from_ref(article.as_ref()))?;
                    press_info!("Batch output now holds {total} articles");
                }
                Effect::RecordFingerprint(fingerprint) => {
                    self.ledger.record(fingerprint);
                }
                Effect::FlushLedger => self.ledger.flush()?,
            }
        }
        Ok(())
    }
}

/// Sleep unless cancelled first. Returns `false` on cancellation.
async fn pause(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

/// Totals over every cycle of a continuous run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub articles: usize,
}

/// Repeat passes until `cancel` fires.
///
/// The configuration is reloaded and the pipeline rebuilt at the start of every
/// cycle. A cycle that errors or panics is logged and followed by the error
/// cooldown instead of the regular interval.
pub async fn run_continuous<L, B>(load: L, build: B, cancel: CancellationToken) -> LoopReport
where
    L: Fn() -> Result<Config, RunError>,
    B: Fn(&Config) -> Result<Pipeline, RunError>,
{
    let mut report = LoopReport::default();
    let mut settings = Settings::default();

    while !cancel.is_cancelled() {
        report.cycles += 1;
        press_info!("Cycle {} starting", report.cycles);

        let cycle = AssertUnwindSafe(async {
            let config = load()?;
            let mut pipeline = build(&config)?;
            let summary = pipeline.run_pass(&config.sources, &cancel).await?;
            Ok::<_, RunError>((config.settings, summary))
        })
        .catch_unwind()
        .await;

        let wait = match cycle {
            Ok(Ok((latest, summary))) => {
                settings = latest;
                report.articles += summary.articles();
                press_info!(
                    "Cycle {} produced {} articles ({} total), next check in {} minutes",
                    report.cycles,
                    summary.articles(),
                    report.articles,
                    settings.check_interval_minutes
                );
                settings.check_interval()
            }
            Ok(Err(err)) => {
                report.failed_cycles += 1;
                press_error!("Cycle {} failed: {err}", report.cycles);
                settings.error_cooldown()
            }
            Err(panic) => {
                report.failed_cycles += 1;
                press_error!("Cycle {} panicked: {}", report.cycles, panic_message(panic.as_ref()));
                settings.error_cooldown()
            }
        };

        if !pause(&cancel, wait).await {
            break;
        }
    }

    press_info!(
        "Stopped after {} cycles, {} articles",
        report.cycles,
        report.articles
    );
    report
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
