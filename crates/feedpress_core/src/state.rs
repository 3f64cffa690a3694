/// Caps applied while iterating sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub per_source: usize,
    pub per_run: usize,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            per_source: 3,
            per_run: 10,
        }
    }
}

/// Per-pass counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub published: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub store_failures: usize,
    pub skipped: usize,
    pub retryable_failures: usize,
}

impl RunSummary {
    /// Articles that produced output during the pass.
    pub fn articles(&self) -> usize {
        self.published + self.saved + self.store_failures
    }

    /// Entries that went through the pipeline, whatever the outcome.
    pub fn attempted(&self) -> usize {
        self.articles() + self.duplicates + self.retryable_failures
    }
}

/// Bookkeeping for one pass over all sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    limits: RunLimits,
    current_source: Option<String>,
    source_attempts: usize,
    summary: RunSummary,
}

impl RunState {
    pub fn new(limits: RunLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> RunLimits {
        self.limits
    }

    pub fn current_source(&self) -> Option<&str> {
        self.current_source.as_deref()
    }

    /// Whether the pass may still send entries through the pipeline.
    /// Ledger skips are free; every other entry counts.
    pub fn run_has_capacity(&self) -> bool {
        self.summary.attempted() < self.limits.per_run
    }

    /// Whether the current source may still send entries through the pipeline.
    pub fn source_has_capacity(&self) -> bool {
        self.run_has_capacity() && self.source_attempts < self.limits.per_source
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub(crate) fn start_source(&mut self, name: String) {
        self.current_source = Some(name);
        self.source_attempts = 0;
    }

    pub(crate) fn note_skip(&mut self) {
        self.summary.skipped += 1;
    }

    pub(crate) fn note_outcome(&mut self, outcome: &crate::EntryOutcome) {
        use crate::EntryOutcome;
        match outcome {
            EntryOutcome::Published(_) => self.summary.published += 1,
            EntryOutcome::Saved(_) => self.summary.saved += 1,
            EntryOutcome::StoreFailed(_) => self.summary.store_failures += 1,
            EntryOutcome::DuplicateSlug { .. } => self.summary.duplicates += 1,
            EntryOutcome::FetchFailed
            | EntryOutcome::ExtractionFailed
            | EntryOutcome::RewriteFailed => self.summary.retryable_failures += 1,
        }
        self.source_attempts += 1;
    }
}
