use crate::{Fingerprint, PublishableArticle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The run loop moved on to the next configured source.
    SourceStarted { name: String },
    /// Entry was already in the ledger.
    EntrySkipped { fingerprint: Fingerprint },
    /// Entry went through the pipeline.
    EntryFinished {
        fingerprint: Fingerprint,
        outcome: EntryOutcome,
    },
}

/// How processing of a single feed entry ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Accepted by the content store.
    Published(Box<PublishableArticle>),
    /// No content store configured; kept in the batch output only.
    Saved(Box<PublishableArticle>),
    /// The store already holds this slug; nothing new is written anywhere.
    DuplicateSlug { slug: String },
    /// Rewrite succeeded but the store write failed; kept in the batch output.
    StoreFailed(Box<PublishableArticle>),
    FetchFailed,
    ExtractionFailed,
    RewriteFailed,
}

impl EntryOutcome {
    /// Terminal outcomes are recorded in the ledger and never retried.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            EntryOutcome::FetchFailed | EntryOutcome::ExtractionFailed | EntryOutcome::RewriteFailed
        )
    }

    /// The article that should be appended to the batch output, if any.
    pub fn output(&self) -> Option<&PublishableArticle> {
        match self {
            EntryOutcome::Published(article)
            | EntryOutcome::Saved(article)
            | EntryOutcome::StoreFailed(article) => Some(article),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryOutcome::Published(_) => "published",
            EntryOutcome::Saved(_) => "saved",
            EntryOutcome::DuplicateSlug { .. } => "duplicate slug",
            EntryOutcome::StoreFailed(_) => "store failed",
            EntryOutcome::FetchFailed => "fetch failed",
            EntryOutcome::ExtractionFailed => "extraction failed",
            EntryOutcome::RewriteFailed => "rewrite failed",
        }
    }
}
