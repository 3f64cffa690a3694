//! Feedpress core: pure article pipeline logic and run bookkeeping.
mod article;
mod effect;
mod fingerprint;
mod interleave;
mod json_scan;
mod model;
mod msg;
mod slug;
mod state;
mod update;

pub use article::{assemble_article, ArticleContext};
pub use effect::Effect;
pub use fingerprint::{canonical_link, Fingerprint};
pub use interleave::{image_tag, interleave_images, PARAGRAPH_CLOSE};
pub use json_scan::{first_json_object, json_objects, parse_rewritten, ArticleSchemaError};
pub use model::{ArticleStatus, FeedEntry, FeedSource, PublishableArticle, RawArticle, RewrittenArticle};
pub use msg::{EntryOutcome, Msg};
pub use slug::{slugify, DEFAULT_SLUG_MAX_LEN};
pub use state::{RunLimits, RunState, RunSummary};
pub use update::update;
