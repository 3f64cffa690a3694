//! Feedpress engine: network, disk and backend I/O around the pure core.
mod config;
mod decode;
mod extract;
mod feed;
mod fetch;
mod ledger;
mod output;
mod persist;
pub mod publish;
pub mod rewrite;
mod runner;
mod types;

pub use config::{
    Config, ConfigError, ExtractConfig, PathsConfig, RewriteConfig, Settings, StoreConfig,
};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use extract::{
    fetch_article, ExtractError, ExtractSettings, Extractor, SelectorExtractor,
    BOILERPLATE_IMAGE_MARKERS, DEFAULT_CONTENT_SELECTORS,
};
pub use feed::{parse_feed, read_feed, FeedError};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, BROWSER_USER_AGENT};
pub use ledger::{FingerprintLedger, LedgerError};
pub use output::{BatchOutput, OutputError};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use runner::{
    run_continuous, LoopReport, PassOptions, Pipeline, PipelineParts, RunError,
};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
