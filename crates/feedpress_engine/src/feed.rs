use feed_rs::model::Entry;
use feedpress_core::{FeedEntry, FeedSource};
use feedpress_logging::press_debug;

use crate::{FetchError, Fetcher};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("feed parse failed: {0}")]
    Parse(String),
}

/// Entries of an RSS or Atom document, in document order. Entries without a
/// link are dropped.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|err| FeedError::Parse(err.to_string()))?;
    Ok(feed.entries.into_iter().filter_map(to_entry).collect())
}

fn to_entry(entry: Entry) -> Option<FeedEntry> {
    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())?;
    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());
    Some(FeedEntry { link, title })
}

pub async fn read_feed(fetcher: &dyn Fetcher, source: &FeedSource) -> Result<Vec<FeedEntry>, FeedError> {
    let output = fetcher.fetch(&source.feed_url).await?;
    let entries = parse_feed(&output.bytes)?;
    press_debug!("Feed {} listed {} entries", source.name, entries.len());
    Ok(entries)
}
