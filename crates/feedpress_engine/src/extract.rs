use feedpress_core::RawArticle;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{decode_text, DecodeError, FetchError, Fetcher};

/// Main-content containers, most specific first. The first one present wins.
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    ".fck_detail",
    ".knc-content",
    ".cate-24h-foot-arti-deta-info",
    "article .content",
    ".article-content",
    ".content-detail",
    ".the-article-body",
    ".post-content",
    ".entry-content",
    "article",
    "#content",
];

/// Substrings that mark an image URL as page furniture rather than content.
pub const BOILERPLATE_IMAGE_MARKERS: &[&str] = &[
    "icon",
    "logo",
    "avatar",
    "emoji",
    "pixel",
    "tracking",
    "adsense",
    "doubleclick",
    "banner-ad",
    "blank",
    "lazy",
    "placeholder",
    "spacer",
    ".gif",
];

/// Image attributes in the order they are tried.
const IMAGE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-original"];

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("extracted text too short ({len} < {min} chars)")]
    TooShort { len: usize, min: usize },
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

impl ExtractError {
    /// Fetch failures are reported separately from content problems.
    pub fn is_fetch(&self) -> bool {
        matches!(self, ExtractError::Fetch(_))
    }
}

#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub content_selectors: Vec<String>,
    pub min_text_chars: usize,
    pub max_images: usize,
    /// Host substrings images must come from; empty accepts any host.
    pub trusted_image_hosts: Vec<String>,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            content_selectors: DEFAULT_CONTENT_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_text_chars: 200,
            max_images: 5,
            trusted_image_hosts: Vec::new(),
        }
    }
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, page_url: &Url) -> Result<RawArticle, ExtractError>;
}

/// Selector-driven extractor: first matching container, its paragraphs, its images.
#[derive(Debug)]
pub struct SelectorExtractor {
    settings: ExtractSettings,
    containers: Vec<Selector>,
    paragraph: Selector,
    image: Selector,
    body: Selector,
    og_image: Selector,
}

impl SelectorExtractor {
    pub fn new(settings: ExtractSettings) -> Result<Self, ExtractError> {
        let containers = settings
            .content_selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            containers,
            paragraph: parse_selector("p")?,
            image: parse_selector("img")?,
            body: parse_selector("body")?,
            og_image: parse_selector(r#"meta[property="og:image"]"#)?,
            settings,
        })
    }

    fn content_root<'a>(&self, doc: &'a Html) -> ElementRef<'a> {
        self.containers
            .iter()
            .find_map(|sel| doc.select(sel).next())
            .or_else(|| doc.select(&self.body).next())
            .unwrap_or_else(|| doc.root_element())
    }

    fn paragraphs_text(&self, root: ElementRef<'_>) -> String {
        root.select(&self.paragraph)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn images(&self, root: ElementRef<'_>, page_url: &Url) -> Vec<String> {
        let mut images: Vec<String> = Vec::new();
        for img in root.select(&self.image) {
            if images.len() >= self.settings.max_images {
                break;
            }
            let accepted = IMAGE_ATTRIBUTES
                .iter()
                .filter_map(|attr| img.value().attr(attr))
                .find_map(|raw| self.accept_image(raw, page_url));
            if let Some(url) = accepted {
                if !images.contains(&url) {
                    images.push(url);
                }
            }
        }
        images
    }

    fn accept_image(&self, raw: &str, page_url: &Url) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with("data:") {
            return None;
        }
        let lowered = raw.to_ascii_lowercase();
        if BOILERPLATE_IMAGE_MARKERS.iter().any(|m| lowered.contains(m)) {
            return None;
        }
        let absolute = absolutize(raw, page_url)?;
        if !self.is_trusted(&absolute) {
            return None;
        }
        Some(absolute)
    }

    fn is_trusted(&self, url: &str) -> bool {
        if self.settings.trusted_image_hosts.is_empty() {
            return true;
        }
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
            .unwrap_or_default();
        self.settings
            .trusted_image_hosts
            .iter()
            .any(|t| host.contains(&t.to_ascii_lowercase()))
    }

    fn lead_image(&self, doc: &Html, page_url: &Url) -> Option<String> {
        doc.select(&self.og_image)
            .filter_map(|meta| meta.value().attr("content"))
            .find_map(|raw| self.accept_image(raw, page_url))
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, html: &str, page_url: &Url) -> Result<RawArticle, ExtractError> {
        let doc = Html::parse_document(html);
        let root = self.content_root(&doc);

        let text = self.paragraphs_text(root);
        let len = text.chars().count();
        if len < self.settings.min_text_chars {
            return Err(ExtractError::TooShort {
                len,
                min: self.settings.min_text_chars,
            });
        }

        Ok(RawArticle {
            text,
            images: self.images(root, page_url),
            lead_image: self.lead_image(&doc, page_url),
        })
    }
}

/// Fetch a source page and extract its article.
pub async fn fetch_article(
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    url: &str,
) -> Result<RawArticle, ExtractError> {
    let output = fetcher.fetch(url).await?;
    let decoded = decode_text(&output.bytes, output.metadata.content_type.as_deref())?;
    let page_url = Url::parse(&output.metadata.final_url).or_else(|_| Url::parse(url)).map_err(|err| {
        FetchError::new(crate::FailureKind::InvalidUrl, err.to_string())
    })?;
    extractor.extract(&decoded.text, &page_url)
}

/// Absolute form of an image URL; protocol- and root-relative forms borrow the
/// page's scheme and host, other relative forms are rejected.
fn absolutize(raw: &str, page_url: &Url) -> Option<String> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("{}://{}", page_url.scheme(), rest));
    }
    if raw.starts_with('/') {
        return page_url.join(raw).ok().map(|u| u.to_string());
    }
    None
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|err| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}
