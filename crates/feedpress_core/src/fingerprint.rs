use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Stable dedup key of a feed entry: hex SHA-256 of its canonical link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_link(link: &str) -> Self {
        let canonical = canonical_link(link);
        let digest = Sha256::digest(canonical.as_bytes());
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest.iter() {
            use std::fmt::Write;
            let _ = write!(&mut hex, "{byte:02x}");
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trimmed link with the fragment removed. Unparseable links are only trimmed.
pub fn canonical_link(link: &str) -> String {
    let trimmed = link.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_link_same_fingerprint() {
        let a = Fingerprint::of_link("https://src/a1");
        let b = Fingerprint::of_link("  https://src/a1 ");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fragment_is_ignored_but_query_is_not() {
        let base = Fingerprint::of_link("https://news.example/a?id=1");
        assert_eq!(base, Fingerprint::of_link("https://news.example/a?id=1#comments"));
        assert_ne!(base, Fingerprint::of_link("https://news.example/a?id=2"));
    }

    #[test]
    fn fingerprint_is_plain_sha256_of_canonical_link() {
        assert_eq!(
            Fingerprint::of_link("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
