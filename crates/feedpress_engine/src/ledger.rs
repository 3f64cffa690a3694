use std::collections::HashSet;
use std::path::{Path, PathBuf};

use feedpress_core::Fingerprint;
use thiserror::Error;

use crate::persist::{read_optional, AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger io: {0}")]
    Persist(#[from] PersistError),
    #[error("ledger {path} is not a JSON list of fingerprints: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("ledger serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable set of fingerprints of entries that reached a terminal outcome.
///
/// Stored as a JSON array in first-recorded order and rewritten in full on
/// every flush. Entries are never removed.
#[derive(Debug)]
pub struct FingerprintLedger {
    writer: AtomicFileWriter,
    order: Vec<Fingerprint>,
    seen: HashSet<Fingerprint>,
}

impl FingerprintLedger {
    /// Load the ledger at `path`. A missing or blank file yields an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let order = match read_optional(&path)? {
            Some(text) if !text.trim().is_empty() => {
                serde_json::from_str::<Vec<Fingerprint>>(&text).map_err(|err| {
                    LedgerError::Corrupt {
                        path: path.clone(),
                        message: err.to_string(),
                    }
                })?
            }
            _ => Vec::new(),
        };

        let mut ledger = Self {
            writer: AtomicFileWriter::new(path),
            order: Vec::with_capacity(order.len()),
            seen: HashSet::with_capacity(order.len()),
        };
        for fingerprint in order {
            ledger.record(fingerprint);
        }
        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        self.writer.target()
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Returns `false` when the fingerprint was already present.
    pub fn record(&mut self, fingerprint: Fingerprint) -> bool {
        if !self.seen.insert(fingerprint.clone()) {
            return false;
        }
        self.order.push(fingerprint);
        true
    }

    pub fn fingerprints(&self) -> &HashSet<Fingerprint> {
        &self.seen
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Atomically rewrite the backing file with the full set.
    pub fn flush(&self) -> Result<(), LedgerError> {
        let content = serde_json::to_vec_pretty(&self.order)?;
        self.writer.write(&content)?;
        Ok(())
    }
}
