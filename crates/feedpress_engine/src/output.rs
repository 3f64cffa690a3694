use std::path::{Path, PathBuf};

use feedpress_core::PublishableArticle;
use thiserror::Error;

use crate::persist::{read_optional, AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("batch output io: {0}")]
    Persist(#[from] PersistError),
    #[error("batch output {path} is not a JSON list of articles: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("batch output serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only JSON list of finished articles awaiting import.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    writer: AtomicFileWriter,
}

impl BatchOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        self.writer.target()
    }

    /// All articles written so far; empty when the file does not exist yet.
    pub fn read_all(&self) -> Result<Vec<PublishableArticle>, OutputError> {
        match read_optional(self.path())? {
            Some(text) if !text.trim().is_empty() => {
                serde_json::from_str(&text).map_err(|err| OutputError::Corrupt {
                    path: self.path().to_path_buf(),
                    message: err.to_string(),
                })
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Append `articles` and atomically rewrite the file. Returns the new total.
    pub fn append(&self, articles: &[PublishableArticle]) -> Result<usize, OutputError> {
        let mut all = self.read_all()?;
        all.extend_from_slice(articles);
        let content = serde_json::to_vec_pretty(&all)?;
        self.writer.write(&content)?;
        Ok(all.len())
    }
}
