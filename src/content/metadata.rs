//! Per-page metadata (metadata.json)

use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::PageKey;
use crate::error::PageError;

/// File name of the metadata document inside a page directory
pub const METADATA_FILE: &str = "metadata.json";

/// Structured page metadata: a JSON object of arbitrary shape
pub type Metadata = Map<String, Value>;

/// Loads `metadata.json` for a page
pub struct MetadataLoader {
    pages_dir: PathBuf,
}

impl MetadataLoader {
    pub fn new<P: AsRef<Path>>(pages_dir: P) -> Self {
        Self {
            pages_dir: pages_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the metadata document for a key
    pub fn path_for(&self, key: &PageKey) -> PathBuf {
        self.pages_dir.join(key).join(METADATA_FILE)
    }

    /// Load and decode the metadata for a page
    pub fn load(&self, key: &PageKey) -> Result<Metadata, PageError> {
        let path = self.path_for(key);
        let file = File::open(&path).map_err(|e| PageError::not_found(&path, e))?;

        // The handle is dropped on every return path, decode failures included
        let metadata: Metadata = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            if e.is_io() {
                // A read failure after a successful open is still an unreadable file
                PageError::not_found(&path, std::io::Error::from(e))
            } else {
                PageError::MalformedMetadata {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        tracing::debug!("Loaded {} metadata keys from {:?}", metadata.len(), path);
        Ok(metadata)
    }
}
