//! Content loader - reads content.md for a page and renders it to HTML

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{MarkdownRenderer, PageKey};
use crate::error::PageError;

/// File name of the markdown body inside a page directory
pub const CONTENT_FILE: &str = "content.md";

/// Loads page bodies from the pages directory
pub struct ContentLoader {
    pages_dir: PathBuf,
    renderer: Arc<MarkdownRenderer>,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new<P: AsRef<Path>>(pages_dir: P, renderer: Arc<MarkdownRenderer>) -> Self {
        Self {
            pages_dir: pages_dir.as_ref().to_path_buf(),
            renderer,
        }
    }

    /// Path of the markdown body for a key
    pub fn path_for(&self, key: &PageKey) -> PathBuf {
        self.pages_dir.join(key).join(CONTENT_FILE)
    }

    /// Read the page body and render it to HTML
    pub fn load(&self, key: &PageKey) -> Result<String, PageError> {
        let path = self.path_for(key);
        let raw = fs::read(&path).map_err(|e| PageError::not_found(&path, e))?;

        // Content is treated as bytes; invalid UTF-8 is replaced rather than rejected
        let markdown = String::from_utf8_lossy(&raw);
        Ok(self.renderer.render(&markdown))
    }
}
