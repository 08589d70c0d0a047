//! pagestand: a minimal content server
//!
//! Maps a URL path segment to a directory under `<root>/pages`, renders its
//! `content.md` and `metadata.json` through the shared `template.html`, and
//! serves the result over HTTP alongside a plain static file directory.

pub mod config;
pub mod content;
pub mod error;
pub mod render;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use error::{ErrorKind, PageError};
pub use render::PageRenderer;

/// Name of the optional configuration file at the document root
pub const CONFIG_FILE: &str = "_config.yml";

/// A document root and the paths derived from it
///
/// Built once at startup and passed by reference to every component.
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Document root
    pub root: PathBuf,
    /// Directory holding one subdirectory per page
    pub pages_dir: PathBuf,
    /// Directory served under /static
    pub static_dir: PathBuf,
    /// Shared page template
    pub template_path: PathBuf,
}

impl Site {
    /// Create a site from a document root, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let config_path = root.as_ref().join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(root, config))
    }

    /// Create a site from a document root and an explicit configuration
    pub fn with_config<P: AsRef<Path>>(root: P, config: config::SiteConfig) -> Self {
        let root = root.as_ref().to_path_buf();
        let pages_dir = root.join(&config.pages_dir);
        let static_dir = root.join(&config.static_dir);
        let template_path = pages_dir.join(&config.template);

        Self {
            config,
            root,
            pages_dir,
            static_dir,
            template_path,
        }
    }

    /// Render a single page, outside of any server
    pub fn render_page(&self, key: &str) -> std::result::Result<String, PageError> {
        PageRenderer::new(self).render(key)
    }
}
