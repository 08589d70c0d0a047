//! Page template loading using the Tera template engine
//!
//! A single shared template lives at `<pages_dir>/template.html`. It sees two
//! names: `Metadata`, the page's JSON object, and `Content`, the rendered
//! markdown body. Autoescaping is off, so `{{ Content }}` is inserted as-is.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use serde::Serialize;
use tera::{Context, Tera};

use crate::content::Metadata;
use crate::error::PageError;

/// Name under which the template is registered with Tera
const TEMPLATE_NAME: &str = "page";

/// Data the page template is executed against
#[derive(Debug, Serialize)]
pub struct PageData<'a> {
    #[serde(rename = "Metadata")]
    pub metadata: &'a Metadata,
    #[serde(rename = "Content")]
    pub content: &'a str,
}

/// A parsed page template
#[derive(Debug)]
pub struct PageTemplate {
    tera: Tera,
}

impl PageTemplate {
    /// Parse template source
    pub fn parse(path: &Path, source: &str) -> Result<Self, PageError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(TEMPLATE_NAME, source)
            .map_err(|e| PageError::TemplateSyntax {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self { tera })
    }

    /// Execute the template against page data
    pub fn render(&self, data: &PageData<'_>) -> Result<String, PageError> {
        let context = Context::from_serialize(data).map_err(PageError::RenderExecution)?;
        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(PageError::RenderExecution)
    }
}

/// Identity of a template file on disk, used to detect edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: SystemTime,
    len: u64,
}

/// Loads the shared page template, optionally caching it between requests
pub struct TemplateLoader {
    path: PathBuf,
    cache: Option<Mutex<Option<(Stamp, Arc<PageTemplate>)>>>,
}

impl TemplateLoader {
    /// Loader that reads and parses the template on every call
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: None,
        }
    }

    /// Loader that reuses the parsed template until the file's mtime or size changes
    pub fn cached<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: Some(Mutex::new(None)),
        }
    }

    /// Load the template
    pub fn load(&self) -> Result<Arc<PageTemplate>, PageError> {
        let Some(cache) = &self.cache else {
            return self.read_and_parse().map(Arc::new);
        };

        let metadata = fs::metadata(&self.path).map_err(|e| PageError::not_found(&self.path, e))?;
        let stamp = metadata.modified().ok().map(|modified| Stamp {
            modified,
            len: metadata.len(),
        });

        // A poisoned lock only means another request panicked mid-update
        let mut slot = cache.lock().unwrap_or_else(|e| e.into_inner());
        if let (Some(stamp), Some((cached, template))) = (stamp, slot.as_ref()) {
            if *cached == stamp {
                return Ok(Arc::clone(template));
            }
        }

        let template = Arc::new(self.read_and_parse()?);
        match stamp {
            Some(stamp) => *slot = Some((stamp, Arc::clone(&template))),
            None => *slot = None,
        }
        tracing::debug!("Parsed template {:?}", self.path);
        Ok(template)
    }

    fn read_and_parse(&self) -> Result<PageTemplate, PageError> {
        let source =
            fs::read_to_string(&self.path).map_err(|e| PageError::not_found(&self.path, e))?;
        PageTemplate::parse(&self.path, &source)
    }
}
