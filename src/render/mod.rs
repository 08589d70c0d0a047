//! Page renderer - composes metadata, content and template into a response body

use std::sync::Arc;

use crate::content::{ContentLoader, MarkdownRenderer, MetadataLoader, PageKey};
use crate::error::PageError;
use crate::templates::{PageData, TemplateLoader};
use crate::Site;

/// Renders pages for a site
///
/// Holds no per-page state: every call reloads metadata, content and the
/// template from disk, so the renderer can be shared across requests.
pub struct PageRenderer {
    metadata: MetadataLoader,
    content: ContentLoader,
    template: TemplateLoader,
}

impl PageRenderer {
    /// Create a renderer for a site
    pub fn new(site: &Site) -> Self {
        let markdown = Arc::new(MarkdownRenderer::with_config(
            &site.config.markdown,
            &site.config.highlight,
        ));
        let template = if site.config.template_cache {
            TemplateLoader::cached(&site.template_path)
        } else {
            TemplateLoader::new(&site.template_path)
        };

        Self {
            metadata: MetadataLoader::new(&site.pages_dir),
            content: ContentLoader::new(&site.pages_dir, markdown),
            template,
        }
    }

    /// Render the page for a raw key taken from a request
    pub fn render(&self, raw_key: &str) -> Result<String, PageError> {
        let key = PageKey::parse(raw_key)?;
        self.render_key(&key)
    }

    /// Render the page for a validated key
    ///
    /// Metadata, content and template are loaded in that order and the first
    /// failure is returned. Output is produced in full before returning, so a
    /// failed render never yields a partial page.
    pub fn render_key(&self, key: &PageKey) -> Result<String, PageError> {
        let metadata = self.metadata.load(key)?;
        let content = self.content.load(key)?;
        let template = self.template.load()?;

        let html = template.render(&PageData {
            metadata: &metadata,
            content: &content,
        })?;

        tracing::debug!("Rendered page {} ({} bytes)", key, html.len());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use std::path::Path;

    const TEMPLATE: &str = "<h1>{{ Metadata.title }}</h1>\n{{ Content }}";

    fn write_page(root: &Path, key: &str, metadata: Option<&str>, content: Option<&str>) {
        let page_dir = root.join("pages").join(key);
        fs::create_dir_all(&page_dir).unwrap();
        if let Some(metadata) = metadata {
            fs::write(page_dir.join("metadata.json"), metadata).unwrap();
        }
        if let Some(content) = content {
            fs::write(page_dir.join("content.md"), content).unwrap();
        }
    }

    fn setup(template: Option<&str>) -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        if let Some(template) = template {
            fs::write(dir.path().join("pages").join("template.html"), template).unwrap();
        }
        let site = Site::new(dir.path()).unwrap();
        (dir, site)
    }

    #[test]
    fn test_render_page() {
        let (dir, site) = setup(Some(TEMPLATE));
        write_page(dir.path(), "foo", Some(r#"{"title":"Hello"}"#), Some("**x**"));

        let html = PageRenderer::new(&site).render("foo").unwrap();
        assert_eq!(html, "<h1>Hello</h1>\n<p><strong>x</strong></p>\n");
    }

    #[test]
    fn test_missing_pieces_are_not_found() {
        let (dir, site) = setup(Some(TEMPLATE));
        write_page(dir.path(), "no-meta", None, Some("x"));
        write_page(dir.path(), "no-content", Some("{}"), None);
        let renderer = PageRenderer::new(&site);

        for key in ["no-meta", "no-content", "no-such-page"] {
            assert_eq!(renderer.render(key).unwrap_err().kind(), ErrorKind::NotFound, "{key}");
        }
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let (dir, site) = setup(None);
        write_page(dir.path(), "foo", Some(r#"{"title":"Hello"}"#), Some("x"));

        let err = PageRenderer::new(&site).render("foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_metadata_failure_short_circuits() {
        // Both metadata and template are broken; metadata is reported first
        let (dir, site) = setup(Some("{{ broken"));
        write_page(dir.path(), "foo", Some("{not json"), Some("x"));

        let err = PageRenderer::new(&site).render("foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedMetadata);
    }

    #[test]
    fn test_content_checked_before_template() {
        let (dir, site) = setup(Some("{{ broken"));
        write_page(dir.path(), "foo", Some("{}"), None);

        let err = PageRenderer::new(&site).render("foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_template_errors() {
        let (dir, site) = setup(Some("{% if %}"));
        write_page(dir.path(), "foo", Some("{}"), Some("x"));
        let err = PageRenderer::new(&site).render("foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateSyntax);

        fs::write(dir.path().join("pages").join("template.html"), TEMPLATE).unwrap();
        let err = PageRenderer::new(&site).render("foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenderExecution);
    }

    #[test]
    fn test_traversal_key_is_rejected_before_io() {
        let (dir, site) = setup(Some(TEMPLATE));
        // A page that would be reachable via "../pages/foo" if keys were not validated
        write_page(dir.path(), "foo", Some(r#"{"title":"Hello"}"#), Some("x"));

        let err = PageRenderer::new(&site).render("../pages/foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }
}
