//! Markdown rendering with optional syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::{HighlightConfig, MarkdownConfig};

/// Syntect state, only built when highlighting is enabled
struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

/// Markdown renderer
///
/// Rendering is a pure function of the input text and the options fixed at
/// construction, so one renderer is shared by all requests.
pub struct MarkdownRenderer {
    options: Options,
    highlighter: Option<Highlighter>,
}

impl MarkdownRenderer {
    /// Create a renderer with the default extension set and no highlighting
    pub fn new() -> Self {
        Self::with_config(&MarkdownConfig::default(), &HighlightConfig::default())
    }

    /// Create with custom settings
    pub fn with_config(markdown: &MarkdownConfig, highlight: &HighlightConfig) -> Self {
        let mut options = Options::empty();
        if markdown.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if markdown.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if markdown.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if markdown.heading_ids {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        if markdown.definition_lists {
            options.insert(Options::ENABLE_DEFINITION_LIST);
        }

        let highlighter = highlight.enable.then(|| Highlighter {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: highlight.theme.clone(),
            line_numbers: highlight.line_number,
        });

        Self {
            options,
            highlighter,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        match &self.highlighter {
            Some(highlighter) => html::push_html(&mut html_output, highlighter.rewrite(parser)),
            None => html::push_html(&mut html_output, parser),
        }
        html_output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Replace fenced and indented code blocks with highlighted HTML
    fn rewrite<'a>(&self, parser: Parser<'a>) -> std::vec::IntoIter<Event<'a>> {
        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                _ => events.push(event),
            }
        }

        events.into_iter()
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }
}

/// Add line numbers to highlighted code
fn add_line_numbers(code: &str, lang: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();

    let gutter = (1..=lines.len())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        html_escape(lang),
        gutter,
        lines.join("\n")
    )
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_bold() {
        let renderer = MarkdownRenderer::new();
        assert_eq!(renderer.render("**x**"), "<p><strong>x</strong></p>\n");
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = MarkdownRenderer::new();
        let markdown = "# T\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~ \"quoted\"\n\n```\ncode\n```\n";
        let first = renderer.render(markdown);
        let second = renderer.render(markdown);
        assert_eq!(first, second);
        assert_eq!(first, MarkdownRenderer::new().render(markdown));
    }

    #[test]
    fn test_common_extensions() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a |\n|---|\n| 1 |\n\n~~old~~\n\n## Intro {#start}\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains(r#"<h2 id="start">Intro</h2>"#));
    }

    #[test]
    fn test_extensions_can_be_disabled() {
        let markdown = MarkdownConfig {
            tables: false,
            strikethrough: false,
            smart_punctuation: false,
            heading_ids: false,
            definition_lists: false,
        };
        let renderer = MarkdownRenderer::with_config(&markdown, &HighlightConfig::default());
        let html = renderer.render("~~old~~");
        assert!(!html.contains("<del>"));
        let html = renderer.render("Term\n: Definition\n");
        assert!(!html.contains("<dl>"));
    }

    #[test]
    fn test_definition_list() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Term\n: Definition\n");
        assert!(html.contains("<dl>"));
        assert!(html.contains("<dt>Term</dt>"));
        assert!(html.contains("Definition"));
    }

    #[test]
    fn test_plain_code_block_without_highlighting() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<code class="language-rust">"#));
        assert!(!html.contains("highlight"));
    }

    #[test]
    fn test_render_code_block_highlighted() {
        let highlight = HighlightConfig {
            enable: true,
            line_number: true,
            ..HighlightConfig::default()
        };
        let renderer = MarkdownRenderer::with_config(&MarkdownConfig::default(), &highlight);
        let html = renderer.render("```rust\nfn main() {}\n```\n\nafter");
        assert!(html.contains("highlight rust"));
        assert!(html.contains("line-number"));
        assert!(html.contains("<p>after</p>"));
    }
}
