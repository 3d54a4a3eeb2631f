//! The rendered document value passed through the pipeline.

use crate::config::StudioConfig;
use crate::error::DocStudioError;
use crate::pipeline::render;
use serde::Serialize;

/// Markdown source plus the HTML derived from it.
///
/// The Markdown is the source of truth. HTML is only ever produced by
/// [`Document::render`], so a `Document` can never hold HTML that disagrees
/// with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    markdown: String,
    fragment: String,
    html: String,
}

impl Document {
    /// Render `markdown` with the configured highlight theme.
    pub fn render(markdown: impl Into<String>, config: &StudioConfig) -> Result<Self, DocStudioError> {
        let markdown = markdown.into();
        let (fragment, html) = render::render_document(&markdown, &config.highlight_theme)?;
        Ok(Self {
            markdown,
            fragment,
            html,
        })
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// HTML produced directly from the Markdown, before template wrapping.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// The complete HTML document.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn is_empty(&self) -> bool {
        self.markdown.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_keeps_source_verbatim() {
        let src = "# Title\r\n\r\nBody \u{1F600}\n";
        let doc = Document::render(src, &StudioConfig::default()).unwrap();
        assert_eq!(doc.markdown(), src);
        assert!(doc.html().contains(doc.fragment()));
    }

    #[test]
    fn same_markdown_same_document() {
        let config = StudioConfig::default();
        let a = Document::render("*x*", &config).unwrap();
        let b = Document::render("*x*", &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let mut config = StudioConfig::default();
        config.highlight_theme = "missing".into();
        assert!(Document::render("# x", &config).is_err());
    }
}
