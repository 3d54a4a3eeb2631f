//! Markdown → HTML fragment → complete HTML document.
//!
//! Fenced code is highlighted by syntect through comrak's adapter in
//! CSS-class mode: the fragment carries class names only, and the colours
//! come from one stylesheet generated from the selected theme. The same
//! Markdown and theme always produce byte-identical HTML.

use crate::error::DocStudioError;
use comrak::plugins::syntect::{SyntectAdapter, SyntectAdapterBuilder};
use comrak::{markdown_to_html_with_plugins, Options, Plugins};
use once_cell::sync::Lazy;
use regex::Regex;
use syntect::highlighting::{Color, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle};
use tracing::debug;

/// Highlight theme used when none is configured.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// `<title>` used when the document has no top-level heading.
pub const DEFAULT_TITLE: &str = "DocStudio Document";

static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

static ADAPTER: Lazy<SyntectAdapter> = Lazy::new(|| SyntectAdapterBuilder::new().css().build());

static RE_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[ \t]+(.+?)[ \t#]*$").unwrap());

/// Typography and layout shared by every document.
const BASE_CSS: &str = r#"        body { font-family: 'Segoe UI', sans-serif; padding: 20px; line-height: 1.5; }
        pre { border-radius: 8px; padding: 12px; overflow-x: auto; }
        code { font-family: 'Consolas', 'Menlo', monospace; }
        table { border-collapse: collapse; }
        th, td { border: 1px solid #ccc; padding: 4px 8px; }
        img { max-width: 100%; }"#;

/// Names of the built-in highlight themes, sorted.
pub fn theme_names() -> Vec<&'static str> {
    THEMES.themes.keys().map(String::as_str).collect()
}

pub fn is_known_theme(name: &str) -> bool {
    THEMES.themes.contains_key(name)
}

fn comrak_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    // Raw HTML in the source passes through, as in the editor preview.
    options.render.unsafe_ = true;
    options
}

/// Convert Markdown to an HTML fragment with highlighted fenced code.
pub fn render_fragment(markdown: &str) -> String {
    let options = comrak_options();
    let mut plugins = Plugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&*ADAPTER);

    let html = markdown_to_html_with_plugins(markdown, &options, &plugins);
    debug!("Rendered {} bytes of Markdown → {} bytes of HTML", markdown.len(), html.len());
    html
}

/// Stylesheet for highlighted code blocks in the given theme.
pub fn highlight_css(theme_name: &str) -> Result<String, DocStudioError> {
    let theme = THEMES.themes.get(theme_name).ok_or_else(|| {
        DocStudioError::InvalidConfig(format!("Unknown highlight theme '{theme_name}'"))
    })?;

    let classes = css_for_theme_with_class_style(theme, ClassStyle::Spaced)
        .map_err(|e| DocStudioError::Internal(format!("highlight stylesheet: {e}")))?;

    let mut css = String::from("        pre {");
    if let Some(bg) = theme.settings.background {
        css.push_str(&format!(" background-color: {};", css_color(bg)));
    }
    if let Some(fg) = theme.settings.foreground {
        css.push_str(&format!(" color: {};", css_color(fg)));
    }
    css.push_str(" }\n");
    css.push_str(&classes);
    Ok(css)
}

fn css_color(c: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

/// Text of the first level-one ATX heading outside fenced code, if any.
pub fn extract_title(markdown: &str) -> Option<String> {
    let mut in_fence = false;
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = RE_H1.captures(line) {
            let title = caps[1].trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}

/// Wrap a fragment in the fixed document template.
pub fn wrap_document(fragment: &str, title: &str, code_css: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="docstudio">
    <title>{title}</title>
    <style>
{base_css}
{code_css}
    </style>
</head>
<body>
{body}</body>
</html>
"#,
        title = html_escape(title),
        base_css = BASE_CSS,
        code_css = code_css,
        body = fragment,
    )
}

/// Render Markdown to `(fragment, full document)`.
pub fn render_document(markdown: &str, theme_name: &str) -> Result<(String, String), DocStudioError> {
    let fragment = render_fragment(markdown);
    let css = highlight_css(theme_name)?;
    let title = extract_title(markdown).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let html = wrap_document(&fragment, &title, &css);
    Ok((fragment, html))
}

/// Escape HTML special characters.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Hello\n\n```python\nprint(1)\n```";

    #[test]
    fn heading_and_highlighted_code() {
        let fragment = render_fragment(SAMPLE);
        assert!(fragment.contains("<h1>Hello</h1>"), "got: {fragment}");
        assert!(fragment.contains("<pre"), "got: {fragment}");
        assert!(fragment.contains("print"));
        assert!(fragment.contains('1'));
        assert!(fragment.contains("<span class="), "code should be tokenised: {fragment}");
        assert!(!fragment.contains("```"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let (_, a) = render_document(SAMPLE, DEFAULT_THEME).unwrap();
        let (_, b) = render_document(SAMPLE, DEFAULT_THEME).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn document_has_fixed_styles() {
        let (fragment, html) = render_document(SAMPLE, DEFAULT_THEME).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("font-family: 'Segoe UI', sans-serif; padding: 20px;"));
        assert!(html.contains("border-radius: 8px"));
        assert!(html.contains("background-color: #"));
        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains(&fragment));
    }

    #[test]
    fn gfm_extensions_enabled() {
        let fragment = render_fragment("| A | B |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n\n~~old~~");
        assert!(fragment.contains("<table>"));
        assert!(fragment.contains("type=\"checkbox\""));
        assert!(fragment.contains("<del>old</del>"));
    }

    #[test]
    fn title_extraction() {
        assert_eq!(extract_title("# My Doc\n\ntext"), Some("My Doc".into()));
        assert_eq!(extract_title("intro\n# Later ##\n"), Some("Later".into()));
        assert_eq!(extract_title("## Only h2\n"), None);
        assert_eq!(extract_title("#hashtag"), None);
        assert_eq!(
            extract_title("```python\n# comment\n```\n# Real\n"),
            Some("Real".into())
        );
    }

    #[test]
    fn title_is_escaped() {
        let (_, html) = render_document("# <b>&</b>", DEFAULT_THEME).unwrap();
        assert!(html.contains("<title>&lt;b&gt;&amp;&lt;/b&gt;</title>"));
    }

    #[test]
    fn default_title_without_heading() {
        let (_, html) = render_document("plain text", DEFAULT_THEME).unwrap();
        assert!(html.contains(&format!("<title>{DEFAULT_TITLE}</title>")));
    }

    #[test]
    fn unknown_theme_errors() {
        assert!(highlight_css("nope").is_err());
        assert!(is_known_theme(DEFAULT_THEME));
        assert!(theme_names().contains(&"InspiredGitHub"));
    }

    #[test]
    fn themes_change_only_the_stylesheet() {
        let (frag_a, html_a) = render_document(SAMPLE, "base16-ocean.dark").unwrap();
        let (frag_b, html_b) = render_document(SAMPLE, "InspiredGitHub").unwrap();
        assert_eq!(frag_a, frag_b);
        assert_ne!(html_a, html_b);
    }
}
