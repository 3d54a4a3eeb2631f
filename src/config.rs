//! Configuration types for rendering and exporting a document.
//!
//! All pipeline behaviour is controlled through [`StudioConfig`], built via
//! its [`StudioConfigBuilder`]. The image-export backend is chosen here, once,
//! at startup; the rest of the pipeline never branches on which front-end is
//! driving it.

use crate::error::DocStudioError;
use crate::pipeline::render;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for one render-and-export pass.
///
/// Built via [`StudioConfig::builder()`] or using
/// [`StudioConfig::default()`].
///
/// # Example
/// ```rust
/// use docstudio::{ImageBackend, StudioConfig};
///
/// let config = StudioConfig::builder()
///     .image_backend(ImageBackend::HeadlessBrowser)
///     .page_size("Letter")
///     .dpi(150)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct StudioConfig {
    /// Which tool captures the PNG export. Default: [`ImageBackend::Wkhtmltoimage`].
    pub image_backend: ImageBackend,

    /// Path or name of the `wkhtmltopdf` binary. Default: `wkhtmltopdf` (PATH lookup).
    pub wkhtmltopdf_path: PathBuf,

    /// Path or name of the `wkhtmltoimage` binary. Default: `wkhtmltoimage`.
    pub wkhtmltoimage_path: PathBuf,

    /// Path or name of the Chromium-family browser. Default: `chromium`.
    pub browser_path: PathBuf,

    /// PDF page size passed to `--page-size`. Default: `A4`.
    pub page_size: String,

    /// PDF rendering resolution. Range: 72–1200. Default: 300.
    pub dpi: u32,

    /// Width of the captured image in pixels. Default: 1024.
    pub image_width: u32,

    /// Viewport height for the headless-browser screenshot. Default: 1400.
    ///
    /// `wkhtmltoimage` always captures the full page and ignores this.
    pub image_height: u32,

    /// syntect theme used for the code-block stylesheet. Default: `base16-ocean.dark`.
    pub highlight_theme: String,

    /// Which optional export channels to attempt.
    pub exports: ExportSelection,

    /// Receives per-export events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            image_backend: ImageBackend::default(),
            wkhtmltopdf_path: PathBuf::from("wkhtmltopdf"),
            wkhtmltoimage_path: PathBuf::from("wkhtmltoimage"),
            browser_path: PathBuf::from("chromium"),
            page_size: "A4".to_string(),
            dpi: 300,
            image_width: 1024,
            image_height: 1400,
            highlight_theme: render::DEFAULT_THEME.to_string(),
            exports: ExportSelection::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for StudioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudioConfig")
            .field("image_backend", &self.image_backend)
            .field("wkhtmltopdf_path", &self.wkhtmltopdf_path)
            .field("wkhtmltoimage_path", &self.wkhtmltoimage_path)
            .field("browser_path", &self.browser_path)
            .field("page_size", &self.page_size)
            .field("dpi", &self.dpi)
            .field("image_width", &self.image_width)
            .field("image_height", &self.image_height)
            .field("highlight_theme", &self.highlight_theme)
            .field("exports", &self.exports)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExportProgressCallback>"),
            )
            .finish()
    }
}

impl StudioConfig {
    /// Create a new builder for `StudioConfig`.
    pub fn builder() -> StudioConfigBuilder {
        StudioConfigBuilder {
            config: Self::default(),
        }
    }

    /// The binary that will be invoked for the PNG export.
    pub fn image_program(&self) -> &PathBuf {
        match self.image_backend {
            ImageBackend::Wkhtmltoimage => &self.wkhtmltoimage_path,
            ImageBackend::HeadlessBrowser => &self.browser_path,
        }
    }
}

/// Builder for [`StudioConfig`].
#[derive(Debug)]
pub struct StudioConfigBuilder {
    config: StudioConfig,
}

impl StudioConfigBuilder {
    pub fn image_backend(mut self, backend: ImageBackend) -> Self {
        self.config.image_backend = backend;
        self
    }

    pub fn wkhtmltopdf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wkhtmltopdf_path = path.into();
        self
    }

    pub fn wkhtmltoimage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wkhtmltoimage_path = path.into();
        self
    }

    pub fn browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser_path = path.into();
        self
    }

    pub fn page_size(mut self, size: impl Into<String>) -> Self {
        self.config.page_size = size.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn image_width(mut self, px: u32) -> Self {
        self.config.image_width = px.max(100);
        self
    }

    pub fn image_height(mut self, px: u32) -> Self {
        self.config.image_height = px.max(100);
        self
    }

    pub fn highlight_theme(mut self, theme: impl Into<String>) -> Self {
        self.config.highlight_theme = theme.into();
        self
    }

    pub fn exports(mut self, exports: ExportSelection) -> Self {
        self.config.exports = exports;
        self
    }

    pub fn pdf(mut self, enabled: bool) -> Self {
        self.config.exports.pdf = enabled;
        self
    }

    pub fn png(mut self, enabled: bool) -> Self {
        self.config.exports.png = enabled;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<StudioConfig, DocStudioError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 1200 {
            return Err(DocStudioError::InvalidConfig(format!(
                "DPI must be 72–1200, got {}",
                c.dpi
            )));
        }
        if c.page_size.trim().is_empty() {
            return Err(DocStudioError::InvalidConfig(
                "Page size must not be empty".into(),
            ));
        }
        if !render::is_known_theme(&c.highlight_theme) {
            return Err(DocStudioError::InvalidConfig(format!(
                "Unknown highlight theme '{}'. Available: {}",
                c.highlight_theme,
                render::theme_names().join(", ")
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Tool used to turn the HTML document into a PNG.
///
/// | Backend | Binary | Capture |
/// |---------|--------|---------|
/// | `Wkhtmltoimage` | `wkhtmltoimage` | full page, fixed width |
/// | `HeadlessBrowser` | `chromium --headless` | fixed viewport |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageBackend {
    /// Render with `wkhtmltoimage`. (default)
    #[default]
    Wkhtmltoimage,
    /// Screenshot with a headless Chromium-family browser.
    HeadlessBrowser,
}

/// Optional export channels. HTML is always exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSelection {
    pub pdf: bool,
    pub png: bool,
}

impl Default for ExportSelection {
    fn default() -> Self {
        Self {
            pdf: true,
            png: true,
        }
    }
}

impl ExportSelection {
    /// HTML only; no external converters are invoked.
    pub fn html_only() -> Self {
        Self {
            pdf: false,
            png: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StudioConfig::builder().build().expect("defaults build");
        assert_eq!(config.image_backend, ImageBackend::Wkhtmltoimage);
        assert_eq!(config.page_size, "A4");
        assert_eq!(config.dpi, 300);
        assert!(config.exports.pdf && config.exports.png);
    }

    #[test]
    fn rejects_out_of_range_dpi() {
        let err = StudioConfig::builder().dpi(10).build().unwrap_err();
        assert!(err.to_string().contains("DPI"));
    }

    #[test]
    fn rejects_unknown_theme() {
        let err = StudioConfig::builder()
            .highlight_theme("monokai-deluxe")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("monokai-deluxe"));
    }

    #[test]
    fn image_program_follows_backend() {
        let config = StudioConfig::builder()
            .image_backend(ImageBackend::HeadlessBrowser)
            .browser_path("/opt/chrome/chrome")
            .build()
            .unwrap();
        assert_eq!(config.image_program(), &PathBuf::from("/opt/chrome/chrome"));

        let config = StudioConfig::default();
        assert_eq!(config.image_program(), &PathBuf::from("wkhtmltoimage"));
    }

    #[test]
    fn image_dimensions_have_a_floor() {
        let config = StudioConfig::builder().image_width(3).image_height(0).build().unwrap();
        assert_eq!(config.image_width, 100);
        assert_eq!(config.image_height, 100);
    }

    #[test]
    fn html_only_selection() {
        let config = StudioConfig::builder()
            .exports(ExportSelection::html_only())
            .build()
            .unwrap();
        assert!(!config.exports.pdf);
        assert!(!config.exports.png);
    }
}
