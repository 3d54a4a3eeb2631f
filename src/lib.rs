//! # docstudio
//!
//! Render Markdown into a styled HTML document and export it as HTML, PDF,
//! PNG and a ZIP bundle.
//!
//! Rendering is done in-process with `comrak` (GFM) and `syntect` (fenced code
//! highlighting). PDF and PNG are produced by external converters:
//! `wkhtmltopdf`, and either `wkhtmltoimage` or a headless Chromium. Each
//! converter is optional at runtime: if one is missing or fails, that format
//! is reported as failed and everything else still ships.
//!
//! ## Pipeline Overview
//!
//! ```text
//! pasted text / upload
//!  │
//!  ├─ 1. Input    uploaded .md overrides the pasted buffer; images are preview-only
//!  ├─ 2. Render   Markdown → highlighted fragment → fixed HTML template
//!  ├─ 3. Export   HTML (identity) · PDF (wkhtmltopdf) · PNG (wkhtmltoimage | browser)
//!  └─ 4. Archive  doc.md + doc.html + whatever succeeded → docstudio_exports.zip
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docstudio::{convert, ConversionOutcome, StudioConfig, EMPTY_INPUT_PROMPT};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StudioConfig::default();
//!     match convert("# Hello\n\n```rust\nfn main() {}\n```", None, &config).await? {
//!         ConversionOutcome::Rendered(output) => {
//!             for failure in &output.report.failures {
//!                 eprintln!("warning: {failure}");
//!             }
//!             std::fs::write(&output.bundle.filename, &output.bundle.bytes)?;
//!         }
//!         ConversionOutcome::Empty { .. } => println!("{EMPTY_INPUT_PROMPT}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docstudio` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportSelection, ImageBackend, StudioConfig, StudioConfigBuilder};
pub use convert::{
    convert, convert_sync, convert_to_dir, write_outputs, OutputFiles, EMPTY_INPUT_PROMPT,
};
pub use document::Document;
pub use error::{DocStudioError, ExportError};
pub use output::{
    ArtifactKind, ConversionOutcome, ConversionOutput, ConversionStats, ExportArtifact,
    ExportBundle, ExportReport,
    BUNDLE_FILENAME, BUNDLE_MIME, MARKDOWN_FILENAME,
};
pub use pipeline::input::{resolve_input, ImagePreview, InputSource, ResolvedInput, Upload, UploadKind};
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback};
