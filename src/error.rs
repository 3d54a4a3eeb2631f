//! Error types for the docstudio library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DocStudioError`] — **Fatal**: the interaction cannot proceed at all
//!   (upload is not valid UTF-8, image cannot be decoded, the in-memory ZIP
//!   writer failed). Returned as `Err(DocStudioError)` from the top-level
//!   `convert*` functions.
//!
//! * [`ExportError`] — **Non-fatal**: a single export channel (PDF or PNG)
//!   failed. Stored inside [`crate::output::ExportReport`] so the HTML export
//!   and the bundle still go out, and the host can tell the user exactly which
//!   format failed and why.

use crate::output::ArtifactKind;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docstudio library.
///
/// Per-format export failures use [`ExportError`] and are stored in
/// [`crate::output::ExportReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DocStudioError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Uploaded file was not found at the given path.
    #[error("Upload not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload is neither Markdown nor a supported image.
    #[error("Unsupported upload '{name}': expected .md, .markdown, .png, .jpg or .jpeg")]
    UnsupportedUpload { name: String },

    /// Uploaded Markdown is not valid UTF-8.
    #[error("Could not decode '{name}' as UTF-8: invalid byte sequence after {valid_up_to} bytes")]
    Decode { name: String, valid_up_to: usize },

    /// Uploaded image could not be decoded for display.
    #[error("Could not read image '{name}': {detail}")]
    InvalidImage { name: String, detail: String },

    // ── Bundle errors ─────────────────────────────────────────────────────
    /// Writing the in-memory ZIP archive failed.
    #[error("Failed to write '{entry}' into the export bundle: {detail}")]
    ArchiveIo { entry: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single export channel.
///
/// Stored in [`crate::output::ExportReport::failures`]. Sibling exports and
/// the bundle are unaffected.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ExportError {
    /// The external converter binary is missing or cannot be executed.
    #[error("{kind} export failed: converter '{program}' is unavailable ({detail})")]
    ConverterUnavailable {
        kind: ArtifactKind,
        program: String,
        detail: String,
    },

    /// The converter ran but did not produce a usable artifact.
    #[error("{kind} export failed: '{program}' {detail}")]
    ConversionFailure {
        kind: ArtifactKind,
        program: String,
        detail: String,
    },
}

impl ExportError {
    /// Which export channel this failure belongs to.
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ExportError::ConverterUnavailable { kind, .. }
            | ExportError::ConversionFailure { kind, .. } => *kind,
        }
    }

    /// Short hint the host can show next to the warning.
    pub fn hint(&self) -> &'static str {
        match (self, self.kind()) {
            (ExportError::ConverterUnavailable { .. }, ArtifactKind::Pdf) => {
                "Ensure wkhtmltopdf is installed or pass --wkhtmltopdf <PATH>."
            }
            (ExportError::ConverterUnavailable { .. }, _) => {
                "Install the image converter or point --wkhtmltoimage / --browser at it."
            }
            (ExportError::ConversionFailure { .. }, _) => {
                "Run with --verbose to see the converter output."
            }
        }
    }
}
