//! Progress-callback trait for per-export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::StudioConfigBuilder::progress_callback`] to receive
//! events as the exporter works through each channel. PDF and image
//! converters are slow external processes, so a host usually wants to show a
//! spinner and report each failure inline as soon as it happens.
//!
//! # Example
//!
//! ```rust
//! use docstudio::{ArtifactKind, ExportError, ExportProgressCallback, StudioConfig};
//! use std::sync::Arc;
//!
//! struct Warnings;
//!
//! impl ExportProgressCallback for Warnings {
//!     fn on_export_failed(&self, kind: ArtifactKind, error: &ExportError) {
//!         eprintln!("warning: {kind}: {error}");
//!     }
//! }
//!
//! let config = StudioConfig::builder()
//!     .progress_callback(Arc::new(Warnings) as Arc<dyn ExportProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ExportError;
use crate::output::ArtifactKind;
use std::sync::Arc;

/// Called by the exporter as it processes each channel.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Channels run one after another, never concurrently.
pub trait ExportProgressCallback: Send + Sync {
    /// Called just before a converter is invoked.
    fn on_export_start(&self, kind: ArtifactKind) {
        let _ = kind;
    }

    /// Called when a channel produced its artifact.
    ///
    /// # Arguments
    /// * `kind`  — the export channel
    /// * `bytes` — size of the artifact
    fn on_export_complete(&self, kind: ArtifactKind, bytes: usize) {
        let _ = (kind, bytes);
    }

    /// Called when a channel failed. Sibling channels still run.
    fn on_export_failed(&self, kind: ArtifactKind, error: &ExportError) {
        let _ = (kind, error);
    }

    /// Called once the ZIP bundle has been written.
    ///
    /// # Arguments
    /// * `entries` — number of files in the bundle
    /// * `bytes`   — size of the archive
    fn on_bundle_complete(&self, entries: usize, bytes: usize) {
        let _ = (entries, bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::StudioConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;
