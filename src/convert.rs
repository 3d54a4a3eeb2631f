//! Top-level entry points: one full pass of the pipeline per interaction.
//!
//! Resolve → Render → Export → Archive, top to bottom, with no state kept
//! between calls. The host owns the session buffer: it passes the previous
//! Markdown in as `pasted` and stores [`ConversionOutput::document`]'s
//! Markdown for next time.

use crate::config::StudioConfig;
use crate::document::Document;
use crate::error::DocStudioError;
use crate::output::{
    ArtifactKind, ConversionOutcome, ConversionOutput, ConversionStats, MARKDOWN_FILENAME,
};
use crate::pipeline::archive::build_bundle;
use crate::pipeline::export::export_all;
use crate::pipeline::input::{resolve_input, Upload};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Message a host shows instead of a preview when there is no Markdown.
pub const EMPTY_INPUT_PROMPT: &str = "Paste or upload Markdown to preview and export.";

/// Run the whole pipeline for one interaction.
///
/// # Arguments
/// * `pasted` — the current text buffer (the previous interaction's Markdown,
///   or whatever the user typed)
/// * `upload` — an optional uploaded Markdown file or image
/// * `config` — rendering and export configuration
///
/// # Returns
/// [`ConversionOutcome::Empty`] when the effective Markdown is empty: nothing
/// is rendered or exported and the host should show [`EMPTY_INPUT_PROMPT`],
/// next to the uploaded image preview if there is one.
/// [`ConversionOutcome::Rendered`] otherwise, even if the PDF or PNG channel
/// failed (check `output.report.failures`).
///
/// # Errors
/// Returns `Err(DocStudioError)` only for fatal errors:
/// - uploaded Markdown is not UTF-8, or an uploaded image cannot be decoded
/// - the in-memory ZIP could not be written
pub async fn convert(
    pasted: &str,
    upload: Option<&Upload>,
    config: &StudioConfig,
) -> Result<ConversionOutcome, DocStudioError> {
    let total_start = Instant::now();

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = resolve_input(pasted, upload)?;
    if resolved.is_empty() {
        info!("No Markdown to render");
        return Ok(ConversionOutcome::Empty {
            image: resolved.image,
        });
    }

    // ── Step 2: Render ───────────────────────────────────────────────────
    let render_start = Instant::now();
    let document = Document::render(resolved.markdown, config)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "Rendered {} bytes of Markdown in {}ms",
        document.markdown().len(),
        render_duration_ms
    );

    // ── Step 3: Export ───────────────────────────────────────────────────
    let export_start = Instant::now();
    let report = export_all(&document, config).await;
    let export_duration_ms = export_start.elapsed().as_millis() as u64;

    // ── Step 4: Archive ──────────────────────────────────────────────────
    let bundle = build_bundle(&document, &report)?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_bundle_complete(bundle.entries.len(), bundle.bytes.len());
    }

    let stats = ConversionStats {
        markdown_bytes: document.markdown().len(),
        html_bytes: document.html().len(),
        exported: report.artifacts().count(),
        failed: report.failures.len(),
        render_duration_ms,
        export_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} exported, {} failed, {}ms total",
        stats.exported, stats.failed, stats.total_duration_ms
    );

    Ok(ConversionOutcome::Rendered(ConversionOutput {
        source: resolved.source,
        document,
        report,
        bundle,
        image: resolved.image,
        stats,
    }))
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    pasted: &str,
    upload: Option<&Upload>,
    config: &StudioConfig,
) -> Result<ConversionOutcome, DocStudioError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocStudioError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(pasted, upload, config))
}

/// Which files [`write_outputs`] puts on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFiles {
    pub markdown: bool,
    pub artifacts: bool,
    pub bundle: bool,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            markdown: false,
            artifacts: true,
            bundle: true,
        }
    }
}

/// Write the outputs of a conversion into `dir`.
///
/// Uses atomic writes (temp file + rename) so a crash never leaves a
/// half-written artifact behind. Returns the paths written, in order.
pub async fn write_outputs(
    output: &ConversionOutput,
    dir: impl AsRef<Path>,
    files: OutputFiles,
) -> Result<Vec<PathBuf>, DocStudioError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DocStudioError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::new();

    if files.markdown {
        let path = dir.join(MARKDOWN_FILENAME);
        write_atomic(&path, output.document.markdown().as_bytes()).await?;
        written.push(path);
    }

    if files.artifacts {
        for kind in [ArtifactKind::Html, ArtifactKind::Pdf, ArtifactKind::Png] {
            if let Some(artifact) = output.report.get(kind) {
                let path = dir.join(&artifact.filename);
                write_atomic(&path, &artifact.content).await?;
                written.push(path);
            }
        }
    }

    if files.bundle {
        let path = dir.join(&output.bundle.filename);
        write_atomic(&path, &output.bundle.bytes).await?;
        written.push(path);
    }

    info!("Wrote {} files to {}", written.len(), dir.display());
    Ok(written)
}

/// Run the pipeline and write its outputs into `dir`.
///
/// Empty input writes nothing and returns an empty path list.
pub async fn convert_to_dir(
    pasted: &str,
    upload: Option<&Upload>,
    dir: impl AsRef<Path>,
    config: &StudioConfig,
) -> Result<(ConversionOutcome, Vec<PathBuf>), DocStudioError> {
    let outcome = convert(pasted, upload, config).await?;
    let written = match outcome.output() {
        Some(output) => write_outputs(output, dir, OutputFiles::default()).await?,
        None => Vec::new(),
    };
    Ok((outcome, written))
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DocStudioError> {
    let write_err = |e: std::io::Error| DocStudioError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
