//! Export channels: HTML (identity), PDF and PNG via external converters.
//!
//! Each channel is attempted on its own. A missing `wkhtmltopdf` or a crashing
//! browser turns into an [`ExportError`] for that channel alone; the other
//! channels and the bundle carry on. Channels run one after another, the
//! converters being slow external processes with nothing to share.
//!
//! The HTML is staged into a private [`TempDir`] and handed to the converter
//! as a file path, so relative assets resolve against a real directory and
//! no stdin/stdout pipe juggling is needed. The directory is removed when the
//! channel finishes, whether it succeeded or not.

use crate::config::{ImageBackend, StudioConfig};
use crate::document::Document;
use crate::error::ExportError;
use crate::output::{ArtifactKind, ExportArtifact, ExportReport};
use crate::progress::ExportProgressCallback;
use image::ImageFormat;
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Longest converter stderr excerpt kept in an error.
const STDERR_EXCERPT_CHARS: usize = 400;

/// Run every enabled export channel once.
pub async fn export_all(document: &Document, config: &StudioConfig) -> ExportReport {
    let cb = config.progress_callback.as_deref();
    let mut failures = Vec::new();

    if let Some(cb) = cb {
        cb.on_export_start(ArtifactKind::Html);
    }
    let html = export_html(document);
    if let Some(cb) = cb {
        cb.on_export_complete(ArtifactKind::Html, html.len());
    }

    let pdf = if config.exports.pdf {
        attempt(ArtifactKind::Pdf, export_pdf(document, config), cb, &mut failures).await
    } else {
        debug!("PDF export disabled");
        None
    };

    let png = if config.exports.png {
        attempt(ArtifactKind::Png, export_png(document, config), cb, &mut failures).await
    } else {
        debug!("PNG export disabled");
        None
    };

    ExportReport {
        html,
        pdf,
        png,
        failures,
    }
}

async fn attempt(
    kind: ArtifactKind,
    export: impl Future<Output = Result<ExportArtifact, ExportError>>,
    cb: Option<&dyn ExportProgressCallback>,
    failures: &mut Vec<ExportError>,
) -> Option<ExportArtifact> {
    if let Some(cb) = cb {
        cb.on_export_start(kind);
    }
    match export.await {
        Ok(artifact) => {
            info!("Exported {} ({} bytes)", artifact.filename, artifact.len());
            if let Some(cb) = cb {
                cb.on_export_complete(kind, artifact.len());
            }
            Some(artifact)
        }
        Err(e) => {
            warn!("{}", e);
            if let Some(cb) = cb {
                cb.on_export_failed(kind, &e);
            }
            failures.push(e);
            None
        }
    }
}

/// The HTML export is the rendered document itself.
pub fn export_html(document: &Document) -> ExportArtifact {
    ExportArtifact::new(ArtifactKind::Html, document.html().as_bytes().to_vec())
}

/// Render the document to PDF with `wkhtmltopdf`.
pub async fn export_pdf(document: &Document, config: &StudioConfig) -> Result<ExportArtifact, ExportError> {
    let kind = ArtifactKind::Pdf;
    let program = &config.wkhtmltopdf_path;
    let staged = stage(kind, program, document).await?;

    let args: Vec<OsString> = vec![
        "--quiet".into(),
        "--page-size".into(),
        config.page_size.clone().into(),
        "--dpi".into(),
        config.dpi.to_string().into(),
        "--disable-smart-shrinking".into(),
        "--enable-local-file-access".into(),
        staged.html_path.clone().into(),
        "-".into(),
    ];

    let bytes = run(kind, program, args).await?;
    if !bytes.starts_with(b"%PDF") {
        return Err(failure(kind, program, "produced output that is not a PDF"));
    }
    Ok(ExportArtifact::new(kind, bytes))
}

/// Capture the document as a PNG with the configured backend.
pub async fn export_png(document: &Document, config: &StudioConfig) -> Result<ExportArtifact, ExportError> {
    let kind = ArtifactKind::Png;
    let program = config.image_program();
    let staged = stage(kind, program, document).await?;

    let bytes = match config.image_backend {
        ImageBackend::Wkhtmltoimage => {
            let args: Vec<OsString> = vec![
                "--quiet".into(),
                "--format".into(),
                "png".into(),
                "--enable-local-file-access".into(),
                "--width".into(),
                config.image_width.to_string().into(),
                staged.html_path.clone().into(),
                "-".into(),
            ];
            run(kind, program, args).await?
        }
        ImageBackend::HeadlessBrowser => {
            let shot = staged.dir.path().join(kind.filename());
            let args: Vec<OsString> = vec![
                "--headless".into(),
                "--disable-gpu".into(),
                "--hide-scrollbars".into(),
                "--no-first-run".into(),
                format!("--window-size={},{}", config.image_width, config.image_height).into(),
                format!("--screenshot={}", shot.display()).into(),
                format!("file://{}", staged.html_path.display()).into(),
            ];
            run(kind, program, args).await?;
            tokio::fs::read(&shot)
                .await
                .map_err(|e| failure(kind, program, &format!("did not write a screenshot ({e})")))?
        }
    };

    if !matches!(image::guess_format(&bytes), Ok(ImageFormat::Png)) {
        return Err(failure(kind, program, "produced output that is not a PNG"));
    }
    Ok(ExportArtifact::new(kind, bytes))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The document written to a private temporary directory.
struct Staged {
    dir: TempDir,
    html_path: PathBuf,
}

async fn stage(kind: ArtifactKind, program: &Path, document: &Document) -> Result<Staged, ExportError> {
    let dir = TempDir::new().map_err(|e| failure(kind, program, &format!("could not stage HTML: {e}")))?;
    let html_path = dir.path().join(ArtifactKind::Html.filename());
    tokio::fs::write(&html_path, document.html())
        .await
        .map_err(|e| failure(kind, program, &format!("could not stage HTML: {e}")))?;
    Ok(Staged { dir, html_path })
}

/// Run a converter to completion and return its stdout.
async fn run(kind: ArtifactKind, program: &Path, args: Vec<OsString>) -> Result<Vec<u8>, ExportError> {
    debug!("Running {} {:?}", program.display(), args);

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                ExportError::ConverterUnavailable {
                    kind,
                    program: program.display().to_string(),
                    detail: e.to_string(),
                }
            }
            _ => failure(kind, program, &format!("could not be started: {e}")),
        })?;

    if !output.status.success() {
        let status = match output.status.code() {
            Some(code) => format!("exited with status {code}"),
            None => "was terminated by a signal".to_string(),
        };
        let stderr = excerpt(&String::from_utf8_lossy(&output.stderr));
        let detail = if stderr.is_empty() {
            status
        } else {
            format!("{status}: {stderr}")
        };
        return Err(failure(kind, program, &detail));
    }

    debug!("{} wrote {} bytes", program.display(), output.stdout.len());
    Ok(output.stdout)
}

fn failure(kind: ArtifactKind, program: &Path, detail: &str) -> ExportError {
    ExportError::ConversionFailure {
        kind,
        program: program.display().to_string(),
        detail: detail.to_string(),
    }
}

fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.chars().count() > STDERR_EXCERPT_CHARS {
        let cut: String = trimmed.chars().take(STDERR_EXCERPT_CHARS - 1).collect();
        format!("{cut}\u{2026}")
    } else {
        trimmed.to_string()
    }
}
