//! Output types: artifacts, the per-run export report, and the ZIP bundle.

use crate::document::Document;
use crate::error::ExportError;
use crate::pipeline::encode;
use crate::pipeline::input::{ImagePreview, InputSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entry name of the Markdown source inside the bundle.
pub const MARKDOWN_FILENAME: &str = "doc.md";

/// Filename offered for the ZIP bundle.
pub const BUNDLE_FILENAME: &str = "docstudio_exports.zip";

/// MIME type of the ZIP bundle.
pub const BUNDLE_MIME: &str = "application/zip";

/// One exported representation of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Html,
    Pdf,
    Png,
}

impl ArtifactKind {
    /// Fixed filename used for downloads and bundle entries.
    pub fn filename(self) -> &'static str {
        match self {
            ArtifactKind::Html => "doc.html",
            ArtifactKind::Pdf => "doc.pdf",
            ArtifactKind::Png => "doc.png",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ArtifactKind::Html => "text/html",
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Png => "image/png",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactKind::Html => "HTML",
            ArtifactKind::Pdf => "PDF",
            ArtifactKind::Png => "PNG",
        })
    }
}

/// A tagged byte blob produced by one export channel.
#[derive(Clone, Serialize)]
pub struct ExportArtifact {
    pub kind: ArtifactKind,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub filename: String,
}

impl ExportArtifact {
    pub fn new(kind: ArtifactKind, content: Vec<u8>) -> Self {
        Self {
            kind,
            content,
            filename: kind.filename().to_string(),
        }
    }

    pub fn mime(&self) -> &'static str {
        self.kind.mime()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// `data:` URI suitable for an inline download link.
    pub fn data_uri(&self) -> String {
        encode::data_uri(self.mime(), &self.content)
    }

    /// Inline `<a download>` link, e.g. "Download PDF".
    pub fn download_link(&self) -> String {
        encode::download_link(
            self.mime(),
            &self.content,
            &self.filename,
            &format!("Download {}", self.kind),
        )
    }
}

impl fmt::Debug for ExportArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportArtifact")
            .field("kind", &self.kind)
            .field("filename", &self.filename)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Result of running every export channel once.
///
/// PDF and PNG are explicit options: an artifact is present if and only if
/// its conversion succeeded in this run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub html: ExportArtifact,
    pub pdf: Option<ExportArtifact>,
    pub png: Option<ExportArtifact>,
    pub failures: Vec<ExportError>,
}

impl ExportReport {
    /// Successful artifacts in bundle order (HTML, PDF, PNG).
    pub fn artifacts(&self) -> impl Iterator<Item = &ExportArtifact> {
        std::iter::once(&self.html)
            .chain(self.pdf.as_ref())
            .chain(self.png.as_ref())
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&ExportArtifact> {
        match kind {
            ArtifactKind::Html => Some(&self.html),
            ArtifactKind::Pdf => self.pdf.as_ref(),
            ArtifactKind::Png => self.png.as_ref(),
        }
    }

    pub fn failure(&self, kind: ArtifactKind) -> Option<&ExportError> {
        self.failures.iter().find(|e| e.kind() == kind)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// In-memory ZIP archive of the source and all successful artifacts.
#[derive(Clone, Serialize)]
pub struct ExportBundle {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub entries: Vec<String>,
    pub filename: String,
}

impl ExportBundle {
    pub fn mime(&self) -> &'static str {
        BUNDLE_MIME
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.iter().any(|e| e == entry)
    }

    pub fn download_link(&self) -> String {
        encode::download_link(BUNDLE_MIME, &self.bytes, &self.filename, "Download All as ZIP")
    }
}

impl fmt::Debug for ExportBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportBundle")
            .field("filename", &self.filename)
            .field("entries", &self.entries)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Timing and size statistics for one interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub markdown_bytes: usize,
    pub html_bytes: usize,
    pub exported: usize,
    pub failed: usize,
    pub render_duration_ms: u64,
    pub export_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything one pass of the pipeline produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    pub source: InputSource,
    pub document: Document,
    pub report: ExportReport,
    pub bundle: ExportBundle,
    pub image: Option<ImagePreview>,
    pub stats: ConversionStats,
}

/// What one interaction hands back to the host.
///
/// An uploaded image is shown whether or not there is Markdown to render,
/// so [`ConversionOutcome::Empty`] still carries its preview.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// No Markdown: nothing was rendered or exported.
    Empty { image: Option<ImagePreview> },
    Rendered(ConversionOutput),
}

impl ConversionOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, ConversionOutcome::Empty { .. })
    }

    /// The uploaded image preview, if any.
    pub fn image(&self) -> Option<&ImagePreview> {
        match self {
            ConversionOutcome::Empty { image } => image.as_ref(),
            ConversionOutcome::Rendered(output) => output.image.as_ref(),
        }
    }

    pub fn output(&self) -> Option<&ConversionOutput> {
        match self {
            ConversionOutcome::Empty { .. } => None,
            ConversionOutcome::Rendered(output) => Some(output),
        }
    }

    pub fn into_output(self) -> Option<ConversionOutput> {
        match self {
            ConversionOutcome::Empty { .. } => None,
            ConversionOutcome::Rendered(output) => Some(output),
        }
    }

    /// The Markdown the host keeps as its buffer for the next interaction.
    pub fn markdown(&self) -> &str {
        self.output().map(|o| o.document.markdown()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(pdf: bool, png: bool) -> ExportReport {
        ExportReport {
            html: ExportArtifact::new(ArtifactKind::Html, b"<html></html>".to_vec()),
            pdf: pdf.then(|| ExportArtifact::new(ArtifactKind::Pdf, b"%PDF-1.4".to_vec())),
            png: png.then(|| ExportArtifact::new(ArtifactKind::Png, vec![0x89, b'P'])),
            failures: Vec::new(),
        }
    }

    #[test]
    fn fixed_filenames_and_mimes() {
        assert_eq!(ArtifactKind::Html.filename(), "doc.html");
        assert_eq!(ArtifactKind::Pdf.filename(), "doc.pdf");
        assert_eq!(ArtifactKind::Png.filename(), "doc.png");
        assert_eq!(ArtifactKind::Html.mime(), "text/html");
        assert_eq!(ArtifactKind::Pdf.mime(), "application/pdf");
        assert_eq!(ArtifactKind::Png.mime(), "image/png");
        assert_eq!(BUNDLE_FILENAME, "docstudio_exports.zip");
    }

    #[test]
    fn artifacts_skip_missing_channels() {
        let kinds: Vec<_> = report(false, true).artifacts().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ArtifactKind::Html, ArtifactKind::Png]);

        let all: Vec<_> = report(true, true).artifacts().map(|a| a.kind).collect();
        assert_eq!(all, vec![ArtifactKind::Html, ArtifactKind::Pdf, ArtifactKind::Png]);
    }

    #[test]
    fn download_links_carry_filename_and_label() {
        let pdf = ExportArtifact::new(ArtifactKind::Pdf, b"%PDF".to_vec());
        let link = pdf.download_link();
        assert!(link.starts_with(r#"<a href="data:application/pdf;base64,JVBERg==""#));
        assert!(link.contains(r#"download="doc.pdf""#));
        assert!(link.ends_with(">Download PDF</a>"));

        let bundle = ExportBundle {
            bytes: vec![1, 2, 3],
            entries: vec!["doc.md".into()],
            filename: BUNDLE_FILENAME.into(),
        };
        assert!(bundle.download_link().contains("data:application/zip;base64,AQID"));
    }

    #[test]
    fn get_and_failure_lookup() {
        let mut r = report(false, false);
        r.failures.push(ExportError::ConverterUnavailable {
            kind: ArtifactKind::Pdf,
            program: "wkhtmltopdf".into(),
            detail: "not found".into(),
        });
        assert!(r.get(ArtifactKind::Html).is_some());
        assert!(r.get(ArtifactKind::Pdf).is_none());
        assert!(r.failure(ArtifactKind::Pdf).is_some());
        assert!(r.failure(ArtifactKind::Png).is_none());
        assert!(r.has_failures());
    }

    #[test]
    fn artifact_data_uri_uses_mime() {
        let a = ExportArtifact::new(ArtifactKind::Png, vec![1, 2, 3]);
        assert_eq!(a.data_uri(), "data:image/png;base64,AQID");
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn report_json_omits_bytes() {
        let json = serde_json::to_string(&report(true, false)).expect("serialise");
        assert!(json.contains("\"filename\":\"doc.pdf\""));
        assert!(!json.contains("content"));
    }

    #[test]
    fn empty_outcome_keeps_image_preview() {
        let outcome = ConversionOutcome::Empty {
            image: Some(ImagePreview {
                name: "shot.png".into(),
                mime: "image/png",
                width: 3,
                height: 2,
                data_uri: "data:image/png;base64,".into(),
            }),
        };
        assert!(outcome.is_empty());
        assert!(outcome.output().is_none());
        assert_eq!(outcome.markdown(), "");
        assert_eq!(outcome.image().map(|i| i.name.as_str()), Some("shot.png"));

        let json = serde_json::to_string(&outcome).expect("serialise");
        assert!(json.contains("\"status\":\"empty\""));
        assert!(json.contains("\"width\":3"));
    }
}
