//! Input resolution: pick the one Markdown text this interaction renders.
//!
//! A host offers two inputs, a pasted text buffer and an optional upload. An
//! uploaded Markdown file that decodes to non-empty text wins and becomes the
//! new buffer; an uploaded image is decoded for display only and leaves the
//! Markdown alone. The host keeps the returned text as its session buffer and
//! passes it back in as `pasted` on the next interaction.

use crate::error::DocStudioError;
use crate::pipeline::{encode, render};
use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// What an upload is, judged by its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Markdown,
    Image,
}

/// Classify an upload name. Extensions are compared case-insensitively.
pub fn classify(name: &str) -> Option<UploadKind> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())?;
    match ext.as_str() {
        "md" | "markdown" => Some(UploadKind::Markdown),
        "png" | "jpg" | "jpeg" => Some(UploadKind::Image),
        _ => None,
    }
}

/// A file the user uploaded, held in memory.
#[derive(Clone)]
pub struct Upload {
    name: String,
    bytes: Vec<u8>,
    kind: UploadKind,
}

impl Upload {
    /// Wrap in-memory bytes, rejecting unsupported file types.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DocStudioError> {
        let name = name.into();
        let kind = classify(&name).ok_or_else(|| DocStudioError::UnsupportedUpload {
            name: name.clone(),
        })?;
        Ok(Self { name, bytes, kind })
    }

    /// Read an upload from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocStudioError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if classify(&name).is_none() {
            return Err(DocStudioError::UnsupportedUpload { name });
        }

        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => DocStudioError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DocStudioError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;

        debug!("Read upload {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(name, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UploadKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Where the effective Markdown came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InputSource {
    Pasted,
    Uploaded { name: String },
}

/// An uploaded image, decoded for display.
#[derive(Debug, Clone, Serialize)]
pub struct ImagePreview {
    pub name: String,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub data_uri: String,
}

impl ImagePreview {
    /// `<img>` element with the image inlined.
    pub fn to_html(&self) -> String {
        format!(
            r#"<img src="{}" alt="{}" width="{}" height="{}">"#,
            self.data_uri,
            render::html_escape(&self.name),
            self.width,
            self.height
        )
    }
}

/// The outcome of input resolution for one interaction.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    /// The effective Markdown. The host stores this as its new buffer.
    pub markdown: String,
    pub source: InputSource,
    pub image: Option<ImagePreview>,
}

impl ResolvedInput {
    /// `true` when there is nothing to render or export.
    pub fn is_empty(&self) -> bool {
        self.markdown.is_empty()
    }
}

/// Resolve the effective Markdown from the pasted buffer and an optional upload.
///
/// # Errors
/// - [`DocStudioError::Decode`] if an uploaded Markdown file is not UTF-8
/// - [`DocStudioError::InvalidImage`] if an uploaded image cannot be decoded
pub fn resolve_input(pasted: &str, upload: Option<&Upload>) -> Result<ResolvedInput, DocStudioError> {
    let mut resolved = ResolvedInput {
        markdown: pasted.to_string(),
        source: InputSource::Pasted,
        image: None,
    };

    let Some(upload) = upload else {
        return Ok(resolved);
    };

    match upload.kind() {
        UploadKind::Markdown => {
            let text = decode_markdown(upload)?;
            if text.is_empty() {
                debug!("Uploaded {} is empty; keeping pasted text", upload.name());
            } else {
                info!("Using uploaded Markdown: {} ({} bytes)", upload.name(), text.len());
                resolved.markdown = text;
                resolved.source = InputSource::Uploaded {
                    name: upload.name().to_string(),
                };
            }
        }
        UploadKind::Image => {
            let preview = decode_image(upload)?;
            info!(
                "Uploaded image {}: {}x{} {}",
                preview.name, preview.width, preview.height, preview.mime
            );
            resolved.image = Some(preview);
        }
    }

    Ok(resolved)
}

/// Strict UTF-8 decode of an uploaded Markdown file.
fn decode_markdown(upload: &Upload) -> Result<String, DocStudioError> {
    String::from_utf8(upload.bytes().to_vec()).map_err(|e| DocStudioError::Decode {
        name: upload.name().to_string(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

fn decode_image(upload: &Upload) -> Result<ImagePreview, DocStudioError> {
    let invalid = |detail: String| DocStudioError::InvalidImage {
        name: upload.name().to_string(),
        detail,
    };

    let format = image::guess_format(upload.bytes()).map_err(|e| invalid(e.to_string()))?;
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        other => return Err(invalid(format!("unsupported image format {other:?}"))),
    };
    let img = image::load_from_memory_with_format(upload.bytes(), format)
        .map_err(|e| invalid(e.to_string()))?;

    Ok(ImagePreview {
        name: upload.name().to_string(),
        mime,
        width: img.width(),
        height: img.height(),
        data_uri: encode::data_uri(mime, upload.bytes()),
    })
}
