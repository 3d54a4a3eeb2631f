//! Bundle the source and every successful artifact into one ZIP.
//!
//! Entry order is fixed (`doc.md`, `doc.html`, then `doc.pdf` / `doc.png`
//! when present) and every entry carries the same timestamp, so the same
//! inputs always produce the same archive bytes.

use crate::document::Document;
use crate::error::DocStudioError;
use crate::output::{ExportBundle, ExportReport, BUNDLE_FILENAME, MARKDOWN_FILENAME};
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Write the bundle for `document` and the artifacts in `report`.
///
/// # Errors
/// [`DocStudioError::ArchiveIo`] if the in-memory writer fails.
pub fn build_bundle(document: &Document, report: &ExportReport) -> Result<ExportBundle, DocStudioError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::new();

    add_entry(&mut zip, &options, MARKDOWN_FILENAME, document.markdown().as_bytes())?;
    entries.push(MARKDOWN_FILENAME.to_string());

    for artifact in report.artifacts() {
        add_entry(&mut zip, &options, &artifact.filename, &artifact.content)?;
        entries.push(artifact.filename.clone());
    }

    let bytes = zip
        .finish()
        .map_err(|e| DocStudioError::ArchiveIo {
            entry: BUNDLE_FILENAME.to_string(),
            detail: e.to_string(),
        })?
        .into_inner();

    debug!("Bundle {:?} → {} bytes", entries, bytes.len());

    Ok(ExportBundle {
        bytes,
        entries,
        filename: BUNDLE_FILENAME.to_string(),
    })
}

fn add_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    options: &SimpleFileOptions,
    name: &str,
    content: &[u8],
) -> Result<(), DocStudioError> {
    let io_err = |detail: String| DocStudioError::ArchiveIo {
        entry: name.to_string(),
        detail,
    };
    zip.start_file(name, options.clone()).map_err(|e| io_err(e.to_string()))?;
    zip.write_all(content).map_err(|e| io_err(e.to_string()))?;
    Ok(())
}
