//! Base64 `data:` URIs for inline previews and download links.
//!
//! A host that renders HTML (a browser page, a notebook cell) can show an
//! uploaded image or offer the PNG export without writing anything to disk by
//! embedding the bytes directly in the markup.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Encode `bytes` as a `data:<mime>;base64,…` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} bytes → {} bytes base64", bytes.len(), b64.len());
    format!("data:{mime};base64,{b64}")
}

/// An `<a download>` link carrying the bytes inline.
pub fn download_link(mime: &str, bytes: &[u8], filename: &str, label: &str) -> String {
    format!(
        r#"<a href="{}" download="{}">{}</a>"#,
        data_uri(mime, bytes),
        filename,
        label
    )
}
