//! Pipeline stages for one render-and-export interaction.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the image backend can change without touching
//! the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ export ──▶ archive
//! (paste/upload) (comrak+syntect) (wkhtmlto*/browser) (zip)
//! ```
//!
//! 1. [`input`]   — pick the effective Markdown; decode an uploaded image for display
//! 2. [`render`]  — Markdown → highlighted fragment → fixed HTML template
//! 3. [`export`]  — HTML identity, PDF and PNG through external converters,
//!    each failure isolated to its own channel
//! 4. [`archive`] — `doc.md`, `doc.html` and whatever else succeeded, zipped
//!    in memory
//! 5. [`encode`]  — `data:` URIs for inline previews and download links

pub mod archive;
pub mod encode;
pub mod export;
pub mod input;
pub mod render;
