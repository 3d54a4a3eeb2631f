//! End-to-end tests against the real converters.
//!
//! These shell out to whatever `wkhtmltopdf`, `wkhtmltoimage` and Chromium
//! are installed (or named by `WKHTMLTOPDF_PATH`, `WKHTMLTOIMAGE_PATH` and
//! `CHROME_PATH`). They are gated behind the `E2E_ENABLED` environment
//! variable so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e test_pdf -- --nocapture

use docstudio::{convert, ArtifactKind, ImageBackend, StudioConfig};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/e2e-output");
    std::fs::create_dir_all(&d).ok();
    d
}

fn converter(env: &str, default: &str) -> PathBuf {
    std::env::var_os(env)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn on_path(program: &Path) -> bool {
    if program.components().count() > 1 {
        return program.exists();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

/// Skip this test if E2E_ENABLED is not set *or* the converter is missing.
macro_rules! e2e_skip_unless_ready {
    ($env:expr, $default:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p = converter($env, $default);
        if !on_path(&p) {
            println!("SKIP — converter not found: {}", p.display());
            println!("       Install it or set {}", $env);
            return;
        }
        p
    }};
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("docstudio=debug")
        .with_test_writer()
        .try_init();
}

const SAMPLE: &str = r#"# DocStudio e2e

Some *emphasis*, a [link](https://example.com) and a table:

| a | b |
|---|---|
| 1 | 2 |

```rust
fn main() {
    println!("hello");
}
```
"#;

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pdf_with_wkhtmltopdf() {
    let wkhtmltopdf = e2e_skip_unless_ready!("WKHTMLTOPDF_PATH", "wkhtmltopdf");
    init_tracing();

    let config = StudioConfig::builder()
        .wkhtmltopdf_path(wkhtmltopdf)
        .png(false)
        .build()
        .unwrap();

    let out = convert(SAMPLE, None, &config).await.unwrap().into_output().unwrap();
    assert!(out.report.failures.is_empty(), "{:?}", out.report.failures);

    let pdf = out.report.get(ArtifactKind::Pdf).expect("pdf exported");
    assert!(pdf.content.starts_with(b"%PDF"));
    assert!(pdf.len() > 1000, "suspiciously small PDF: {} bytes", pdf.len());
    assert_eq!(out.bundle.entries, vec!["doc.md", "doc.html", "doc.pdf"]);

    std::fs::write(output_dir().join("doc.pdf"), &pdf.content).unwrap();
}

#[tokio::test]
async fn test_png_with_wkhtmltoimage() {
    let wkhtmltoimage = e2e_skip_unless_ready!("WKHTMLTOIMAGE_PATH", "wkhtmltoimage");
    init_tracing();

    let config = StudioConfig::builder()
        .wkhtmltoimage_path(wkhtmltoimage)
        .image_width(800)
        .pdf(false)
        .build()
        .unwrap();

    let out = convert(SAMPLE, None, &config).await.unwrap().into_output().unwrap();
    assert!(out.report.failures.is_empty(), "{:?}", out.report.failures);

    let png = out.report.get(ArtifactKind::Png).expect("png exported");
    let img = image::load_from_memory(&png.content).expect("decodable PNG");
    assert_eq!(img.width(), 800);

    std::fs::write(output_dir().join("doc.png"), &png.content).unwrap();
}

#[tokio::test]
async fn test_png_with_headless_browser() {
    let browser = e2e_skip_unless_ready!("CHROME_PATH", "chromium");
    init_tracing();

    let config = StudioConfig::builder()
        .image_backend(ImageBackend::HeadlessBrowser)
        .browser_path(browser)
        .image_width(640)
        .image_height(480)
        .pdf(false)
        .build()
        .unwrap();

    let out = convert(SAMPLE, None, &config).await.unwrap().into_output().unwrap();
    assert!(out.report.failures.is_empty(), "{:?}", out.report.failures);

    let png = out.report.get(ArtifactKind::Png).expect("png exported");
    let img = image::load_from_memory(&png.content).expect("decodable PNG");
    assert_eq!((img.width(), img.height()), (640, 480));

    std::fs::write(output_dir().join("doc-browser.png"), &png.content).unwrap();
}

#[tokio::test]
async fn test_full_bundle() {
    let wkhtmltopdf = e2e_skip_unless_ready!("WKHTMLTOPDF_PATH", "wkhtmltopdf");
    let wkhtmltoimage = e2e_skip_unless_ready!("WKHTMLTOIMAGE_PATH", "wkhtmltoimage");
    init_tracing();

    let config = StudioConfig::builder()
        .wkhtmltopdf_path(wkhtmltopdf)
        .wkhtmltoimage_path(wkhtmltoimage)
        .build()
        .unwrap();

    let out = convert(SAMPLE, None, &config).await.unwrap().into_output().unwrap();
    assert_eq!(out.bundle.entries, vec!["doc.md", "doc.html", "doc.pdf", "doc.png"]);
    println!(
        "bundle: {} bytes, render {}ms, export {}ms",
        out.bundle.bytes.len(),
        out.stats.render_duration_ms,
        out.stats.export_duration_ms
    );

    std::fs::write(output_dir().join(&out.bundle.filename), &out.bundle.bytes).unwrap();
}
