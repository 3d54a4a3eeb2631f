//! CLI binary for docstudio.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `StudioConfig`, keeps the text buffer in an optional session file, and
//! prints previews, warnings and a summary.

use anyhow::{Context, Result};
use clap::Parser;
use docstudio::pipeline::render;
use docstudio::{
    convert, write_outputs, ArtifactKind, ConversionOutcome, ConversionOutput, ExportError,
    ExportProgressCallback, ImageBackend, ImagePreview, OutputFiles, ProgressCallback,
    StudioConfig, Upload, EMPTY_INPUT_PROMPT,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

fn human_bytes(n: usize) -> String {
    if n >= 1024 * 1024 {
        format!("{:.1} MB", n as f64 / (1024.0 * 1024.0))
    } else if n >= 1024 {
        format!("{:.1} KB", n as f64 / 1024.0)
    } else {
        format!("{n} B")
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while a converter runs, and one log
/// line per finished export.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Mutex<Option<Instant>>,
    failures: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Exporting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
            failures: AtomicUsize::new(0),
        })
    }

    fn elapsed(&self) -> String {
        let secs = self
            .started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        dim(&format!("{secs:.1}s"))
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_export_start(&self, kind: ArtifactKind) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar.set_message(format!("{kind}…"));
    }

    fn on_export_complete(&self, kind: ArtifactKind, bytes: usize) {
        self.bar.println(format!(
            "  {} {:<10} {:>10}  {}",
            green("✓"),
            kind.filename(),
            dim(&human_bytes(bytes)),
            self.elapsed(),
        ));
    }

    fn on_export_failed(&self, kind: ArtifactKind, error: &ExportError) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:<10} {}  {}",
            red("✗"),
            kind.filename(),
            red(&error.to_string()),
            self.elapsed(),
        ));
        self.bar.println(format!("    {}", dim(error.hint())));
    }

    fn on_bundle_complete(&self, entries: usize, bytes: usize) {
        self.bar.finish_and_clear();
        let failed = self.failures.load(Ordering::SeqCst);
        eprintln!(
            "{} bundle: {} files, {}{}",
            if failed == 0 { green("✔") } else { yellow("⚠") },
            bold(&entries.to_string()),
            human_bytes(bytes),
            if failed == 0 {
                String::new()
            } else {
                format!("  ({} export(s) failed)", red(&failed.to_string()))
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render an uploaded Markdown file; write doc.html, doc.pdf, doc.png and the ZIP
  docstudio notes.md -o exports/

  # Paste Markdown directly
  docstudio --text '# Hello' -o exports/

  # Pipe Markdown in and print the HTML preview
  cat notes.md | docstudio --stdin --preview --no-pdf --no-png

  # Keep the text buffer between runs (uploaded Markdown replaces it)
  docstudio --session .docstudio notes.md
  docstudio --session .docstudio -o again/

  # Capture the PNG with a headless browser instead of wkhtmltoimage
  docstudio --image-backend browser --browser /usr/bin/google-chrome notes.md

  # Show an uploaded image (display only; the Markdown is unchanged)
  docstudio --session .docstudio diagram.png

  # Machine-readable report
  docstudio --json notes.md

OUTPUT FILES:
  doc.md                  Markdown source (with --markdown)
  doc.html                text/html
  doc.pdf                 application/pdf   (if wkhtmltopdf succeeded)
  doc.png                 image/png         (if the image backend succeeded)
  docstudio_exports.zip   application/zip   doc.md + doc.html (+ doc.pdf, doc.png)

ENVIRONMENT VARIABLES:
  WKHTMLTOPDF_PATH        wkhtmltopdf binary
  WKHTMLTOIMAGE_PATH      wkhtmltoimage binary
  CHROME_PATH             Chromium/Chrome binary for --image-backend browser
  RUST_LOG                Override the log filter (e.g. docstudio=debug)
"#;

/// Render Markdown and export it as HTML, PDF, PNG and a ZIP bundle.
#[derive(Parser, Debug)]
#[command(
    name = "docstudio",
    version,
    about = "Render Markdown and export it as HTML, PDF, PNG and a ZIP bundle",
    long_about = "Render Markdown (pasted or uploaded) into a styled HTML document with \
highlighted code blocks, then export it as HTML, PDF (wkhtmltopdf), PNG (wkhtmltoimage or a \
headless browser) and a ZIP bundle. A missing converter only disables its own format.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Uploaded file: .md/.markdown (replaces the text buffer) or .png/.jpg/.jpeg (display only).
    upload: Option<PathBuf>,

    /// Pasted Markdown text.
    #[arg(long, conflicts_with = "stdin")]
    text: Option<String>,

    /// Read pasted Markdown from stdin.
    #[arg(long)]
    stdin: bool,

    /// Session file holding the text buffer between runs.
    #[arg(long, env = "DOCSTUDIO_SESSION")]
    session: Option<PathBuf>,

    /// Directory for exported files.
    #[arg(short, long, env = "DOCSTUDIO_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Skip the PDF export.
    #[arg(long)]
    no_pdf: bool,

    /// Skip the PNG export.
    #[arg(long)]
    no_png: bool,

    /// Do not write the ZIP bundle.
    #[arg(long)]
    no_zip: bool,

    /// Also write doc.md next to the exports.
    #[arg(long)]
    markdown: bool,

    /// Tool used for the PNG export.
    #[arg(long, env = "DOCSTUDIO_IMAGE_BACKEND", value_enum, default_value = "wkhtmltoimage")]
    image_backend: BackendArg,

    /// wkhtmltopdf binary.
    #[arg(long, env = "WKHTMLTOPDF_PATH", default_value = "wkhtmltopdf")]
    wkhtmltopdf: PathBuf,

    /// wkhtmltoimage binary.
    #[arg(long, env = "WKHTMLTOIMAGE_PATH", default_value = "wkhtmltoimage")]
    wkhtmltoimage: PathBuf,

    /// Chromium-family browser binary.
    #[arg(long, env = "CHROME_PATH", default_value = "chromium")]
    browser: PathBuf,

    /// PDF page size (A4, Letter, …).
    #[arg(long, default_value = "A4")]
    page_size: String,

    /// PDF DPI (72–1200).
    #[arg(long, default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    dpi: u32,

    /// PNG width in pixels.
    #[arg(long, default_value_t = 1024)]
    image_width: u32,

    /// Browser viewport height in pixels.
    #[arg(long, default_value_t = 1400)]
    image_height: u32,

    /// Code highlighting theme.
    #[arg(long, default_value = render::DEFAULT_THEME)]
    theme: String,

    /// List available highlighting themes and exit.
    #[arg(long)]
    list_themes: bool,

    /// Print the rendered HTML document to stdout.
    #[arg(long)]
    preview: bool,

    /// Print a JSON report to stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCSTUDIO_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSTUDIO_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCSTUDIO_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum BackendArg {
    Wkhtmltoimage,
    Browser,
}

impl From<BackendArg> for ImageBackend {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Wkhtmltoimage => ImageBackend::Wkhtmltoimage,
            BackendArg::Browser => ImageBackend::HeadlessBrowser,
        }
    }
}

/// `--json` output.
#[derive(Serialize)]
struct JsonReport<'a> {
    status: &'static str,
    #[serde(flatten)]
    output: JsonOutput<'a>,
    written: &'a [PathBuf],
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    source: &'a docstudio::InputSource,
    report: &'a docstudio::ExportReport,
    bundle: &'a docstudio::ExportBundle,
    image: &'a Option<ImagePreview>,
    stats: &'a docstudio::ConversionStats,
}

impl<'a> From<&'a ConversionOutput> for JsonOutput<'a> {
    fn from(o: &'a ConversionOutput) -> Self {
        Self {
            source: &o.source,
            report: &o.report,
            bundle: &o.bundle,
            image: &o.image,
            stats: &o.stats,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters; keep library INFO
    // logs out of its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.preview;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list_themes {
        for name in render::theme_names() {
            println!("{name}");
        }
        return Ok(());
    }

    // ── Resolve the text buffer and upload ───────────────────────────────
    let pasted = read_pasted(&cli).await?;
    let upload = match cli.upload {
        Some(ref path) => Some(
            Upload::from_path(path).with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let spinner = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = spinner
        .clone()
        .map(|s| s as Arc<dyn ExportProgressCallback>);
    let config = build_config(&cli, progress_cb)?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let outcome = convert(&pasted, upload.as_ref(), &config)
        .await
        .context("Conversion failed")?;

    if let Some(ref session) = cli.session {
        save_session(session, outcome.markdown()).await?;
    }

    // Nothing was exported, so the bundle callback never cleared the spinner.
    if let (true, Some(s)) = (outcome.is_empty(), spinner.as_ref()) {
        s.bar.finish_and_clear();
    }

    // An uploaded image is shown even when there is nothing to render.
    if let Some(image) = outcome.image() {
        if !cli.quiet && !cli.json {
            print_image(image);
        }
    }

    let output = match outcome {
        ConversionOutcome::Rendered(output) => output,
        ConversionOutcome::Empty { ref image } => {
            if cli.json {
                let json = serde_json::json!({
                    "status": "empty",
                    "message": EMPTY_INPUT_PROMPT,
                    "image": image,
                });
                println!("{json}");
            } else if !cli.quiet {
                eprintln!("{}", EMPTY_INPUT_PROMPT);
            }
            return Ok(());
        }
    };

    let files = OutputFiles {
        markdown: cli.markdown,
        artifacts: true,
        bundle: !cli.no_zip,
    };
    let written = write_outputs(&output, &cli.out_dir, files)
        .await
        .context("Failed to write exports")?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.preview {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.document.html().as_bytes())
            .context("Failed to write to stdout")?;
    } else if cli.json {
        let report = JsonReport {
            status: "rendered",
            output: JsonOutput::from(&output),
            written: &written,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    }

    if !cli.quiet && !cli.json {
        // The spinner already reported each export as it finished.
        if !show_progress {
            for failure in &output.report.failures {
                eprintln!("{} {}", yellow("⚠"), failure);
                eprintln!("  {}", dim(failure.hint()));
            }
        }
        for path in &written {
            eprintln!("   {}", bold(&path.display().to_string()));
        }
        eprintln!(
            "   {} exported, {} failed, {}ms total",
            output.stats.exported, output.stats.failed, output.stats.total_duration_ms
        );
    }

    Ok(())
}

/// Map CLI args to `StudioConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<StudioConfig> {
    let mut builder = StudioConfig::builder()
        .image_backend(cli.image_backend.clone().into())
        .wkhtmltopdf_path(&cli.wkhtmltopdf)
        .wkhtmltoimage_path(&cli.wkhtmltoimage)
        .browser_path(&cli.browser)
        .page_size(&cli.page_size)
        .dpi(cli.dpi)
        .image_width(cli.image_width)
        .image_height(cli.image_height)
        .highlight_theme(&cli.theme)
        .pdf(!cli.no_pdf)
        .png(!cli.no_png);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_image(image: &ImagePreview) {
    eprintln!(
        "{} Uploaded image {}  {}x{}  {}",
        green("▣"),
        bold(&image.name),
        image.width,
        image.height,
        dim(image.mime)
    );
}

/// The pasted buffer: `--text`, then `--stdin`, then the session file.
async fn read_pasted(cli: &Cli) -> Result<String> {
    if let Some(ref text) = cli.text {
        return Ok(text.clone());
    }
    if cli.stdin {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read Markdown from stdin")?;
        return Ok(buf);
    }
    match cli.session {
        Some(ref session) => load_session(session).await,
        None => Ok(String::new()),
    }
}

/// A session file that does not exist yet is an empty buffer.
async fn load_session(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read session {}", path.display())),
    }
}

async fn save_session(path: &Path, markdown: &str) -> Result<()> {
    tokio::fs::write(path, markdown)
        .await
        .with_context(|| format!("Failed to save session {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstudio::ExportSelection;

    fn html_only() -> StudioConfig {
        StudioConfig::builder()
            .exports(ExportSelection::html_only())
            .build()
            .unwrap()
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("docstudio").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn missing_session_is_an_empty_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.md");
        assert_eq!(load_session(&session).await.unwrap(), "");
    }

    #[tokio::test]
    async fn text_flag_wins_over_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.md");
        std::fs::write(&session, "# Saved").unwrap();

        let args = cli(&["--text", "# Typed", "--session", session.to_str().unwrap()]);
        assert_eq!(read_pasted(&args).await.unwrap(), "# Typed");

        let args = cli(&["--session", session.to_str().unwrap()]);
        assert_eq!(read_pasted(&args).await.unwrap(), "# Saved");
    }

    #[tokio::test]
    async fn uploaded_markdown_becomes_the_session_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.md");
        std::fs::write(&session, "# Old").unwrap();
        let args = cli(&["--session", session.to_str().unwrap()]);

        let pasted = read_pasted(&args).await.unwrap();
        let upload = Upload::from_bytes("notes.md", b"# New".to_vec()).unwrap();
        let outcome = convert(&pasted, Some(&upload), &html_only()).await.unwrap();
        save_session(&session, outcome.markdown()).await.unwrap();

        assert_eq!(read_pasted(&args).await.unwrap(), "# New");
    }

    #[tokio::test]
    async fn empty_input_clears_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.md");
        std::fs::write(&session, "# Old").unwrap();

        let args = cli(&["--text", "", "--session", session.to_str().unwrap()]);
        let pasted = read_pasted(&args).await.unwrap();
        let outcome = convert(&pasted, None, &html_only()).await.unwrap();
        assert!(outcome.is_empty());
        save_session(&session, outcome.markdown()).await.unwrap();

        assert_eq!(load_session(&session).await.unwrap(), "");
    }
}
