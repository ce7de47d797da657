//! Server binary for pdfmill.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and serves the HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use pdfmill::server::{router, AppState};
use pdfmill::{ConversionConfig, OcrCapability, TesseractOcr};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default port (5001)
  pdfmill

  # Custom port, German OCR
  pdfmill --port 8080 --ocr-lang deu

  # Point at a tesseract build outside PATH
  pdfmill --tesseract-cmd /opt/tesseract/bin/tesseract

ROUTES:
  GET  /health       liveness probe
  POST /parse-pdf    one PDF under multipart field `file`
  POST /parse-pdfs   many PDFs under multipart field `files`

ENVIRONMENT VARIABLES:
  PDFMILL_HOST / PDFMILL_PORT   Bind address (default 0.0.0.0:5001)
  PDFMILL_OCR_LANG              Tesseract language code (default eng)
  PDFIUM_LIB_PATH               Directory holding libpdfium; otherwise the
                                executable's directory and the system loader
                                path are tried
  RUST_LOG                      Overrides -v/-vv log filtering

SETUP:
  1. Install tesseract:  apt-get install tesseract-ocr
  2. Install pdfium:     download libpdfium from bblanchon/pdfium-binaries
                         and set PDFIUM_LIB_PATH=/path/to/dir
  3. Run:                pdfmill
"#;

/// Serve the PDF to Markdown conversion API over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "pdfmill",
    version,
    about = "PDF to Markdown conversion service (native text, tables, OCR fallback)",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "PDFMILL_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PDFMILL_PORT", default_value_t = 5001)]
    port: u16,

    /// OCR language passed to tesseract (-l).
    #[arg(long, env = "PDFMILL_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Rendering DPI for OCR rasterisation (72-600).
    #[arg(long, env = "PDFMILL_OCR_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    ocr_dpi: u32,

    /// Pages whose native text trims to fewer characters than this get OCR.
    #[arg(long, env = "PDFMILL_OCR_TEXT_THRESHOLD", default_value_t = 20)]
    ocr_text_threshold: usize,

    /// Tesseract executable to invoke (defaults to `tesseract` on PATH).
    #[arg(long, env = "PDFMILL_TESSERACT_CMD")]
    tesseract_cmd: Option<String>,

    /// Maximum upload size in MiB.
    #[arg(long, env = "PDFMILL_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    /// Concurrent document conversions per batch request.
    #[arg(long, env = "PDFMILL_BATCH_CONCURRENCY", default_value_t = 4)]
    batch_concurrency: usize,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ConversionConfig::builder()
        .ocr_dpi(cli.ocr_dpi)
        .ocr_text_threshold(cli.ocr_text_threshold)
        .ocr_language(cli.ocr_lang.clone())
        .batch_concurrency(cli.batch_concurrency);
    if let Some(ref cmd) = cli.tesseract_cmd {
        builder = builder.tesseract_cmd(cmd.clone());
    }
    let mut config = builder.build().context("Invalid configuration")?;

    // ── Probe OCR once at startup ────────────────────────────────────────
    // Requests reuse this answer instead of shelling out per upload.
    let command = cli
        .tesseract_cmd
        .as_deref()
        .unwrap_or(TesseractOcr::DEFAULT_COMMAND);
    let capability = TesseractOcr::probe(command, &cli.ocr_lang);
    match &capability {
        OcrCapability::Ready(_) => {
            info!("OCR engine ready: {} (lang {})", command, cli.ocr_lang);
        }
        OcrCapability::Unavailable { reason } => {
            warn!(
                "OCR engine unavailable: {}. Conversion requests will fail \
                 with 503 until this is fixed.",
                reason
            );
        }
    }
    config.ocr = Some(capability);

    // ── Serve ────────────────────────────────────────────────────────────
    let state = Arc::new(AppState {
        config,
        max_upload_bytes: cli.max_upload_mb * 1024 * 1024,
    });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", cli.host, cli.port))?;
    let addr = listener
        .local_addr()
        .context("Failed to read local address")?;
    info!("Listening on http://{addr}");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
