//! Conversion entry points: one document in, Markdown plus diagnostics out.
//!
//! ## Why spawn_blocking?
//!
//! pdfium wraps a C++ library with thread-local state that is not safe to
//! call from async contexts, and tesseract runs as a synchronous
//! subprocess. The whole open → compose walk for one document therefore
//! runs on a dedicated blocking thread; the async surface exists for the
//! HTTP server and the batch combinators layered above it.
//!
//! ## Why check OCR first?
//!
//! The engine probe happens before the document is opened. A missing
//! engine fails the conversion up front with
//! [`PdfmillError::OcrUnavailable`] — image-only pages silently coming
//! back empty would look exactly like success.

use crate::backend::pdfium::{bind_pdfium, open_document, PdfiumSource};
use crate::backend::PageSource;
use crate::config::ConversionConfig;
use crate::error::PdfmillError;
use crate::ocr::{OcrCapability, OcrEngine, TesseractOcr};
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata, PageReport};
use crate::pipeline::compose_document;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF file to Markdown.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ConversionOutput)` on success, even if some pages' OCR failed
/// (check `output.stats.ocr_failed_pages`; failed pages carry an inline
/// `### OCR Error` annotation).
///
/// # Errors
/// Returns `Err(PdfmillError)` only for fatal errors:
/// - File not found / permission denied / not a PDF
/// - Corrupt or password-protected document
/// - No usable OCR engine
/// - Native text or table extraction failure
///
/// # Example
/// ```rust,no_run
/// use pdfmill::{convert, ConversionConfig};
///
/// # async fn run() -> Result<(), pdfmill::PdfmillError> {
/// let config = ConversionConfig::default();
/// let output = convert("report.pdf", &config).await?;
/// println!("{}", output.markdown);
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, PdfmillError> {
    let total_start = Instant::now();
    let path = path.as_ref().to_path_buf();
    info!("Starting conversion: {}", path.display());

    // ── Step 1: Validate input ───────────────────────────────────────────
    validate_pdf_file(&path)?;

    // ── Step 2: Resolve OCR capability ───────────────────────────────────
    let engine = resolve_ocr(config).engine()?;

    // ── Step 3: Open and compose on a blocking thread ────────────────────
    let cfg = config.clone();
    let task_path = path.clone();
    let (markdown, pages, metadata) =
        tokio::task::spawn_blocking(move || convert_blocking(&task_path, engine.as_ref(), &cfg))
            .await
            .map_err(|e| PdfmillError::Internal(format!("Conversion task panicked: {}", e)))??;

    // ── Step 4: Fold stats ───────────────────────────────────────────────
    let stats =
        ConversionStats::from_reports(&pages, total_start.elapsed().as_millis() as u64);
    info!(
        "Conversion complete: {} pages ({} OCRed, {} OCR failures), {}ms total",
        stats.total_pages,
        stats.ocr_attempted_pages,
        stats.ocr_failed_pages,
        stats.total_duration_ms
    );

    Ok(ConversionOutput {
        markdown,
        pages,
        metadata,
        stats,
    })
}

/// Blocking body of [`convert`]: open the document (injected backend or
/// pdfium) and walk its pages.
fn convert_blocking(
    path: &Path,
    engine: &dyn OcrEngine,
    config: &ConversionConfig,
) -> Result<(String, Vec<PageReport>, DocumentMetadata), PdfmillError> {
    if let Some(ref opener) = config.opener {
        let source = opener.open(path)?;
        let metadata = source.metadata();
        debug!(
            "document opened via injected backend: {} pages",
            metadata.page_count
        );
        let (markdown, pages) = compose_document(source.as_ref(), engine, config)?;
        return Ok((markdown, pages, metadata));
    }

    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, path, config.password.as_deref())?;
    let source = PdfiumSource::new(document, config.max_rendered_pixels);
    let metadata = source.metadata();
    info!("PDF loaded: {} pages", metadata.page_count);
    let (markdown, pages) = compose_document(&source, engine, config)?;
    Ok((markdown, pages, metadata))
}

/// Convert a PDF and write the Markdown directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, PdfmillError> {
    let output = convert(path, config).await?;
    let out = output_path.as_ref();

    // Atomic write: write to temp, then rename
    if let Some(parent) = out.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PdfmillError::OutputWriteFailed {
                path: out.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = out.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, &output.markdown)
        .await
        .map_err(|e| PdfmillError::OutputWriteFailed {
            path: out.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, out)
        .await
        .map_err(|e| PdfmillError::OutputWriteFailed {
            path: out.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally. Do not call from inside
/// an async context.
pub fn convert_sync(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, PdfmillError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfmillError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(path, config))
}

/// Convert a PDF provided as in-memory bytes.
///
/// pdfium needs a real file path, so the bytes land in a
/// [`tempfile::NamedTempFile`] that is deleted on drop — on every exit
/// path, including panics. This is what the HTTP upload handlers call.
pub async fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, PdfmillError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| PdfmillError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| PdfmillError::Internal(format!("tempfile write: {e}")))?;
    // `tmp` is dropped (and the file deleted) after `convert` returns
    convert(tmp.path(), config).await
}

/// Read document metadata without converting content.
///
/// No OCR requirement: inspection works on a machine without tesseract.
pub async fn inspect(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentMetadata, PdfmillError> {
    let path = path.as_ref().to_path_buf();
    validate_pdf_file(&path)?;
    let cfg = config.clone();
    tokio::task::spawn_blocking(move || inspect_blocking(&path, &cfg))
        .await
        .map_err(|e| PdfmillError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn inspect_blocking(
    path: &Path,
    config: &ConversionConfig,
) -> Result<DocumentMetadata, PdfmillError> {
    if let Some(ref opener) = config.opener {
        return Ok(opener.open(path)?.metadata());
    }
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, path, config.password.as_deref())?;
    let metadata = PdfiumSource::new(document, config.max_rendered_pixels).metadata();
    Ok(metadata)
}

/// Resolve the OCR capability, in priority order:
///
/// 1. **Injected capability** (`config.ocr`) — the server probes tesseract
///    once at startup and injects the result here; tests inject fakes.
///    Highest priority so an availability answer is never second-guessed.
/// 2. **Fresh probe** — run `--version` on the configured command
///    (`config.tesseract_cmd`, default `tesseract`) and wrap the outcome.
fn resolve_ocr(config: &ConversionConfig) -> OcrCapability {
    if let Some(ref capability) = config.ocr {
        return capability.clone();
    }
    let command = config
        .tesseract_cmd
        .as_deref()
        .unwrap_or(TesseractOcr::DEFAULT_COMMAND);
    debug!("probing OCR engine '{}'", command);
    TesseractOcr::probe(command, &config.ocr_language)
}

/// Validate the file exists, is readable, and carries the `%PDF` magic.
///
/// Checked before anything touches pdfium so callers get a precise error
/// rather than a generic load failure. Files shorter than four bytes pass
/// here and surface as [`PdfmillError::CorruptPdf`] at open time.
fn validate_pdf_file(path: &Path) -> Result<(), PdfmillError> {
    if !path.exists() {
        return Err(PdfmillError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PdfmillError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PdfmillError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PdfmillError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("validated PDF file: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_missing_file() {
        let err = validate_pdf_file(Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, PdfmillError::FileNotFound { .. }));
    }

    #[test]
    fn validate_rejects_wrong_magic() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello world, definitely not a pdf").unwrap();
        let err = validate_pdf_file(tmp.path()).unwrap_err();
        match err {
            PdfmillError::NotAPdf { magic, .. } => assert_eq!(&magic, b"hell"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_pdf_magic() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n...").unwrap();
        assert!(validate_pdf_file(tmp.path()).is_ok());
    }

    #[test]
    fn resolve_ocr_prefers_injected_capability() {
        let cfg = ConversionConfig::builder()
            .ocr(OcrCapability::unavailable("injected reason"))
            .tesseract_cmd("would-be-probed-otherwise")
            .build()
            .unwrap();
        match resolve_ocr(&cfg) {
            OcrCapability::Unavailable { reason } => assert_eq!(reason, "injected reason"),
            OcrCapability::Ready(_) => panic!("expected the injected unavailable capability"),
        }
    }
}
