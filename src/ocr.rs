//! OCR: the engine seam and the tesseract CLI implementation.
//!
//! OCR is a hard precondition, not a best-effort extra: an image-only page
//! converted without OCR silently produces an empty page, which looks like
//! success. [`OcrCapability`] makes the availability question explicit —
//! the conversion entry points resolve it once, up front, and refuse to
//! start when it is [`OcrCapability::Unavailable`].
//!
//! The production engine shells out to the `tesseract` binary rather than
//! linking libtesseract: the CLI is present on every distro, needs no
//! C++ build plumbing, and crashes in it cannot take the server down.

use crate::error::PdfmillError;
use image::DynamicImage;
use std::fmt;
use std::io;
use std::process::Command;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// A synchronous OCR engine: page image in, recognized text out.
///
/// Called on a blocking thread; implementations may do subprocess or FFI
/// work directly.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Failures inside one OCR invocation. Page-contained: the pipeline wraps
/// these in [`crate::error::PageError::OcrFailed`] and moves on.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Could not materialise the page image for the engine.
    #[error("failed to write page image: {0}")]
    Image(String),

    /// The engine process could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The engine ran but reported failure.
    #[error("'{command}' exited with {status}: {stderr}")]
    Engine {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Resolved OCR availability: either a usable engine or the reason there
/// is none.
///
/// Cloning is cheap (the engine is behind an `Arc`), so a capability probed
/// once at server startup is shared by every request.
#[derive(Clone)]
pub enum OcrCapability {
    Ready(Arc<dyn OcrEngine>),
    Unavailable { reason: String },
}

impl OcrCapability {
    pub fn ready(engine: impl OcrEngine + 'static) -> Self {
        OcrCapability::Ready(Arc::new(engine))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        OcrCapability::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, OcrCapability::Ready(_))
    }

    /// The engine, or the fatal precondition error for conversion to
    /// propagate.
    pub fn engine(&self) -> Result<Arc<dyn OcrEngine>, PdfmillError> {
        match self {
            OcrCapability::Ready(engine) => Ok(Arc::clone(engine)),
            OcrCapability::Unavailable { reason } => Err(PdfmillError::OcrUnavailable {
                reason: reason.clone(),
            }),
        }
    }
}

impl fmt::Debug for OcrCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcrCapability::Ready(_) => f.write_str("OcrCapability::Ready(<dyn OcrEngine>)"),
            OcrCapability::Unavailable { reason } => f
                .debug_struct("OcrCapability::Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// OCR engine backed by the `tesseract` command-line binary.
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl TesseractOcr {
    pub const DEFAULT_COMMAND: &'static str = "tesseract";

    /// Engine using `tesseract` from PATH.
    pub fn new(language: impl Into<String>) -> Self {
        Self::with_command(Self::DEFAULT_COMMAND, language)
    }

    /// Engine using an explicit binary path or name.
    pub fn with_command(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    /// Probe the binary once with `--version` and wrap the outcome in a
    /// capability.
    ///
    /// Probing is the only place availability is checked; `recognize`
    /// assumes the binary exists and reports a page-level error if it has
    /// vanished since.
    pub fn probe(command: &str, language: &str) -> OcrCapability {
        match Command::new(command).arg("--version").output() {
            Ok(output) if output.status.success() => {
                // tesseract 4 prints the version banner on stderr, 5 on stdout.
                let banner = if output.stdout.is_empty() {
                    String::from_utf8_lossy(&output.stderr).into_owned()
                } else {
                    String::from_utf8_lossy(&output.stdout).into_owned()
                };
                let version = banner.lines().next().unwrap_or("tesseract").trim().to_string();
                debug!("OCR probe succeeded: {}", version);
                OcrCapability::ready(Self::with_command(command, language))
            }
            Ok(output) => OcrCapability::unavailable(format!(
                "'{} --version' exited with {}",
                command, output.status
            )),
            Err(e) => {
                OcrCapability::unavailable(format!("'{}' not found on PATH: {}", command, e))
            }
        }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let dir = tempfile::tempdir().map_err(|e| OcrError::Image(e.to_string()))?;
        let image_path = dir.path().join("page.png");
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| OcrError::Image(e.to_string()))?;

        // psm 1: full automatic page segmentation with orientation and
        // script detection — the right mode for whole scanned pages.
        let output = Command::new(&self.command)
            .arg(&image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg("1")
            .output()
            .map_err(|e| OcrError::Spawn {
                command: self.command.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(OcrError::Engine {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
