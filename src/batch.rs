//! Batch conversion: many uploads in, one result row per upload out.
//!
//! The per-page containment rule of the compose pipeline repeats here one
//! level up: a document that fails to convert yields an error row for that
//! document and never disturbs its neighbours. Row order always matches
//! input order, regardless of completion order.

use crate::config::ConversionConfig;
use crate::convert::convert_from_bytes;
use crate::output::ConversionResult;
use futures::{stream, StreamExt};
use tracing::{debug, info};

/// Error string returned for uploads without a `.pdf` extension.
pub(crate) const INVALID_FILE_TYPE: &str = "Invalid file type. Only PDF files are allowed.";

/// Fallback display name for uploads whose filename is empty.
const UNKNOWN_FILENAME: &str = "unknown";

/// A file received from a client, queued for conversion.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied name, already sanitised by the transport layer.
    pub filename: String,
    /// Raw bytes of the upload.
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }
}

/// Convert a batch of uploads concurrently.
///
/// At most `config.batch_concurrency` documents are in flight at once;
/// pages within each document are still walked sequentially. The returned
/// rows are in input order.
pub async fn convert_batch(
    files: Vec<UploadedFile>,
    config: &ConversionConfig,
) -> Vec<ConversionResult> {
    info!("Starting batch conversion: {} file(s)", files.len());

    let mut results: Vec<(usize, ConversionResult)> =
        stream::iter(files.into_iter().enumerate().map(|(idx, file)| {
            let cfg = config.clone();
            async move {
                let result = convert_one(file, &cfg).await;
                (idx, result)
            }
        }))
        .buffer_unordered(config.batch_concurrency)
        .collect()
        .await;

    // Completion order is arbitrary; clients rely on input order
    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, result)| result).collect()
}

/// Convert a single upload into its result row.
///
/// Infallible by construction: every failure becomes an error row naming
/// this file, so one bad upload cannot take down a batch.
pub async fn convert_one(file: UploadedFile, config: &ConversionConfig) -> ConversionResult {
    let display_name = if file.filename.is_empty() {
        UNKNOWN_FILENAME.to_string()
    } else {
        file.filename.clone()
    };

    if !has_pdf_extension(&file.filename) {
        debug!("rejecting '{}': not a .pdf filename", display_name);
        return ConversionResult::error(display_name, INVALID_FILE_TYPE);
    }

    match convert_from_bytes(&file.data, config).await {
        Ok(output) => {
            debug!(
                "converted '{}': {} page(s), {} table(s)",
                display_name, output.stats.total_pages, output.stats.table_count
            );
            ConversionResult::success(display_name, output.markdown)
        }
        Err(e) => {
            debug!("conversion of '{}' failed: {}", display_name, e);
            ConversionResult::error(display_name, e.to_string())
        }
    }
}

/// `true` when the last dot-separated segment is `pdf`, case-insensitive.
///
/// A filename with no dot never qualifies; a bare `.pdf` does.
pub(crate) fn has_pdf_extension(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.eq_ignore_ascii_case("pdf"),
        None => false,
    }
}
