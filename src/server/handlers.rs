//! Route handlers: thin translation between HTTP and library calls.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::batch::{self, convert_batch};
use crate::convert::convert_from_bytes;
use crate::error::PdfmillError;
use crate::server::upload::collect_files;
use crate::server::AppState;

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// `POST /parse-pdf` — one upload under multipart field `file`.
pub async fn parse_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let files = match collect_files(multipart, "file").await {
        Ok(files) => files,
        Err(e) => return bad_request(e.to_string()),
    };

    let Some(file) = files.into_iter().next() else {
        return bad_request("No file provided");
    };

    // Covers the empty filename too: no name, no extension
    if !batch::has_pdf_extension(&file.filename) {
        return bad_request(batch::INVALID_FILE_TYPE);
    }

    match convert_from_bytes(&file.data, &state.config).await {
        Ok(output) => Json(json!({
            "filename": file.filename,
            "markdown": output.markdown,
        }))
        .into_response(),
        Err(e) => {
            warn!("conversion of '{}' failed: {}", file.filename, e);
            (status_for(&e), Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// `POST /parse-pdfs` — repeated uploads under multipart field `files`.
///
/// Always `200` with one result row per file once the form itself is
/// valid; per-file failures live inside the rows.
pub async fn parse_pdfs(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let files = match collect_files(multipart, "files").await {
        Ok(files) => files,
        Err(e) => return bad_request(e.to_string()),
    };

    if files.is_empty() {
        return bad_request("No files provided");
    }
    // Compatibility quirk: only the first upload's name is checked here.
    // Nameless files later in the batch become per-file error rows.
    if files[0].filename.is_empty() {
        return bad_request("No selected files");
    }

    let results = convert_batch(files, &state.config).await;
    Json(results).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.into() })),
    )
        .into_response()
}

/// Map a fatal conversion error to its HTTP status.
///
/// `503` marks deployment problems (missing OCR engine or pdfium
/// library), `422` marks documents the service cannot process, anything
/// else is a plain `500`.
fn status_for(error: &PdfmillError) -> StatusCode {
    match error {
        PdfmillError::OcrUnavailable { .. } | PdfmillError::PdfiumBindingFailed(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        PdfmillError::NotAPdf { .. }
        | PdfmillError::CorruptPdf { .. }
        | PdfmillError::PasswordRequired { .. }
        | PdfmillError::WrongPassword { .. }
        | PdfmillError::ExtractionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
