//! HTTP front end: the conversion pipeline behind three routes.
//!
//! - `GET /health` — liveness probe
//! - `POST /parse-pdf` — one multipart upload under field `file`
//! - `POST /parse-pdfs` — repeated uploads under field `files`
//!
//! Handlers stay thin: multipart intake and status mapping live here,
//! everything else is a call into [`crate::convert`] / [`crate::batch`].
//! The OCR probe result is injected through `AppState.config.ocr` at
//! startup so requests never re-run `tesseract --version`.

mod handlers;
mod upload;

use crate::config::ConversionConfig;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use upload::sanitize_filename;

/// Default request body ceiling, in MiB.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    /// Conversion settings. `config.ocr` should carry the startup probe
    /// result; leaving it `None` makes every request probe again.
    pub config: ConversionConfig,
    /// Request body ceiling in bytes, enforced by `DefaultBodyLimit`.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

/// Build the application router.
///
/// CORS is permissive: the service fronts browser apps on other origins.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/parse-pdf", post(handlers::parse_pdf))
        .route("/parse-pdfs", post(handlers::parse_pdfs))
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
