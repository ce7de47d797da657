//! HTTP surface tests: routes, status codes, and wire shapes, exercised
//! in-process with `tower::ServiceExt::oneshot` against the fake backend.

#![cfg(feature = "server")]

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{fake_config, fake_pdf, QueueOcr};
use pdfmill::server::{router, AppState};
use pdfmill::OcrCapability;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "pdfmill-test-boundary";

fn test_app() -> Router {
    router(Arc::new(AppState::new(fake_config(QueueOcr::empty()))))
}

/// Hand-rolled multipart form: one part per (filename, bytes) pair, all
/// under the same field name.
fn multipart_body(field: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, data) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_post(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

// ── /health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_healthy() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "status": "healthy" })
    );
}

// ── /parse-pdf ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_parse_pdf_returns_markdown() {
    let pdf = fake_pdf(&["uploaded page with plenty of native text"]);
    let body = multipart_body("file", &[("doc.pdf", &pdf)]);

    let response = test_app()
        .oneshot(multipart_post("/parse-pdf", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["filename"], "doc.pdf");
    let markdown = json["markdown"].as_str().expect("markdown string");
    assert!(markdown.starts_with("\n## Page 1\n\n"));
    assert!(markdown.contains("uploaded page with plenty of native text"));
}

#[tokio::test]
async fn test_parse_pdf_rejects_other_extensions() {
    let body = multipart_body("file", &[("notes.txt", b"plain text")]);

    let response = test_app()
        .oneshot(multipart_post("/parse-pdf", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": "Invalid file type. Only PDF files are allowed." })
    );
}

#[tokio::test]
async fn test_parse_pdf_requires_a_file_part() {
    let body = multipart_body("file", &[]);

    let response = test_app()
        .oneshot(multipart_post("/parse-pdf", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": "No file provided" })
    );
}

#[tokio::test]
async fn test_parse_pdf_ignores_parts_under_other_names() {
    let pdf = fake_pdf(&["the real upload with plenty of text"]);
    let mut body = multipart_body("decoy", &[("evil.pdf", b"%PDF-ignored")]);
    body.truncate(body.len() - format!("--{BOUNDARY}--\r\n").len());
    body.extend_from_slice(&multipart_body("file", &[("real.pdf", &pdf)]));

    let response = test_app()
        .oneshot(multipart_post("/parse-pdf", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["filename"], "real.pdf");
}

#[tokio::test]
async fn test_parse_pdf_sanitises_filenames() {
    let pdf = fake_pdf(&["spaced filename page with plenty of text"]);
    let body = multipart_body("file", &[("my report.pdf", &pdf)]);

    let response = test_app()
        .oneshot(multipart_post("/parse-pdf", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["filename"], "my_report.pdf");
}

#[tokio::test]
async fn test_parse_pdf_maps_missing_ocr_to_503() {
    let mut config = fake_config(QueueOcr::empty());
    config.ocr = Some(OcrCapability::unavailable("tesseract not on PATH"));
    let app = router(Arc::new(AppState::new(config)));

    let pdf = fake_pdf(&["short"]);
    let body = multipart_body("file", &[("doc.pdf", &pdf)]);

    let response = app
        .oneshot(multipart_post("/parse-pdf", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    let error = json["error"].as_str().expect("error string");
    assert!(error.contains("OCR engine unavailable"), "got: {error}");
}

#[tokio::test]
async fn test_parse_pdf_maps_unreadable_document_to_422() {
    let pdf = fake_pdf(&["OPEN-FAIL"]);
    let body = multipart_body("file", &[("broken.pdf", &pdf)]);

    let response = test_app()
        .oneshot(multipart_post("/parse-pdf", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    let error = json["error"].as_str().expect("error string");
    assert!(error.contains("corrupt"), "got: {error}");
}

// ── /parse-pdfs ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_parse_pdfs_returns_rows_in_input_order() {
    let good_a = fake_pdf(&["first document with plenty of native text"]);
    let good_c = fake_pdf(&["third document with plenty of native text"]);
    let body = multipart_body(
        "files",
        &[
            ("a.pdf", &good_a),
            ("b.pdf", b"garbage that is not a pdf"),
            ("c.pdf", &good_c),
        ],
    );

    let response = test_app()
        .oneshot(multipart_post("/parse-pdfs", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let rows = json.as_array().expect("array of rows");
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0]["status"], "success");
    assert_eq!(rows[0]["filename"], "a.pdf");
    assert!(rows[0]["content"]
        .as_str()
        .expect("content")
        .starts_with("\n## Page 1\n\n"));

    assert_eq!(rows[1]["status"], "error");
    assert_eq!(rows[1]["filename"], "b.pdf");
    assert!(rows[1]["error"]
        .as_str()
        .expect("error")
        .contains("not a valid PDF"));

    assert_eq!(rows[2]["status"], "success");
    assert_eq!(rows[2]["filename"], "c.pdf");
}

#[tokio::test]
async fn test_parse_pdfs_requires_files() {
    let body = multipart_body("files", &[]);

    let response = test_app()
        .oneshot(multipart_post("/parse-pdfs", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": "No files provided" })
    );
}

#[tokio::test]
async fn test_parse_pdfs_rejects_a_nameless_first_file() {
    let pdf = fake_pdf(&["nameless first upload with plenty of text"]);
    let body = multipart_body("files", &[("", &pdf)]);

    let response = test_app()
        .oneshot(multipart_post("/parse-pdfs", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": "No selected files" })
    );
}

#[tokio::test]
async fn test_parse_pdfs_invalid_extension_becomes_an_error_row() {
    let pdf = fake_pdf(&["fine document with plenty of native text"]);
    let body = multipart_body("files", &[("a.pdf", &pdf), ("b.docx", b"word doc")]);

    let response = test_app()
        .oneshot(multipart_post("/parse-pdfs", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json[1]["status"], "error");
    assert_eq!(
        json[1]["error"],
        "Invalid file type. Only PDF files are allowed."
    );
}
