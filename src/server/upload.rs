//! Multipart intake: field collection and filename sanitisation.

use crate::batch::UploadedFile;
use axum::extract::Multipart;
use once_cell::sync::Lazy;
use regex::Regex;

/// Failure while reading the multipart stream. Always a client error.
#[derive(Debug, thiserror::Error)]
#[error("Failed to read multipart form data: {0}")]
pub struct UploadError(pub String);

/// Collect every part named `field` into uploaded files, in wire order.
///
/// Parts under other names are drained and ignored. Filenames are
/// sanitised here, before anything downstream sees them.
pub async fn collect_files(
    mut multipart: Multipart,
    field: &str,
) -> Result<Vec<UploadedFile>, UploadError> {
    let mut files = Vec::new();

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError(e.to_string()))?
    {
        let name = part.name().unwrap_or("").to_string();
        if name != field {
            // Drain and ignore unknown fields
            let _ = part.bytes().await;
            continue;
        }

        let filename = sanitize_filename(part.file_name().unwrap_or(""));
        let data = part
            .bytes()
            .await
            .map_err(|e| UploadError(e.to_string()))?
            .to_vec();
        files.push(UploadedFile { filename, data });
    }

    Ok(files)
}

static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").unwrap());

/// Sanitise a client-supplied filename before it is displayed or reused.
///
/// Path components are stripped (only the last segment survives), spaces
/// become underscores, anything outside `[A-Za-z0-9._-]` is dropped, and
/// leading/trailing dots are trimmed. The result may be empty; callers
/// treat an empty name the same as a missing one.
pub fn sanitize_filename(raw: &str) -> String {
    let last_segment = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let underscored = last_segment.trim().replace(' ', "_");
    let kept = RE_DISALLOWED.replace_all(&underscored, "");
    kept.trim_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_clean_names_through() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("Q3_report-v2.pdf"), "Q3_report-v2.pdf");
    }

    #[test]
    fn strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\me\doc.pdf"), "doc.pdf");
        assert_eq!(sanitize_filename("/tmp/x/report.pdf"), "report.pdf");
    }

    #[test]
    fn replaces_spaces_and_drops_odd_characters() {
        assert_eq!(sanitize_filename("my report.pdf"), "my_report.pdf");
        assert_eq!(sanitize_filename("rēport (final)!.pdf"), "rport_final.pdf");
    }

    #[test]
    fn trims_leading_and_trailing_dots() {
        assert_eq!(sanitize_filename(".hidden.pdf"), "hidden.pdf");
        assert_eq!(sanitize_filename("name.pdf..."), "name.pdf");
    }

    #[test]
    fn can_sanitise_to_nothing() {
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename("***"), "");
        assert_eq!(sanitize_filename("dir/"), "");
    }
}
