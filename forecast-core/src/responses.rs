//! HTTP response builders beyond plain JSON

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

// ============================================================================
// 200 OK with attachment
// ============================================================================

/// File returned as a download
///
/// Sets `Content-Disposition: attachment` with the given file name.
#[derive(Debug)]
pub struct FileDownload {
    file_name: String,
    content_type: &'static str,
    bytes: Vec<u8>,
}

impl FileDownload {
    pub fn new(file_name: impl Into<String>, content_type: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    /// JSON attachment
    pub fn json(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(file_name, "application/json", bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl IntoResponse for FileDownload {
    fn into_response(self) -> Response {
        // quotes and backslashes would break the quoted-string
        let safe_name: String = self
            .file_name
            .chars()
            .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
            .collect();
        let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{safe_name}\""))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(self.content_type)),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_download_headers() {
        let response = FileDownload::json("weather OpenApi3.json", b"{}".to_vec()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"weather OpenApi3.json\""
        );
    }

    #[test]
    fn test_file_name_quotes_are_stripped() {
        let response = FileDownload::json("a\"b.json", Vec::new()).into_response();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"ab.json\""
        );
    }
}
