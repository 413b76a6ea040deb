use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Request-level failures. A file that fails to convert is not one of
/// these; it is reported inside a successful response.
#[derive(Error, Debug)]
pub enum WebError {
    /// The multipart body could not be read
    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    /// The request is not a multipart form
    #[error("Invalid upload: {0}")]
    Rejected(#[from] MultipartRejection),

    /// The form carried no file parts
    #[error("No files were uploaded")]
    NoFiles,
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Multipart(e) => e.status(),
            WebError::Rejected(e) => e.status(),
            WebError::NoFiles => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
