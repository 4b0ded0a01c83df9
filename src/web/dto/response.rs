//! Response DTOs for the upload API.

use serde::Serialize;
use utoipa::ToSchema;

/// Message returned after a successful upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully!";

/// Successful upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Human-readable confirmation.
    #[schema(example = "File uploaded successfully!")]
    pub message: String,
    /// Name the file was stored as, possibly suffixed to avoid a collision.
    #[schema(example = "notes_1.txt")]
    pub filename: String,
}

impl UploadResponse {
    /// Create a success response for a stored filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            filename: filename.into(),
        }
    }
}

/// Files stored under a subject.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileListResponse {
    /// Filenames, sorted.
    pub files: Vec<String>,
}

/// Error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message.
    #[schema(example = "Invalid file type")]
    pub error: String,
}
