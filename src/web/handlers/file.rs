//! Upload, listing and download handlers.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, HeaderMap},
    response::Response,
    Form, Json,
};
use std::sync::Arc;

use crate::file::{validate_segment, SegmentKind};
use crate::web::dto::{ErrorBody, FileListResponse, UploadResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::SatchelError;

/// Generate a safe `Content-Disposition` value for serving a file inline.
///
/// The plain `filename` parameter is an ASCII fallback: control characters
/// are removed, and quotes, backslashes and non-ASCII characters become `_`.
/// Such names also get an RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let needs_encoding = !filename.is_ascii()
        || filename
            .chars()
            .any(|c| c.is_control() || c == '"' || c == '\\');

    if !needs_encoding {
        return format!("inline; filename=\"{}\"", filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            _ => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// The `file` part of an upload form.
struct FilePart {
    filename: String,
    content: Bytes,
}

/// Fields of an upload request. The first occurrence of each field wins.
#[derive(Default)]
struct UploadForm {
    subject: Option<String>,
    file: Option<FilePart>,
}

fn content_type_is(headers: &HeaderMap, mime: &str) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(mime))
}

/// Read the upload fields from a request body.
///
/// A multipart body yields both fields. A url-encoded body can only carry
/// `subject`. Any other body has no fields at all, so the usual missing-field
/// errors apply.
async fn read_upload_form(request: Request) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    if content_type_is(request.headers(), "application/x-www-form-urlencoded") {
        if let Ok(Form(fields)) = Form::<Vec<(String, String)>>::from_request(request, &()).await {
            form.subject = fields
                .into_iter()
                .find_map(|(name, value)| (name == "subject").then_some(value));
        }
        return Ok(form);
    }

    if !content_type_is(request.headers(), "multipart/form-data") {
        return Ok(form);
    }

    let mut multipart = Multipart::from_request(request, &()).await.map_err(|e| {
        tracing::warn!("Rejected upload body: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some("subject") if form.subject.is_none() => {
                form.subject = Some(field.text().await.map_err(|e| {
                    tracing::warn!("Failed to read subject: {}", e);
                    ApiError::bad_request("Invalid multipart data")
                })?);
            }
            Some("file") if form.file.is_none() => {
                // A part without a filename parameter is a plain form field.
                let Some(filename) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let content = field.bytes().await.map_err(|e| {
                    tracing::warn!("Failed to read file content: {}", e);
                    ApiError::bad_request("Failed to read file")
                })?;
                form.file = Some(FilePart { filename, content });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /upload - Store a file under a subject.
///
/// Request body: multipart/form-data with a `subject` text field and a
/// `file` part.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "`subject` text field and `file` part"
    ),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing subject or file, or disallowed file type", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<UploadResponse>, ApiError> {
    let UploadForm { subject, file } = read_upload_form(request).await?;

    let subject = match subject {
        Some(s) if !s.is_empty() => s,
        _ => return Err(ApiError::bad_request("Subject not specified")),
    };
    validate_segment(SegmentKind::Subject, &subject)
        .map_err(|_| ApiError::bad_request("Invalid subject"))?;

    let file = file.ok_or_else(|| ApiError::bad_request("No file part"))?;
    if file.filename.is_empty() {
        return Err(ApiError::bad_request("No selected file"));
    }
    validate_segment(SegmentKind::Filename, &file.filename)
        .map_err(|_| ApiError::bad_request("Invalid filename"))?;

    if !state.extensions.is_allowed(&file.filename) {
        return Err(ApiError::bad_request("Invalid file type"));
    }

    let stored = state
        .storage
        .store(&subject, &file.filename, &file.content)
        .map_err(|e| match e {
            SatchelError::Validation(_) => ApiError::bad_request("Invalid filename"),
            other => other.into(),
        })?;

    tracing::info!(
        subject = %stored.subject,
        filename = %stored.filename,
        size = stored.size,
        "File uploaded"
    );

    Ok(Json(UploadResponse::new(stored.filename)))
}

/// GET /files/:subject - List files stored under a subject.
#[utoipa::path(
    get,
    path = "/files/{subject}",
    tag = "files",
    params(
        ("subject" = String, Path, description = "Subject name")
    ),
    responses(
        (status = 200, description = "Stored filenames, empty for an unknown subject", body = FileListResponse),
        (status = 400, description = "Invalid subject", body = ErrorBody)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(subject): Path<String>,
) -> Result<Json<FileListResponse>, ApiError> {
    validate_segment(SegmentKind::Subject, &subject)
        .map_err(|_| ApiError::bad_request("Invalid subject"))?;

    let files = state.storage.list(&subject)?;

    Ok(Json(FileListResponse { files }))
}

/// GET /uploads/:subject/:filename - Serve a stored file.
#[utoipa::path(
    get,
    path = "/uploads/{subject}/{filename}",
    tag = "files",
    params(
        ("subject" = String, Path, description = "Subject name"),
        ("filename" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "File content with a content type guessed from the filename"),
        (status = 404, description = "File not found", body = ErrorBody)
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((subject, filename)): Path<(String, String)>,
) -> Result<Response<Body>, ApiError> {
    // Unsafe names can never refer to a stored file.
    if validate_segment(SegmentKind::Subject, &subject).is_err()
        || validate_segment(SegmentKind::Filename, &filename).is_err()
    {
        tracing::warn!(subject = %subject, filename = %filename, "Rejected download path");
        return Err(ApiError::not_found("File not found"));
    }

    let content = state
        .storage
        .load(&subject, &filename)
        .map_err(|e| match e {
            SatchelError::NotFound(_) => ApiError::not_found("File not found"),
            other => other.into(),
        })?;

    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&filename),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}
