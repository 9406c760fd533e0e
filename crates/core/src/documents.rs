//! Document field validation and the uploaded file payload.
//!
//! Uploads arrive as base64 text inside JSON. They are checked here, at the
//! boundary, for a known MIME type, a size ceiling and a well-formed file
//! name before anything is persisted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest accepted decoded file, in bytes (10 MiB).
pub const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_NOTES_LEN: usize = 4000;
pub const MAX_FILE_NAME_LEN: usize = 255;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// A file as submitted by the client.
///
/// `data` is standard base64, optionally prefixed with a
/// `data:<mime>;base64,` header as produced by browser file readers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data: String,
}

/// A validated file payload ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    /// Lowercase, one of [`ALLOWED_MIME_TYPES`].
    pub mime_type: String,
    /// Decoded size in bytes.
    pub size_bytes: i64,
    /// Base64 text without any data-URL header.
    pub encoded: String,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate an uploaded file and compute its decoded size.
pub fn validate_upload(upload: FileUpload) -> Result<FilePayload, CoreError> {
    let file_name = validate_file_name(&upload.file_name)?;

    let mime_type = upload.mime_type.trim().to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
        return Err(CoreError::Validation(format!(
            "Unsupported file type '{mime_type}'. Must be one of: {ALLOWED_MIME_TYPES:?}"
        )));
    }

    let encoded = strip_data_url(upload.data.trim()).to_string();

    // Reject obviously oversized input before allocating the decoded buffer.
    if encoded.len() / 4 * 3 > MAX_FILE_SIZE_BYTES + 3 {
        return Err(too_large());
    }

    let decoded = STANDARD
        .decode(&encoded)
        .map_err(|e| CoreError::Validation(format!("File data is not valid base64: {e}")))?;

    if decoded.is_empty() {
        return Err(CoreError::Validation("File is empty".into()));
    }
    if decoded.len() > MAX_FILE_SIZE_BYTES {
        return Err(too_large());
    }

    Ok(FilePayload {
        file_name,
        mime_type,
        size_bytes: decoded.len() as i64,
        encoded,
    })
}

/// Decode a stored payload for download.
///
/// Stored payloads were validated on the way in, so a decode failure here
/// means the row is corrupt and is reported as an internal error.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>, CoreError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| CoreError::Internal(format!("Stored file data is corrupt: {e}")))
}

/// Validate and trim a document title.
pub fn validate_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate optional notes. Blank notes are normalized to `None`.
pub fn validate_notes(notes: Option<String>) -> Result<Option<String>, CoreError> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTES_LEN {
        return Err(CoreError::Validation(format!(
            "Notes must be at most {MAX_NOTES_LEN} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// The file name ends up in a `Content-Disposition` header, so path
/// separators, quotes and control characters are refused.
fn validate_file_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("File name must not be empty".into()));
    }
    if trimmed.len() > MAX_FILE_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "File name must be at most {MAX_FILE_NAME_LEN} bytes"
        )));
    }
    if trimmed
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '"' || c.is_control())
    {
        return Err(CoreError::Validation(
            "File name contains forbidden characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

fn strip_data_url(data: &str) -> &str {
    if data.starts_with("data:") {
        if let Some(idx) = data.find("base64,") {
            return &data[idx + "base64,".len()..];
        }
    }
    data
}

fn too_large() -> CoreError {
    CoreError::Validation(format!(
        "File exceeds the maximum size of {MAX_FILE_SIZE_BYTES} bytes"
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
