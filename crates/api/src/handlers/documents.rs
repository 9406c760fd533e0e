//! Handlers for documents: `/users/{id}/documents` and `/documents/{id}`.
//!
//! Payloads travel as base64 JSON on upload and come back as raw bytes from
//! the download endpoints. JSON views of a document never include them.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use medirec_core::documents::{
    decode_payload, validate_notes, validate_title, validate_upload, FileUpload,
};
use medirec_core::error::CoreError;
use medirec_core::types::DbId;
use medirec_db::models::document::{CreateDocument, Document, DocumentSummary, UpdateDocument};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::DocumentListParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/{id}/documents`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub category_id: DbId,
    pub title: String,
    /// Date the document refers to, `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub file: FileUpload,
}

/// Request body for `PUT /documents/{id}`. Absent fields are left unchanged;
/// blank `notes` clears them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    pub category_id: Option<DbId>,
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users/{id}/documents?categoryId=
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Query(params): Query<DocumentListParams>,
) -> AppResult<Json<Vec<DocumentSummary>>> {
    auth.ensure_owner(user_id)?;
    let documents = state
        .repos
        .documents
        .list_for_user(user_id, params.category_id)
        .await?;
    Ok(Json(documents))
}

/// POST /api/v1/users/{id}/documents
///
/// Upload a document into one of the user's categories. The category count
/// is incremented with the insert.
pub async fn create_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Json(input): Json<CreateDocumentRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    auth.ensure_owner(user_id)?;

    let title = validate_title(&input.title)?;
    let notes = validate_notes(input.notes)?;
    let file = validate_upload(input.file)?;

    let document = state
        .repos
        .documents
        .create(&CreateDocument {
            user_id,
            category_id: input.category_id,
            title,
            file,
            content_date: input.date,
            notes,
        })
        .await?;

    tracing::info!(
        user_id,
        document_id = document.id,
        category_id = document.category_id,
        size_bytes = document.size_bytes,
        "Document uploaded"
    );
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /api/v1/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Document>> {
    let document = find_owned(&state, &auth, id).await?;
    Ok(Json(document))
}

/// PUT /api/v1/documents/{id}
///
/// Edit metadata or move the document to another of the owner's categories.
pub async fn update_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDocumentRequest>,
) -> AppResult<Json<Document>> {
    find_owned(&state, &auth, id).await?;

    let update = UpdateDocument {
        category_id: input.category_id,
        title: input.title.as_deref().map(validate_title).transpose()?,
        content_date: input.date,
        notes: input
            .notes
            .map(|notes| validate_notes(Some(notes)))
            .transpose()?,
    };

    let document = state
        .repos
        .documents
        .update(id, &update)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Document",
            id,
        })?;
    Ok(Json(document))
}

/// DELETE /api/v1/documents/{id}
///
/// Delete a document and decrement its category count. Returns 204.
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned(&state, &auth, id).await?;

    if !state.repos.documents.delete(id).await? {
        return Err(CoreError::NotFound {
            entity: "Document",
            id,
        }
        .into());
    }
    tracing::info!(user_id = auth.user_id, document_id = id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/documents/{id}/download
pub async fn download_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let document = find_owned(&state, &auth, id).await?;
    file_response(&document)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a document, answering 404 for a missing one and 403 for someone
/// else's.
async fn find_owned(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Document> {
    let document = state
        .repos
        .documents
        .find_by_id(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Document",
            id,
        })?;
    auth.ensure_owner(document.user_id)?;
    Ok(document)
}

/// Raw file bytes with `Content-Type` and an attachment `Content-Disposition`.
pub(crate) fn file_response(document: &Document) -> AppResult<Response> {
    let bytes = decode_payload(&document.file_data)?;
    let disposition = format!("attachment; filename=\"{}\"", document.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, document.mime_type.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
