//! Document entity model and DTOs.

use chrono::NaiveDate;
use medirec_core::documents::FilePayload;
use medirec_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full document row from the `documents` table, including the payload.
///
/// The base64 payload is skipped during serialization; it is only ever
/// served through the download endpoints.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DbId,
    pub user_id: DbId,
    pub category_id: DbId,
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    #[serde(skip_serializing)]
    pub file_data: String,
    /// Date the document refers to (e.g. date of the lab test).
    pub content_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// List view of a document: no payload, with the category name joined in.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DbId,
    pub user_id: DbId,
    pub category_id: DbId,
    pub category_name: String,
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub content_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl DocumentSummary {
    /// Build a summary from a full row and the name of its category.
    pub fn from_document(doc: &Document, category_name: String) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            category_id: doc.category_id,
            category_name,
            title: doc.title.clone(),
            file_name: doc.file_name.clone(),
            mime_type: doc.mime_type.clone(),
            size_bytes: doc.size_bytes,
            content_date: doc.content_date,
            notes: doc.notes.clone(),
            created_at: doc.created_at,
        }
    }
}

/// DTO for creating a document. Fields are validated by the caller.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub user_id: DbId,
    pub category_id: DbId,
    pub title: String,
    pub file: FilePayload,
    pub content_date: NaiveDate,
    pub notes: Option<String>,
}

/// DTO for updating a document. All fields are optional; `None` keeps the
/// current value. A changed `category_id` moves the document between counts.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocument {
    pub category_id: Option<DbId>,
    pub title: Option<String>,
    pub content_date: Option<NaiveDate>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}
