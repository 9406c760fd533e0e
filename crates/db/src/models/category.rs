//! Document category model and DTOs.

use medirec_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `categories` table.
///
/// `document_count` is maintained by the document repository in the same
/// transaction as every document insert, recategorize and delete.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub document_count: i64,
    pub created_at: Timestamp,
}

/// DTO for creating a new category. Counts always start at zero.
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub user_id: DbId,
    pub name: String,
}
