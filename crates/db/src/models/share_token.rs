//! Share token ("QR code") model and DTOs.

use medirec_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `share_tokens` table.
///
/// Serializes to the shape the client embeds in the QR code:
/// `{ id, userId, token, expiresAt, documentId, createdAt }`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub expires_at: Option<Timestamp>,
    /// Bound document for single-document sharing. Stored and returned but
    /// not used to narrow what a resolver returns.
    pub document_id: Option<DbId>,
    /// Superseded tokens are kept for audit and never resolve.
    #[serde(skip_serializing)]
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting a new token. The repository revokes any live token for
/// the same user in the same unit of work.
#[derive(Debug, Clone)]
pub struct CreateShareToken {
    pub user_id: DbId,
    pub token: String,
    pub expires_at: Option<Timestamp>,
    pub document_id: Option<DbId>,
}
