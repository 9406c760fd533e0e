//! Medical condition summary model (one per patient).

use medirec_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `medical_conditions` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalCondition {
    pub id: DbId,
    pub user_id: DbId,
    pub summary: String,
    pub last_updated: Timestamp,
}
