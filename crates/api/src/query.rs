//! Shared query parameter types for API handlers.

use medirec_core::types::DbId;
use serde::Deserialize;

/// `?categoryId=` filter for document listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListParams {
    pub category_id: Option<DbId>,
}

/// `?documentId=` binding for a newly issued share token.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenParams {
    pub document_id: Option<DbId>,
}
