//! Route definitions for resources owned by a user.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::handlers::{categories, documents, medical_condition, qrcode};
use crate::state::AppState;

/// Request body cap for uploads: a 10 MiB file grows by a third as base64,
/// plus the JSON around it.
pub const MAX_UPLOAD_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Routes mounted at `/users`.
///
/// ```text
/// GET, POST         /{id}/categories
/// GET, POST         /{id}/documents
/// GET, PUT          /{id}/medical-condition
/// GET, POST, DELETE /{id}/qrcode
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/{id}/documents",
            get(documents::list_documents)
                .post(documents::create_document)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route(
            "/{id}/medical-condition",
            get(medical_condition::get_condition).put(medical_condition::upsert_condition),
        )
        .route(
            "/{id}/qrcode",
            get(qrcode::get_qrcode)
                .post(qrcode::regenerate_qrcode)
                .delete(qrcode::revoke_qrcode),
        )
}
