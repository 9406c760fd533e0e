//! Route definitions for public share token access.

use axum::routing::get;
use axum::Router;

use crate::handlers::qrcode;
use crate::state::AppState;

/// Routes mounted at `/qrcode`. No authentication: the token is the credential.
///
/// ```text
/// GET /{token}
/// GET /{token}/documents/{document_id}/download
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(qrcode::resolve_qrcode))
        .route(
            "/{token}/documents/{document_id}/download",
            get(qrcode::download_shared_document),
        )
}
