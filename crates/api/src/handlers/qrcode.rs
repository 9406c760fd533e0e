//! Handlers for share tokens ("QR codes").
//!
//! The `/users/{id}/qrcode` routes are for the owning patient. The
//! `/qrcode/{token}` routes are public: the token itself is the credential.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use medirec_core::types::DbId;
use medirec_db::models::share_token::ShareToken;

use crate::error::AppResult;
use crate::handlers::documents::file_response;
use crate::middleware::auth::AuthUser;
use crate::query::IssueTokenParams;
use crate::sharing::SharedRecord;
use crate::state::AppState;

/// GET /api/v1/users/{id}/qrcode
///
/// The patient's current token, minting one if none is live and unexpired.
pub async fn get_qrcode(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<ShareToken>> {
    auth.ensure_owner(user_id)?;
    let token = state.issuer.current_or_issue(user_id).await?;
    Ok(Json(token))
}

/// POST /api/v1/users/{id}/qrcode?documentId=
///
/// Force a new token. The previous one stops resolving immediately.
pub async fn regenerate_qrcode(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Query(params): Query<IssueTokenParams>,
) -> AppResult<(StatusCode, Json<ShareToken>)> {
    auth.ensure_owner(user_id)?;
    let token = state.issuer.issue(user_id, params.document_id).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// DELETE /api/v1/users/{id}/qrcode
///
/// Stop sharing. Idempotent; returns 204 whether or not a token was live.
pub async fn revoke_qrcode(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.ensure_owner(user_id)?;
    state.issuer.revoke(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/qrcode/{token}
///
/// Public. The owner's profile, documents and condition summary.
pub async fn resolve_qrcode(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<SharedRecord>> {
    let record = state.resolver.resolve(&token).await?;
    Ok(Json(record))
}

/// GET /api/v1/qrcode/{token}/documents/{document_id}/download
///
/// Public. One of the token owner's files.
pub async fn download_shared_document(
    State(state): State<AppState>,
    Path((token, document_id)): Path<(String, DbId)>,
) -> AppResult<Response> {
    let document = state.resolver.resolve_document(&token, document_id).await?;
    file_response(&document)
}
