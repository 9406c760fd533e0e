pub mod auth;
pub mod documents;
pub mod health;
pub mod qrcode;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/me                                         current user
///
/// /patients                                        list (doctor only)
///
/// /users/{id}/categories                           list, create
/// /users/{id}/documents                            list (?categoryId=), upload
/// /users/{id}/medical-condition                    get, upsert
/// /users/{id}/qrcode                               current, reissue, revoke
///
/// /documents/{id}                                  get, update, delete
/// /documents/{id}/download                         raw file
///
/// /qrcode/{token}                                  shared record (public)
/// /qrcode/{token}/documents/{id}/download          shared file (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, me).
        .nest("/auth", auth::router())
        // Doctor dashboard.
        .route("/patients", get(handlers::patients::list_patients))
        // Per-user resources.
        .nest("/users", users::router())
        // Single documents.
        .nest("/documents", documents::router())
        // Public share token resolution.
        .nest("/qrcode", qrcode::router())
}
