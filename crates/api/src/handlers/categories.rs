//! Handlers for `/users/{id}/categories`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use medirec_core::categories::validate_category_name;
use medirec_core::types::DbId;
use medirec_db::models::category::{Category, CreateCategory};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /users/{id}/categories`.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// GET /api/v1/users/{id}/categories
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<Vec<Category>>> {
    auth.ensure_owner(user_id)?;
    let categories = state.repos.categories.list_for_user(user_id).await?;
    Ok(Json(categories))
}

/// POST /api/v1/users/{id}/categories
///
/// Create a category with a zero document count. Names are unique per user.
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    auth.ensure_owner(user_id)?;
    let name = validate_category_name(&input.name)?;

    let category = state
        .repos
        .categories
        .create(&CreateCategory { user_id, name })
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}
