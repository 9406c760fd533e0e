//! Handlers for `/users/{id}/medical-condition`.

use axum::extract::{Path, State};
use axum::Json;
use medirec_core::categories::validate_summary;
use medirec_core::error::CoreError;
use medirec_core::types::DbId;
use medirec_db::models::medical_condition::MedicalCondition;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `PUT /users/{id}/medical-condition`.
#[derive(Debug, Deserialize)]
pub struct UpsertConditionRequest {
    pub summary: String,
}

/// GET /api/v1/users/{id}/medical-condition
///
/// Readable by the patient and by any doctor.
pub async fn get_condition(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<MedicalCondition>> {
    auth.ensure_owner_or_doctor(user_id)?;
    let condition = state
        .repos
        .conditions
        .find_for_user(user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "MedicalCondition",
            id: user_id,
        })?;
    Ok(Json(condition))
}

/// PUT /api/v1/users/{id}/medical-condition
pub async fn upsert_condition(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpsertConditionRequest>,
) -> AppResult<Json<MedicalCondition>> {
    auth.ensure_owner(user_id)?;
    let summary = validate_summary(&input.summary)?;
    let condition = state.repos.conditions.upsert(user_id, &summary).await?;
    Ok(Json(condition))
}
