//! Handler for the doctor dashboard patient list.

use axum::extract::State;
use axum::Json;
use medirec_core::roles::ROLE_PATIENT;
use medirec_db::models::user::UserResponse;

use crate::error::AppResult;
use crate::middleware::rbac::RequireDoctor;
use crate::state::AppState;

/// GET /api/v1/patients
///
/// All patients, ordered by display name. Doctors only.
pub async fn list_patients(
    State(state): State<AppState>,
    RequireDoctor(_doctor): RequireDoctor,
) -> AppResult<Json<Vec<UserResponse>>> {
    let patients = state.repos.users.list_by_role(ROLE_PATIENT).await?;
    Ok(Json(patients.iter().map(UserResponse::from).collect()))
}
