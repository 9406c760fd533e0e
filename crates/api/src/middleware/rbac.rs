//! Role-based access control (RBAC) extractors and ownership checks.
//!
//! Patients reach only their own records. Doctors additionally get the
//! patient list and read access to condition summaries; everything else a
//! doctor sees comes through a share token.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use medirec_core::error::CoreError;
use medirec_core::roles::ROLE_DOCTOR;
use medirec_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `doctor` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn doctor_only(RequireDoctor(user): RequireDoctor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireDoctor(pub AuthUser);

impl FromRequestParts<AppState> for RequireDoctor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_doctor() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Doctor role required".into(),
            )));
        }
        Ok(RequireDoctor(user))
    }
}

impl AuthUser {
    pub fn is_doctor(&self) -> bool {
        self.role == ROLE_DOCTOR
    }

    /// Reject unless the caller is the user who owns `owner_id`'s records.
    pub fn ensure_owner(&self, owner_id: DbId) -> Result<(), AppError> {
        if self.user_id != owner_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "You can only access your own records".into(),
            )));
        }
        Ok(())
    }

    /// Like [`ensure_owner`](Self::ensure_owner), but doctors pass too.
    pub fn ensure_owner_or_doctor(&self, owner_id: DbId) -> Result<(), AppError> {
        if self.is_doctor() {
            return Ok(());
        }
        self.ensure_owner(owner_id)
    }
}
