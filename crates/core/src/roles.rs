//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in
//! `20260301000001_create_users_table.sql`.

use crate::error::CoreError;

pub const ROLE_PATIENT: &str = "patient";
pub const ROLE_DOCTOR: &str = "doctor";

const VALID_ROLES: &[&str] = &[ROLE_PATIENT, ROLE_DOCTOR];

/// Validate that `role` is one of the known role names.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {VALID_ROLES:?}"
        )))
    }
}
