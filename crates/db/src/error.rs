//! Translation of sqlx errors into domain errors.

use medirec_core::error::CoreError;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Classify a sqlx error into a [`CoreError`].
///
/// - Unique constraint violations (constraint name starting with `uq_`) map to `Conflict`.
/// - Foreign key violations map to `Validation`.
/// - Everything else maps to `Internal` and is logged here.
pub fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) if constraint.starts_with("uq_") => {
                    return CoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    ));
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return CoreError::Validation(format!(
                        "Referenced entity does not exist ({constraint})"
                    ));
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            CoreError::Internal(format!("Database error: {db_err}"))
        }
        other => {
            tracing::error!(error = %other, "Database error");
            CoreError::Internal(format!("Database error: {other}"))
        }
    }
}
