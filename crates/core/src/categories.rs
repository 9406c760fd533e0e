//! Category naming rules, the default category set, and medical condition
//! summary limits.

use crate::error::CoreError;

pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Maximum length of a medical condition summary.
pub const MAX_SUMMARY_LEN: usize = 5000;

/// Categories created for a newly registered patient.
pub const DEFAULT_CATEGORIES: &[&str] = &["Lab Reports", "Prescriptions", "X-Rays", "Vaccinations"];

/// Validate and trim a category name.
pub fn validate_category_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Category name must not be empty".into(),
        ));
    }
    if trimmed.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Category name must be at most {MAX_CATEGORY_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate and trim a medical condition summary.
pub fn validate_summary(summary: &str) -> Result<String, CoreError> {
    let trimmed = summary.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Summary is required".into()));
    }
    if trimmed.chars().count() > MAX_SUMMARY_LEN {
        return Err(CoreError::Validation(format!(
            "Summary must be at most {MAX_SUMMARY_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}
