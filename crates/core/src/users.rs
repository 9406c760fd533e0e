//! Validation for account fields supplied at registration.

use crate::error::CoreError;

pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_DISPLAY_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;

/// Validate a username and return it trimmed.
///
/// Usernames are 1-50 characters of ASCII letters, digits, `_`, `-` or `.`.
pub fn validate_username(username: &str) -> Result<String, CoreError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Username must not be empty".into()));
    }
    if trimmed.len() > MAX_USERNAME_LEN {
        return Err(CoreError::Validation(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(CoreError::Validation(
            "Username may contain only letters, digits, '_', '-' and '.'".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a display name and return it trimmed.
pub fn validate_display_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Display name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Display name must be at most {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate an optional email. Blank becomes `None`.
///
/// Only the shape `local@domain` is checked; deliverability is not.
pub fn validate_email(email: Option<String>) -> Result<Option<String>, CoreError> {
    let Some(email) = email else {
        return Ok(None);
    };
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let well_formed = trimmed.len() <= MAX_EMAIL_LEN
        && trimmed
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        return Err(CoreError::Validation(format!(
            "'{trimmed}' is not a valid email address"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn username_is_trimmed() {
        assert_eq!(validate_username("  jdoe ").unwrap(), "jdoe");
    }

    #[test]
    fn username_rejects_spaces_and_empties() {
        assert_matches!(validate_username(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_username("j doe"), Err(CoreError::Validation(_)));
        let long = "a".repeat(MAX_USERNAME_LEN + 1);
        assert_matches!(validate_username(&long), Err(CoreError::Validation(_)));
    }

    #[test]
    fn display_name_required() {
        assert_matches!(validate_display_name("   "), Err(CoreError::Validation(_)));
        assert_eq!(validate_display_name(" John Doe ").unwrap(), "John Doe");
    }

    #[test]
    fn email_shapes() {
        assert_eq!(validate_email(None).unwrap(), None);
        assert_eq!(validate_email(Some("  ".into())).unwrap(), None);
        assert_eq!(
            validate_email(Some("a@example.com".into())).unwrap(),
            Some("a@example.com".to_string())
        );
        assert_matches!(
            validate_email(Some("not-an-email".into())),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_email(Some("@example.com".into())),
            Err(CoreError::Validation(_))
        );
    }
}
