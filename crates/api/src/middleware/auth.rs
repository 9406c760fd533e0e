//! Bearer-token extractor for the authenticated (owner and doctor) routes.
//!
//! Share-token routes never go through here: a scanned QR code is a
//! capability on its own and carries no account.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use medirec_core::error::CoreError;
use medirec_core::roles::validate_role;
use medirec_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The signed-in patient or doctor behind a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Id of the account (`claims.sub`).
    pub user_id: DbId,
    /// `"patient"` or `"doctor"`.
    pub role: String,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

/// Pull the token out of `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>",
        )),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            unauthorized("Invalid or expired token")
        })?;

        // A token minted for a role this deployment no longer knows grants nothing.
        if validate_role(&claims.role).is_err() {
            tracing::warn!(user_id = claims.sub, role = %claims.role, "Access token carries an unknown role");
            return Err(unauthorized("Invalid or expired token"));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(bearer_token(&headers_with("bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(bearer_token(&headers_with("  BEARER   abc.def ")).unwrap(), "abc.def");
    }

    #[test]
    fn missing_or_malformed_header_is_unauthorized() {
        assert_matches!(
            bearer_token(&HeaderMap::new()),
            Err(AppError::Core(CoreError::Unauthorized(_)))
        );
        for bad in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer   ", "abc.def"] {
            assert_matches!(
                bearer_token(&headers_with(bad)),
                Err(AppError::Core(CoreError::Unauthorized(_))),
                "{bad}"
            );
        }
    }
}
